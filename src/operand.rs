//! Resolution of operand text into values.
//!
//! Operands are stored as source text and turned into numbers only when an instruction is
//! executed. All numeric interpretation goes through [parse_literal] and [resolve].

use nom::{
    IResult,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::pair,
};

use crate::symbol_table::SymbolTable;

fn take_i32(input: &str) -> IResult<&str, i32> {
    map_res(
        recognize(pair(opt(char('-')), digit1)),
        |n: &str| n.parse::<i32>(),
    )(input)
}

/// Parses an integer literal: an optional leading `-` followed by decimal digits.
///
/// Returns `None` for anything else, including literals that do not fit in an `i32`.
pub fn parse_literal(text: &str) -> Option<i32> {
    all_consuming(take_i32)(text)
        .ok()
        .map(|(_, value)| value)
}

/// A successfully resolved operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved {
    /// The operand named a declared variable that has a value.
    Variable(i32),

    /// The operand was an integer literal.
    Literal(i32),
}

impl Resolved {
    pub fn value(self) -> i32 {
        match self {
            Resolved::Variable(value) | Resolved::Literal(value) => value,
        }
    }

    pub fn is_variable(self) -> bool {
        match self {
            Resolved::Variable(_) => true,
            Resolved::Literal(_) => false,
        }
    }
}

/// Resolves operand text against the symbol table.
///
/// A declared variable that has been set takes precedence. Otherwise the text must be an
/// integer literal. Returns `None` if neither applies.
pub fn resolve(symbols: &SymbolTable, text: &str) -> Option<Resolved> {
    if let Some(id) = symbols.lookup_set(text) {
        return Some(Resolved::Variable(symbols.get(id).value));
    }

    parse_literal(text).map(Resolved::Literal)
}

#[test]
fn test_parse_literal() {
    assert_eq!(parse_literal("0"), Some(0));
    assert_eq!(parse_literal("42"), Some(42));
    assert_eq!(parse_literal("-17"), Some(-17));
    assert_eq!(parse_literal("007"), Some(7));
    assert_eq!(parse_literal("-2147483648"), Some(i32::min_value()));

    assert_eq!(parse_literal(""), None);
    assert_eq!(parse_literal("-"), None);
    assert_eq!(parse_literal("+5"), None);
    assert_eq!(parse_literal("5x"), None);
    assert_eq!(parse_literal("--5"), None);
    assert_eq!(parse_literal("2147483648"), None);
}

#[test]
fn test_resolve_prefers_set_variables() {
    let mut symbols = SymbolTable::new();
    let a = symbols.declare("a").unwrap();
    symbols.declare("b").unwrap();

    assert_eq!(resolve(&symbols, "a"), None);

    symbols.assign(a, -3);

    assert_eq!(resolve(&symbols, "a"), Some(Resolved::Variable(-3)));
    assert!(resolve(&symbols, "a").map_or(false, Resolved::is_variable));
    assert!(!resolve(&symbols, "12").map_or(true, Resolved::is_variable));
    assert_eq!(resolve(&symbols, "b"), None);
    assert_eq!(resolve(&symbols, "-8"), Some(Resolved::Literal(-8)));
    assert_eq!(resolve(&symbols, "c"), None);
}
