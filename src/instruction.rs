//! types for representing instructions and their parts

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

/// The kinds of instructions of the language.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Declares a new variable. (`int <var>`)
    Declare,

    /// Gives a variable a value and marks it as set. (`set <var> <literal>`)
    Assign,

    /// Marks the line where execution starts. (`begin`)
    Begin,

    /// Marks the line where execution stops. (`end`)
    End,

    /// Adds a literal to a set variable. (`add <var> <literal>`)
    Add,

    /// Subtracts a literal from a set variable. (`sub <var> <literal>`)
    Sub,

    /// Multiplies a set variable by a literal. (`mult <var> <literal>`)
    Mult,

    /// Divides a set variable by a literal. (`div <var> <literal>`)
    Div,

    /// Emits a piece of text at the position given by two set variables.
    /// (`print <row> <col> <text>`)
    Print,

    /// Continues execution from another line. (`goto <line>`)
    Goto,

    /// Skips the next instruction unless the comparison holds. (`if <a> <op> <b>`)
    If,
}

/// All keywords of the language in the order of the [Kind] variants.
pub const KEYWORDS: [&str; 11] = [
    "int", "set", "begin", "end", "add", "sub", "mult", "div", "print", "goto", "if",
];

impl Kind {
    /// The number of operands an instruction of this kind takes.
    pub fn arity(&self) -> usize {
        match self {
            Kind::Begin | Kind::End => 0,
            Kind::Declare | Kind::Goto => 1,
            Kind::Assign | Kind::Add | Kind::Sub | Kind::Mult | Kind::Div => 2,
            Kind::Print | Kind::If => 3,
        }
    }

    /// The keyword of this kind as it is written in the source.
    pub fn keyword(&self) -> &'static str {
        match self {
            Kind::Declare => "int",
            Kind::Assign => "set",
            Kind::Begin => "begin",
            Kind::End => "end",
            Kind::Add => "add",
            Kind::Sub => "sub",
            Kind::Mult => "mult",
            Kind::Div => "div",
            Kind::Print => "print",
            Kind::Goto => "goto",
            Kind::If => "if",
        }
    }

    /// The usage line shown when an instruction has the wrong number of operands.
    pub fn usage(&self) -> &'static str {
        match self {
            Kind::Declare => "int <var>",
            Kind::Assign => "set <var> #",
            Kind::Begin => "begin",
            Kind::End => "end",
            Kind::Add => "add <var> #",
            Kind::Sub => "sub <var> #",
            Kind::Mult => "mult <var> #",
            Kind::Div => "div <var> #",
            Kind::Print => "print <var1> <var2> string",
            Kind::Goto => "goto <lineNumber>",
            Kind::If => "if <var> <op> <var>",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.keyword())
    }
}

/// Operators that mutate a variable in place.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    /// Applies the operator. Returns `None` if the operation has no result, which happens only
    /// for division by zero and for `i32::MIN / -1`.
    pub fn apply(self, lhs: i32, rhs: i32) -> Option<i32> {
        match self {
            ArithmeticOp::Add => Some(lhs.wrapping_add(rhs)),
            ArithmeticOp::Subtract => Some(lhs.wrapping_sub(rhs)),
            ArithmeticOp::Multiply => Some(lhs.wrapping_mul(rhs)),
            ArithmeticOp::Divide => lhs.checked_div(rhs),
        }
    }
}

/// Comparison operators of the `if` instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    pub fn evaluate(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Comparison::Equal => lhs == rhs,
            Comparison::NotEqual => lhs != rhs,
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
            Comparison::Less => lhs < rhs,
            Comparison::LessOrEqual => lhs <= rhs,
        }
    }
}

/// Error returned when parsing an unknown comparison operator.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidComparison;

impl FromStr for Comparison {
    type Err = InvalidComparison;

    fn from_str(s: &str) -> Result<Comparison, InvalidComparison> {
        match s {
            "eq" => Ok(Comparison::Equal),
            "ne" => Ok(Comparison::NotEqual),
            "gt" => Ok(Comparison::Greater),
            "gte" => Ok(Comparison::GreaterOrEqual),
            "lt" => Ok(Comparison::Less),
            "lte" => Ok(Comparison::LessOrEqual),
            _ => Err(InvalidComparison),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Comparison::Equal => "eq",
            Comparison::NotEqual => "ne",
            Comparison::Greater => "gt",
            Comparison::GreaterOrEqual => "gte",
            Comparison::Less => "lt",
            Comparison::LessOrEqual => "lte",
        })
    }
}

/// A single parsed instruction.
///
/// Operands are kept as the source text. Numbers and variable references are resolved when the
/// instruction is executed, see [resolve](crate::operand::resolve).
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    /// The declared line number. Used as the jump target and program counter value.
    pub line: u32,

    pub kind: Kind,

    pub operands: Vec<String>,

    /// The 1-based line of the source text this instruction was read from.
    pub source_line: usize,
}

impl Instruction {
    pub fn operand(&self, index: usize) -> &str {
        self.operands.get(index).map(String::as_str).unwrap_or("")
    }

    /// The comparison operator of an `if` instruction.
    pub fn comparison(&self) -> Option<Comparison> {
        match self.kind {
            Kind::If => self.operand(1).parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "{} {}", self.line, self.kind)
        } else {
            write!(f, "{} {} {}", self.line, self.kind, self.operands.iter().join(" "))
        }
    }
}

#[test]
fn test_keywords_match_kinds() {
    let kinds = [
        Kind::Declare, Kind::Assign, Kind::Begin, Kind::End, Kind::Add, Kind::Sub,
        Kind::Mult, Kind::Div, Kind::Print, Kind::Goto, Kind::If,
    ];

    for (kind, keyword) in kinds.iter().zip(KEYWORDS.iter()) {
        assert_eq!(kind.keyword(), *keyword);
    }
}

#[test]
fn test_arithmetic() {
    assert_eq!(ArithmeticOp::Add.apply(5, 3), Some(8));
    assert_eq!(ArithmeticOp::Subtract.apply(8, 10), Some(-2));
    assert_eq!(ArithmeticOp::Multiply.apply(-2, -1), Some(2));
    assert_eq!(ArithmeticOp::Divide.apply(2, 2), Some(1));
    assert_eq!(ArithmeticOp::Divide.apply(-7, 2), Some(-3));
    assert_eq!(ArithmeticOp::Divide.apply(7, 0), None);
    assert_eq!(ArithmeticOp::Divide.apply(i32::min_value(), -1), None);
    assert_eq!(ArithmeticOp::Add.apply(i32::max_value(), 1), Some(i32::min_value()));
}

#[test]
fn test_comparison() {
    assert_eq!("gte".parse::<Comparison>(), Ok(Comparison::GreaterOrEqual));
    assert_eq!("EQ".parse::<Comparison>(), Err(InvalidComparison));

    assert!(Comparison::Equal.evaluate(3, 3));
    assert!(Comparison::NotEqual.evaluate(3, 4));
    assert!(Comparison::Greater.evaluate(4, 3));
    assert!(!Comparison::Greater.evaluate(3, 3));
    assert!(Comparison::GreaterOrEqual.evaluate(3, 3));
    assert!(Comparison::Less.evaluate(-1, 0));
    assert!(Comparison::LessOrEqual.evaluate(0, 0));
    assert!(!Comparison::LessOrEqual.evaluate(1, 0));
}

#[test]
fn test_display_instruction() {
    let ins = Instruction {
        line: 4,
        kind: Kind::Print,
        operands: vec!["a".into(), "b".into(), "hi".into()],
        source_line: 4,
    };

    assert_eq!(ins.to_string(), "4 print a b hi");
}
