//! Parsing and validation of single source lines.

use std::collections::HashMap;

use edit_distance::edit_distance;
use slog::{debug, Logger};

use crate::error::{LoadError, LoadErrorKind};
use crate::instruction::{Comparison, Instruction, Kind, KEYWORDS};
use crate::operand::parse_literal;
use crate::symbol_table::{SymbolTable, MAX_NAME_LEN};
use crate::token::{tokenize, Lexeme};

/// Largest edit distance for which a "did you mean" suggestion is offered.
const SUGGESTION_DISTANCE: usize = 2;

/// Returns the candidate closest to `word`, if any is close enough.
fn suggest<'a, I>(word: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| (edit_distance(word, candidate), candidate))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// State that is built up while the lines of a program are parsed one after another.
///
/// Declarations and the `begin` and `end` markers take effect as soon as their line has been
/// parsed, so later lines are validated against everything declared before them.
pub(crate) struct LineParser {
    pub symbol_table: SymbolTable,
    pub begin: Option<u32>,
    pub end: Option<u32>,

    /// Maps declared line numbers to the source line that declared them.
    lines: HashMap<u32, usize>,

    logger: Logger,
}

/// Context for validating the operands of a single line.
struct LineContext<'p, 'a> {
    parser: &'p mut LineParser,
    source_line: usize,
    line: u32,
    kind: Kind,
    operands: &'a [Lexeme<'a>],
}

impl LineParser {
    pub fn new(logger: Logger) -> LineParser {
        LineParser {
            symbol_table: SymbolTable::new(),
            begin: None,
            end: None,
            lines: HashMap::new(),
            logger,
        }
    }

    /// Parses one line of source.
    ///
    /// # Returns
    /// `None` for blank lines, otherwise the validated instruction.
    ///
    /// # Errors
    /// The first rule the line violates.
    pub fn parse_line(&mut self, source_line: usize, input: &str) -> Result<Option<Instruction>, LoadError> {
        let tokens = tokenize(input);

        let (first, rest) = match tokens.split_first() {
            Some(split) => split,
            None => return Ok(None),
        };

        let line = match parse_literal(first.text) {
            None => return Err(LoadError::new(source_line, None, LoadErrorKind::InvalidLineNumber {
                token: first.text.to_string(),
            })),
            Some(n) if n <= 0 => return Err(LoadError::new(source_line, None, LoadErrorKind::NonPositiveLineNumber {
                token: first.text.to_string(),
            })),
            Some(n) => n as u32,
        };

        let error = |kind| LoadError::new(source_line, Some(line), kind);

        let (keyword, operands) = rest.split_first()
            .ok_or_else(|| error(LoadErrorKind::MissingKeyword))?;

        let kind = keyword.token.keyword()
            .ok_or_else(|| error(LoadErrorKind::UnknownKeyword {
                token: keyword.text.to_string(),
                suggestion: suggest(keyword.text, KEYWORDS.iter().copied()),
            }))?;

        if let Some(first_source_line) = self.lines.get(&line) {
            return Err(error(LoadErrorKind::DuplicateLine {
                first_source_line: *first_source_line,
            }));
        }

        if operands.len() != kind.arity() {
            return Err(error(LoadErrorKind::OperandCount {
                kind,
                expected: kind.arity(),
                got: operands.len(),
            }));
        }

        let ctx = LineContext {
            parser: self,
            source_line,
            line,
            kind,
            operands,
        };

        let instruction = ctx.validate().map_err(error)?;

        debug!(self.logger, "parsed instruction";
            "line" => line, "source_line" => source_line, "kind" => %kind);

        self.lines.insert(line, source_line);

        Ok(Some(instruction))
    }
}

impl<'p, 'a> LineContext<'p, 'a> {
    fn operand(&self, index: usize) -> &'a str {
        self.operands[index].text
    }

    /// A name that is about to be declared.
    fn fresh_name(&self, name: &str) -> Result<(), LoadErrorKind> {
        if name.len() > MAX_NAME_LEN {
            return Err(LoadErrorKind::NameTooLong { name: name.to_string(), max: MAX_NAME_LEN });
        }

        if parse_literal(name).is_some() {
            return Err(LoadErrorKind::InvalidName { name: name.to_string() });
        }

        if self.parser.symbol_table.lookup_declared(name).is_some() {
            return Err(LoadErrorKind::AlreadyDeclared { name: name.to_string() });
        }

        Ok(())
    }

    /// A reference to a variable that must already be declared.
    fn declared_name(&self, name: &str) -> Result<(), LoadErrorKind> {
        if name.len() > MAX_NAME_LEN {
            return Err(LoadErrorKind::NameTooLong { name: name.to_string(), max: MAX_NAME_LEN });
        }

        if self.parser.symbol_table.lookup_declared(name).is_none() {
            let suggestion = suggest(name, self.parser.symbol_table.names())
                .map(str::to_string);

            return Err(LoadErrorKind::Undeclared { name: name.to_string(), suggestion });
        }

        Ok(())
    }

    fn literal(&self, token: &str) -> Result<(), LoadErrorKind> {
        match parse_literal(token) {
            Some(_) => Ok(()),
            None => Err(LoadErrorKind::InvalidLiteral { token: token.to_string() }),
        }
    }

    /// An `if` operand, either a variable name or a literal. Variables are looked up only when
    /// the instruction is executed.
    fn comparand(&self, token: &str) -> Result<(), LoadErrorKind> {
        if parse_literal(token).is_none() && token.len() > MAX_NAME_LEN {
            return Err(LoadErrorKind::NameTooLong { name: token.to_string(), max: MAX_NAME_LEN });
        }

        Ok(())
    }

    fn validate(mut self) -> Result<Instruction, LoadErrorKind> {
        match self.kind {
            Kind::Declare => {
                let name = self.operand(0);
                self.fresh_name(name)?;
                self.parser.symbol_table.declare(name)
                    .map_err(|_| LoadErrorKind::AlreadyDeclared { name: name.to_string() })?;
            },
            Kind::Assign | Kind::Add | Kind::Sub | Kind::Mult | Kind::Div => {
                self.declared_name(self.operand(0))?;
                self.literal(self.operand(1))?;
            },
            Kind::Begin => {
                if let Some(first) = self.parser.begin {
                    return Err(LoadErrorKind::DuplicateBegin { first });
                }

                self.parser.begin = Some(self.line);
            },
            Kind::End => {
                if let Some(first) = self.parser.end {
                    return Err(LoadErrorKind::DuplicateEnd { first });
                }

                self.parser.end = Some(self.line);
            },
            Kind::Print => {
                self.declared_name(self.operand(0))?;
                self.declared_name(self.operand(1))?;
            },
            Kind::Goto => {
                let target = self.operand(0);

                match parse_literal(target) {
                    Some(n) if n > 0 => (),
                    _ => return Err(LoadErrorKind::InvalidGotoTarget { token: target.to_string() }),
                }
            },
            Kind::If => {
                self.comparand(self.operand(0))?;

                let op = self.operand(1);
                op.parse::<Comparison>()
                    .map_err(|_| LoadErrorKind::InvalidComparison { token: op.to_string() })?;

                self.comparand(self.operand(2))?;
            },
        }

        Ok(Instruction {
            line: self.line,
            kind: self.kind,
            operands: self.operands.iter().map(|l| l.text.to_string()).collect(),
            source_line: self.source_line,
        })
    }
}

#[cfg(test)]
fn parser() -> LineParser {
    LineParser::new(Logger::root(slog::Discard, slog::o!()))
}

#[cfg(test)]
fn parse_err(p: &mut LineParser, input: &str) -> LoadErrorKind {
    p.parse_line(1, input)
        .expect_err("line should be rejected")
        .kind
}

#[test]
fn test_parse_blank_line() {
    let mut p = parser();

    assert_eq!(p.parse_line(1, ""), Ok(None));
    assert_eq!(p.parse_line(2, "  \t"), Ok(None));
}

#[test]
fn test_parse_declare_and_assign() {
    let mut p = parser();

    let ins = p.parse_line(1, "10 int x").unwrap().unwrap();
    assert_eq!(ins.line, 10);
    assert_eq!(ins.kind, Kind::Declare);
    assert_eq!(ins.operands, vec!["x"]);
    assert!(p.symbol_table.lookup_declared("x").is_some());

    let ins = p.parse_line(2, "20 set x -5").unwrap().unwrap();
    assert_eq!(ins.kind, Kind::Assign);
    assert_eq!(ins.operands, vec!["x", "-5"]);
    assert_eq!(ins.source_line, 2);
}

#[test]
fn test_parse_line_number() {
    let mut p = parser();

    assert_eq!(parse_err(&mut p, "x int a"), LoadErrorKind::InvalidLineNumber { token: "x".into() });
    assert_eq!(parse_err(&mut p, "-3 int a"), LoadErrorKind::NonPositiveLineNumber { token: "-3".into() });
    assert_eq!(parse_err(&mut p, "0 begin"), LoadErrorKind::NonPositiveLineNumber { token: "0".into() });
}

#[test]
fn test_parse_duplicate_line_number() {
    let mut p = parser();

    p.parse_line(1, "5 int a").unwrap();
    assert_eq!(
        p.parse_line(2, "5 int b").unwrap_err(),
        LoadError::new(2, Some(5), LoadErrorKind::DuplicateLine { first_source_line: 1 }),
    );
}

#[test]
fn test_parse_unknown_keyword() {
    let mut p = parser();

    assert_eq!(parse_err(&mut p, "1 prnt a b c"), LoadErrorKind::UnknownKeyword {
        token: "prnt".into(),
        suggestion: Some("print"),
    });

    assert_eq!(parse_err(&mut p, "1 INT a"), LoadErrorKind::UnknownKeyword {
        token: "INT".into(),
        suggestion: None,
    });

    assert_eq!(parse_err(&mut p, "1"), LoadErrorKind::MissingKeyword);
}

#[test]
fn test_parse_operand_count() {
    let mut p = parser();

    assert_eq!(parse_err(&mut p, "1 begin now"), LoadErrorKind::OperandCount {
        kind: Kind::Begin,
        expected: 0,
        got: 1,
    });

    assert_eq!(parse_err(&mut p, "1 if a eq"), LoadErrorKind::OperandCount {
        kind: Kind::If,
        expected: 3,
        got: 2,
    });
}

#[test]
fn test_parse_names() {
    let mut p = parser();

    p.parse_line(1, "1 int abcdefghij").unwrap();

    assert_eq!(parse_err(&mut p, "2 int abcdefghijk"), LoadErrorKind::NameTooLong {
        name: "abcdefghijk".into(),
        max: MAX_NAME_LEN,
    });
    assert_eq!(parse_err(&mut p, "2 int abcdefghij"), LoadErrorKind::AlreadyDeclared {
        name: "abcdefghij".into(),
    });
    assert_eq!(parse_err(&mut p, "2 int -12"), LoadErrorKind::InvalidName { name: "-12".into() });
}

#[test]
fn test_parse_undeclared_variable() {
    let mut p = parser();

    p.parse_line(1, "1 int count").unwrap();

    assert_eq!(parse_err(&mut p, "2 add cuont 1"), LoadErrorKind::Undeclared {
        name: "cuont".into(),
        suggestion: Some("count".into()),
    });
    assert_eq!(parse_err(&mut p, "2 print count row x"), LoadErrorKind::Undeclared {
        name: "row".into(),
        suggestion: None,
    });
}

#[test]
fn test_parse_literals() {
    let mut p = parser();

    p.parse_line(1, "1 int x").unwrap();

    assert_eq!(parse_err(&mut p, "2 set x five"), LoadErrorKind::InvalidLiteral { token: "five".into() });
    assert_eq!(parse_err(&mut p, "2 div x +2"), LoadErrorKind::InvalidLiteral { token: "+2".into() });
    assert_eq!(parse_err(&mut p, "2 add x x"), LoadErrorKind::InvalidLiteral { token: "x".into() });
    assert!(p.parse_line(2, "2 mult x -1").unwrap().is_some());
}

#[test]
fn test_parse_begin_end_markers() {
    let mut p = parser();

    p.parse_line(1, "3 begin").unwrap();
    p.parse_line(2, "9 end").unwrap();

    assert_eq!(p.begin, Some(3));
    assert_eq!(p.end, Some(9));
    assert_eq!(parse_err(&mut p, "4 begin"), LoadErrorKind::DuplicateBegin { first: 3 });
    assert_eq!(parse_err(&mut p, "10 end"), LoadErrorKind::DuplicateEnd { first: 9 });
}

#[test]
fn test_parse_goto() {
    let mut p = parser();

    assert!(p.parse_line(1, "1 goto 500").unwrap().is_some());
    assert_eq!(parse_err(&mut p, "2 goto -1"), LoadErrorKind::InvalidGotoTarget { token: "-1".into() });
    assert_eq!(parse_err(&mut p, "2 goto top"), LoadErrorKind::InvalidGotoTarget { token: "top".into() });
}

#[test]
fn test_parse_if() {
    let mut p = parser();

    let ins = p.parse_line(1, "1 if a lte -2147483648").unwrap().unwrap();
    assert_eq!(ins.comparison(), Some(Comparison::LessOrEqual));

    assert_eq!(parse_err(&mut p, "2 if a is b"), LoadErrorKind::InvalidComparison { token: "is".into() });
    assert_eq!(parse_err(&mut p, "2 if a eq verylongname"), LoadErrorKind::NameTooLong {
        name: "verylongname".into(),
        max: MAX_NAME_LEN,
    });
}

#[test]
fn test_parse_print_text_is_opaque() {
    let mut p = parser();

    p.parse_line(1, "1 int r").unwrap();

    let ins = p.parse_line(2, "2 print r r end").unwrap().unwrap();
    assert_eq!(ins.operands, vec!["r", "r", "end"]);
    assert_eq!(p.end, None);
}
