//! Loading whole programs into an instruction table.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use slog::{info, o, Discard, Logger};

use crate::error::{Error, LoadError, LoadErrorKind};
use crate::instruction::Instruction;
use crate::parser::LineParser;
use crate::symbol_table::SymbolTable;

/// A loaded and validated program.
///
/// The instructions are kept in the order they appear in the source, which is also the order
/// in which execution falls through from one instruction to the next. Declared line numbers
/// only matter for `goto` and for the `begin` and `end` markers.
#[derive(Debug, Clone)]
pub struct Program {
    pub instructions: Vec<Instruction>,

    /// Variables declared by the program, all unset.
    pub symbol_table: SymbolTable,

    /// Line number of the `begin` instruction.
    pub begin: u32,

    /// Line number of the `end` instruction.
    pub end: u32,

    /// Maps declared line numbers to indices of `instructions`.
    lines: HashMap<u32, usize>,
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

impl Program {
    /// Parses and validates program source.
    ///
    /// # Errors
    /// The first invalid line, or a missing `begin` or `end` instruction.
    pub fn parse(source: &str) -> Result<Program, LoadError> {
        Program::parse_with_logger(source, Logger::root(Discard, o!()))
    }

    pub fn parse_with_logger(source: &str, logger: Logger) -> Result<Program, LoadError> {
        let size = source.lines()
            .filter(|line| !is_blank(line))
            .count();

        let mut parser = LineParser::new(logger.clone());
        let mut instructions = Vec::with_capacity(size);

        for (i, line) in source.lines().enumerate() {
            if let Some(instruction) = parser.parse_line(i + 1, line)? {
                instructions.push(instruction);
            }
        }

        let begin = parser.begin
            .ok_or_else(|| LoadError::program(LoadErrorKind::MissingBegin))?;

        let end = parser.end
            .ok_or_else(|| LoadError::program(LoadErrorKind::MissingEnd))?;

        let lines = instructions.iter()
            .enumerate()
            .map(|(index, ins)| (ins.line, index))
            .collect();

        info!(logger, "program loaded";
            "instructions" => instructions.len(),
            "variables" => parser.symbol_table.len(),
            "begin" => begin,
            "end" => end);

        Ok(Program {
            instructions,
            symbol_table: parser.symbol_table,
            begin,
            end,
            lines,
        })
    }

    /// Reads and parses a program from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Program, Error> {
        Program::load_with_logger(path, Logger::root(Discard, o!()))
    }

    pub fn load_with_logger<P: AsRef<Path>>(path: P, logger: Logger) -> Result<Program, Error> {
        let source = std::fs::read_to_string(path)?;

        Ok(Program::parse_with_logger(&source, logger)?)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the storage index of the instruction declared with `line`.
    pub fn index_of(&self, line: u32) -> Option<usize> {
        self.lines.get(&line).copied()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Returns the instruction declared with `line`.
    pub fn instruction_at(&self, line: u32) -> Option<&Instruction> {
        self.index_of(line).and_then(|index| self.get(index))
    }

    /// A table of all instructions in storage order.
    pub fn listing(&self) -> Listing {
        Listing { program: self }
    }
}

/// Printable instruction table returned by [Program::listing].
pub struct Listing<'a> {
    program: &'a Program,
}

impl<'a> fmt::Display for Listing<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:<6} {:<6} {:<8} {:<12} {:<12} {}", "Index", "Line", "Command", "Arg1", "Arg2", "Arg3")?;

        for (index, ins) in self.program.instructions.iter().enumerate() {
            writeln!(
                f,
                "{:<6} {:<6} {:<8} {:<12} {:<12} {}",
                index,
                ins.line,
                ins.kind,
                ins.operand(0),
                ins.operand(1),
                ins.operand(2),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
use crate::instruction::Kind;

#[test]
fn test_load_counts_non_blank_lines() {
    let program = Program::parse("1 int a\n\n2 set a 7\n   \n3 begin\n4 print a a hi\n5 end\n\n").unwrap();

    assert_eq!(program.len(), 5);
    assert_eq!(program.begin, 3);
    assert_eq!(program.end, 5);
    assert_eq!(program.symbol_table.len(), 1);
    assert_eq!(program.instructions[3].source_line, 6);
}

#[test]
fn test_load_keeps_storage_order() {
    let program = Program::parse("5 end\n1 begin\n3 int x\n2 goto 5\n").unwrap();

    let lines: Vec<_> = program.instructions.iter().map(|i| i.line).collect();
    assert_eq!(lines, vec![5, 1, 3, 2]);

    assert_eq!(program.index_of(2), Some(3));
    assert_eq!(program.index_of(4), None);
    assert_eq!(program.instruction_at(3).map(|i| i.kind), Some(Kind::Declare));
}

#[test]
fn test_load_missing_markers() {
    assert_eq!(
        Program::parse("1 int x\n2 end\n").unwrap_err().kind,
        LoadErrorKind::MissingBegin,
    );
    assert_eq!(
        Program::parse("1 begin\n").unwrap_err().kind,
        LoadErrorKind::MissingEnd,
    );
    assert_eq!(
        Program::parse("").unwrap_err().kind,
        LoadErrorKind::MissingBegin,
    );
}

#[test]
fn test_load_stops_at_first_error() {
    let err = Program::parse("1 begin\n2 int x\n3 int x\n4 foo\n5 end\n").unwrap_err();

    assert_eq!(err.line, Some(3));
    assert_eq!(err.source_line, 3);
    assert_eq!(err.kind, LoadErrorKind::AlreadyDeclared { name: "x".into() });
}

#[test]
fn test_load_declaration_order() {
    let err = Program::parse("1 begin\n2 set x 1\n3 int x\n4 end\n").unwrap_err();

    assert_eq!(err.line, Some(2));
    assert_eq!(err.kind, LoadErrorKind::Undeclared { name: "x".into(), suggestion: None });
}

#[test]
fn test_listing() {
    let program = Program::parse("1 int a\n2 begin\n3 if a gte 3\n4 end\n").unwrap();
    let listing = program.listing().to_string();
    let rows: Vec<_> = listing.lines().collect();

    assert_eq!(rows.len(), 5);
    assert!(rows[0].starts_with("Index"));
    assert!(rows[3].starts_with("2      3      if       a            gte          3"));
}

#[test]
fn test_load_missing_file() {
    match Program::load("/nonexistent/program.tl") {
        Err(Error::Io(_)) => (),
        other => panic!("expected an io error, got {:?}", other),
    }
}
