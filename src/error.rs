//! Error types for loading and executing programs.
//!
//! Every error is fatal to the phase it occurs in. Loading stops at the first invalid line and
//! execution stops at the first failing instruction.

use std::fmt::{self, Display};

use crate::instruction::{ArithmeticOp, Kind};

/// Reason a program could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadErrorKind {
    /// The first token of a line is not an integer.
    InvalidLineNumber { token: String },

    /// The first token of a line is zero or negative.
    NonPositiveLineNumber { token: String },

    /// Another instruction already uses the same line number.
    DuplicateLine { first_source_line: usize },

    /// The second token of a line is not a known keyword.
    UnknownKeyword { token: String, suggestion: Option<&'static str> },

    /// The line has no keyword at all.
    MissingKeyword,

    OperandCount { kind: Kind, expected: usize, got: usize },

    NameTooLong { name: String, max: usize },

    /// Variable names may not look like integer literals.
    InvalidName { name: String },

    AlreadyDeclared { name: String },

    Undeclared { name: String, suggestion: Option<String> },

    InvalidLiteral { token: String },

    InvalidGotoTarget { token: String },

    InvalidComparison { token: String },

    DuplicateBegin { first: u32 },

    DuplicateEnd { first: u32 },

    MissingBegin,

    MissingEnd,
}

impl Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use LoadErrorKind::*;

        match self {
            InvalidLineNumber { token } => write!(f, "{} is not an integer", token),
            NonPositiveLineNumber { token } => write!(f, "{} is not a positive integer", token),
            DuplicateLine { first_source_line } =>
                write!(f, "line number already used on source line {}", first_source_line),
            UnknownKeyword { token, suggestion: Some(s) } =>
                write!(f, "invalid command '{}', did you mean '{}'?", token, s),
            UnknownKeyword { token, suggestion: None } => write!(f, "invalid command '{}'", token),
            MissingKeyword => write!(f, "missing command"),
            OperandCount { kind, expected, got } => write!(
                f,
                "incorrect number of arguments for command '{}', expected {} got {}\n\t{}",
                kind, expected, got, kind.usage(),
            ),
            NameTooLong { name, max } =>
                write!(f, "variable name {} is longer than {} characters", name, max),
            InvalidName { name } => write!(f, "{} is not a valid variable name", name),
            AlreadyDeclared { name } => write!(f, "variable {} is already defined", name),
            Undeclared { name, suggestion: Some(s) } =>
                write!(f, "variable {} is not defined, did you mean '{}'?", name, s),
            Undeclared { name, suggestion: None } => write!(f, "variable {} is not defined", name),
            InvalidLiteral { token } => write!(f, "{} is not an integer", token),
            InvalidGotoTarget { token } => write!(f, "{} is not a positive integer", token),
            InvalidComparison { token } => write!(f, "invalid operator {}", token),
            DuplicateBegin { first } => write!(f, "begin already declared on line {}", first),
            DuplicateEnd { first } => write!(f, "end already declared on line {}", first),
            MissingBegin => write!(f, "no begin command"),
            MissingEnd => write!(f, "no end command"),
        }
    }
}

/// Error produced while loading a program.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadError {
    /// The declared line number of the offending instruction, if it could be read.
    pub line: Option<u32>,

    /// The 1-based line in the source text. Zero for errors about the whole program.
    pub source_line: usize,

    pub kind: LoadErrorKind,
}

impl LoadError {
    pub(crate) fn new(source_line: usize, line: Option<u32>, kind: LoadErrorKind) -> LoadError {
        LoadError { line, source_line, kind }
    }

    pub(crate) fn program(kind: LoadErrorKind) -> LoadError {
        LoadError { line: None, source_line: 0, kind }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.line, self.source_line) {
            (Some(line), source_line) =>
                write!(f, "error at line {} (source line {}): {}", line, source_line, self.kind),
            (None, 0) => write!(f, "error: {}", self.kind),
            (None, source_line) => write!(f, "error at source line {}: {}", source_line, self.kind),
        }
    }
}

impl std::error::Error for LoadError {}

/// Reason the execution of a program stopped with an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    /// A variable was used before it was assigned.
    NotSet { name: String },

    /// A `goto` target lies outside the `begin`..=`end` range.
    GotoOutOfRange { target: u32, begin: u32, end: u32 },

    /// No instruction is declared with the line number.
    LineNotFound { line: u32 },

    /// An operand is neither a set variable nor an integer literal.
    Unresolved { token: String },

    /// Execution ran past the last instruction of the program.
    MissingSuccessor,

    /// The arithmetic operation has no result, eg. division by zero.
    ArithmeticFault { name: String, op: ArithmeticOp, rhs: i32 },
}

impl Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use RuntimeErrorKind::*;

        match self {
            NotSet { name } => write!(f, "variable {} is not set", name),
            GotoOutOfRange { target, begin, end } =>
                write!(f, "invalid line number {}, expected {}..={}", target, begin, end),
            LineNotFound { line } => write!(f, "command at line {} not found", line),
            Unresolved { token } => write!(f, "{} is not defined", token),
            MissingSuccessor => write!(f, "no command follows"),
            ArithmeticFault { name, op: ArithmeticOp::Divide, rhs: 0 } =>
                write!(f, "division of {} by zero", name),
            ArithmeticFault { name, op, rhs } =>
                write!(f, "arithmetic fault applying {:?} {} to {}", op, rhs, name),
        }
    }
}

/// Error produced while executing a program.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    /// The program counter at the time of the error.
    pub pc: u32,

    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    /// Returns true for arithmetic faults, which callers may want to treat separately.
    pub fn is_arithmetic_fault(&self) -> bool {
        match self.kind {
            RuntimeErrorKind::ArithmeticFault { .. } => true,
            _ => false,
        }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "error at line {}: {}", self.pc, self.kind)
    }
}

impl std::error::Error for RuntimeError {}

/// Any error that can happen between reading a source file and finishing its execution.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Load(LoadError),
    Runtime(RuntimeError),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Load(e) => write!(f, "load error: {}", e),
            Error::Runtime(e) => write!(f, "runtime error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<LoadError> for Error {
    fn from(e: LoadError) -> Error {
        Error::Load(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Error {
        Error::Runtime(e)
    }
}

#[test]
fn test_display_load_error() {
    let err = LoadError::new(3, Some(30), LoadErrorKind::AlreadyDeclared { name: "x".into() });
    assert_eq!(err.to_string(), "error at line 30 (source line 3): variable x is already defined");

    let err = LoadError::program(LoadErrorKind::MissingEnd);
    assert_eq!(err.to_string(), "error: no end command");
}

#[test]
fn test_display_runtime_error() {
    let err = RuntimeError {
        pc: 7,
        kind: RuntimeErrorKind::ArithmeticFault {
            name: "x".into(),
            op: ArithmeticOp::Divide,
            rhs: 0,
        },
    };

    assert!(err.is_arithmetic_fault());
    assert_eq!(err.to_string(), "error at line 7: division of x by zero");
}
