//! A crate for loading and running programs written in a tiny line-numbered language.
//!
//! Every line of a program starts with a line number followed by a command:
//!
//! | Command                     | Effect                                                     |
//! |-----------------------------|------------------------------------------------------------|
//! | `int <var>`                 | declares a variable                                        |
//! | `set <var> <#>`             | assigns a value to a variable                              |
//! | `add`/`sub`/`mult`/`div <var> <#>` | updates a variable that has been assigned           |
//! | `print <row> <col> <text>`  | emits `text` at the position held by two variables         |
//! | `goto <line>`               | continues from another line between `begin` and `end`      |
//! | `if <a> <op> <b>`           | skips the next line unless the comparison holds            |
//! | `begin` / `end`             | marks where execution starts and stops                     |
//!
//! The comparison operators of `if` are `eq`, `ne`, `gt`, `gte`, `lt` and `lte`, and its
//! operands can be variables or integer literals.
//!
//! Loading a program validates every line and builds the instruction table and the variables.
//! Execution starts from the `begin` line and continues with the next instruction *in the
//! order of the source text* until the program counter reaches the `end` line.
//!
//! # Example
//! ```
//! use tinyline::{
//!     program::Program,
//!     executor::Executor,
//!     output::TestOutput,
//! };
//!
//! let source = r#"
//! 1 int row
//! 2 int col
//! 3 set row 2
//! 4 set col 0
//! 5 begin
//! 6 print row col hello
//! 7 add col 6
//! 8 if col lte 12
//! 9 goto 6
//! 10 end
//! "#;
//!
//! // Parse and validate the program.
//! let program = Program::parse(source).unwrap();
//!
//! // Execute it, recording everything it prints.
//! let mut executor = Executor::new(&program, TestOutput::new());
//! executor.run()
//!     .expect("an error occured while executing the program");
//!
//! assert_eq!(
//!     executor.output().calls(),
//!     vec![(2, 0, "hello"), (2, 6, "hello"), (2, 12, "hello")],
//! );
//! ```
//!
//! # Executables
//!
//! ## `tinylinerun`
//!
//! Runs a program file and writes the output of `print` as `row col text` lines, or renders it
//! onto a character grid with `--screen`. Requires the `tinylinerun` feature.
pub mod token;
pub mod operand;
pub mod instruction;
pub mod symbol_table;
mod parser;
pub mod program;
pub mod executor;
pub mod output;
pub mod error;
