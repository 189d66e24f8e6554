//! [Executor] for running [loaded programs](crate::program::Program).

use slog::{info, o, trace, warn, Discard, Logger};

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::instruction::{ArithmeticOp, Instruction, Kind};
use crate::operand::{parse_literal, resolve};
use crate::output::Output;
use crate::program::Program;
use crate::symbol_table::{MutateError, SymbolTable};

/// Whether the executor can continue after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
}

/// The executor walks a program's instruction table with a program counter, starting at the
/// `begin` line and stopping once the counter reaches the `end` line. Assignments stored before
/// the `begin` instruction are applied when the executor is created.
///
/// The executor works on its own copy of the program's variables, so the same [Program] can be
/// executed any number of times.
pub struct Executor<'p, O> {
    program: &'p Program,

    /// The variables of the program and their current values.
    symbols: SymbolTable,

    /// The declared line number of the next instruction to be executed.
    pc: u32,

    /// Receives the output of `print` instructions.
    output: O,

    /// True if the execution has been halted, either by reaching the end or by an error.
    halted: bool,

    logger: Logger,
}

impl<'p, O> Executor<'p, O> where O: Output {
    /// Create a new executor.
    ///
    /// # Parameters
    /// - `program`: The program to execute.
    /// - `output`: An [Output] that receives the text of `print` instructions.
    pub fn new(program: &'p Program, output: O) -> Executor<'p, O> {
        Executor::with_logger(program, output, Logger::root(Discard, o!()))
    }

    pub fn with_logger(program: &'p Program, output: O, logger: Logger) -> Executor<'p, O> {
        let mut symbols = program.symbol_table.clone();

        // Assignments stored ahead of `begin` initialize the variables.
        for ins in program.instructions.iter().take_while(|ins| ins.kind != Kind::Begin) {
            if ins.kind != Kind::Assign {
                continue;
            }

            if let (Some(id), Some(value)) = (symbols.lookup_declared(ins.operand(0)), parse_literal(ins.operand(1))) {
                trace!(logger, "initialize"; "line" => ins.line, "variable" => ins.operand(0), "value" => value);
                symbols.assign(id, value);
            }
        }

        Executor {
            program,
            symbols,
            pc: program.begin,
            output,
            halted: program.begin >= program.end,
            logger,
        }
    }

    pub fn set_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Returns the instruction the program counter points to.
    pub fn current_instruction(&self) -> Option<&'p Instruction> {
        self.program.instruction_at(self.pc)
    }

    fn error(&self, kind: RuntimeErrorKind) -> RuntimeError {
        RuntimeError { pc: self.pc, kind }
    }

    fn not_set(&self, name: &str) -> RuntimeError {
        self.error(RuntimeErrorKind::NotSet { name: name.to_string() })
    }

    fn resolve(&self, token: &str) -> Result<i32, RuntimeError> {
        resolve(&self.symbols, token)
            .map(|resolved| resolved.value())
            .ok_or_else(|| self.error(RuntimeErrorKind::Unresolved { token: token.to_string() }))
    }

    /// Applies `op` to the variable named by the first operand.
    fn arithmetic(&mut self, ins: &Instruction, op: ArithmeticOp) -> Result<i32, RuntimeError> {
        let name = ins.operand(0);
        let id = self.symbols.lookup_set(name)
            .ok_or_else(|| self.not_set(name))?;
        let rhs = self.resolve(ins.operand(1))?;

        match self.symbols.mutate(id, op, rhs) {
            Ok(value) => Ok(value),
            Err(MutateError::NotSet) => Err(self.not_set(name)),
            Err(MutateError::Arithmetic) => Err(self.error(RuntimeErrorKind::ArithmeticFault {
                name: name.to_string(),
                op,
                rhs,
            })),
        }
    }

    /// Executes the instruction at `index`.
    ///
    /// # Returns
    /// The storage index of the instruction to continue from.
    fn execute(&mut self, index: usize, ins: &Instruction) -> Result<usize, RuntimeError> {
        let next = index + 1;

        match ins.kind {
            Kind::Declare | Kind::Begin | Kind::End => Ok(next),

            Kind::Assign => {
                let name = ins.operand(0);
                let id = self.symbols.lookup_declared(name)
                    .ok_or_else(|| self.error(RuntimeErrorKind::Unresolved { token: name.to_string() }))?;
                let value = self.resolve(ins.operand(1))?;

                self.symbols.assign(id, value);

                Ok(next)
            },

            Kind::Add => self.arithmetic(ins, ArithmeticOp::Add).map(|_| next),
            Kind::Sub => self.arithmetic(ins, ArithmeticOp::Subtract).map(|_| next),
            Kind::Mult => self.arithmetic(ins, ArithmeticOp::Multiply).map(|_| next),
            Kind::Div => self.arithmetic(ins, ArithmeticOp::Divide).map(|_| next),

            Kind::Print => {
                let row = self.symbols.value_of(ins.operand(0))
                    .ok_or_else(|| self.not_set(ins.operand(0)))?;
                let col = self.symbols.value_of(ins.operand(1))
                    .ok_or_else(|| self.not_set(ins.operand(1)))?;

                self.output.emit(row, col, ins.operand(2));

                Ok(next)
            },

            Kind::Goto => {
                let target = parse_literal(ins.operand(0))
                    .ok_or_else(|| self.error(RuntimeErrorKind::Unresolved { token: ins.operand(0).to_string() }))?;

                let (begin, end) = (self.program.begin, self.program.end);

                if target < begin as i32 || target > end as i32 {
                    return Err(self.error(RuntimeErrorKind::GotoOutOfRange {
                        target: target as u32,
                        begin,
                        end,
                    }));
                }

                let target = target as u32;

                self.program.index_of(target)
                    .ok_or_else(|| self.error(RuntimeErrorKind::LineNotFound { line: target }))
            },

            Kind::If => {
                let lhs = self.resolve(ins.operand(0))?;
                let rhs = self.resolve(ins.operand(2))?;

                let comparison = ins.comparison()
                    .ok_or_else(|| self.error(RuntimeErrorKind::Unresolved { token: ins.operand(1).to_string() }))?;

                if comparison.evaluate(lhs, rhs) {
                    return Ok(next);
                }

                // A false condition skips one stored instruction. Skipping the last one lands on
                // it instead, which halts if it is the end.
                if next + 1 < self.program.len() {
                    Ok(next + 1)
                } else {
                    Ok(next)
                }
            },
        }
    }

    fn step_inner(&mut self) -> Result<State, RuntimeError> {
        let program = self.program;

        let index = program.index_of(self.pc)
            .ok_or_else(|| self.error(RuntimeErrorKind::LineNotFound { line: self.pc }))?;

        let ins = &program.instructions[index];

        trace!(self.logger, "execute"; "pc" => self.pc, "index" => index, "instruction" => %ins);

        let next = self.execute(index, ins)?;

        self.pc = program.get(next)
            .map(|ins| ins.line)
            .ok_or_else(|| self.error(RuntimeErrorKind::MissingSuccessor))?;

        if self.pc >= program.end {
            self.halted = true;
            info!(self.logger, "program halted"; "pc" => self.pc);
            return Ok(State::Halted);
        }

        Ok(State::Running)
    }

    /// Executes the instruction the program counter points to and moves the program counter to
    /// the next instruction.
    ///
    /// # Errors
    /// Any runtime error. The executor is halted afterwards.
    pub fn step(&mut self) -> Result<State, RuntimeError> {
        if self.halted {
            return Ok(State::Halted);
        }

        let result = self.step_inner();

        if let Err(ref err) = result {
            self.halted = true;
            warn!(self.logger, "execution failed"; "pc" => err.pc, "error" => %err.kind);
        }

        result
    }

    /// Executes the program until it reaches the `end` line.
    ///
    /// # Errors
    /// The first runtime error, which also stops the execution.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        while self.step()? == State::Running {}

        Ok(())
    }
}

#[cfg(test)]
use crate::output::TestOutput;

#[cfg(test)]
fn run(source: &str) -> (Result<(), RuntimeError>, SymbolTable, TestOutput) {
    let program = Program::parse(source).expect("could not parse program");
    let mut executor = Executor::new(&program, TestOutput::new());
    let result = executor.run();
    let symbols = executor.symbols().clone();

    (result, symbols, executor.into_output())
}

#[test]
fn test_arithmetic_sequence() {
    let (result, symbols, _) = run(r#"
1 int x
2 int a
3 int b
4 int c
5 int d
6 begin
7 set x 5
8 add x 3
9 set a 8
10 sub a 10
11 set b -2
12 mult b -1
13 set c 2
14 div c 2
15 end
"#);

    assert_eq!(result, Ok(()));
    assert_eq!(symbols.value_of("x"), Some(8));
    assert_eq!(symbols.value_of("a"), Some(-2));
    assert_eq!(symbols.value_of("b"), Some(2));
    assert_eq!(symbols.value_of("c"), Some(1));
    assert_eq!(symbols.value_of("d"), None);
}

#[test]
fn test_unset_variable_fails_at_runtime() {
    let (result, _, _) = run("1 int x\n2 begin\n3 add x 1\n4 end\n");

    assert_eq!(result, Err(RuntimeError {
        pc: 3,
        kind: RuntimeErrorKind::NotSet { name: "x".into() },
    }));
}

#[test]
fn test_print_requires_set_variables() {
    let (result, _, output) = run("1 int r\n2 int c\n3 begin\n4 set r 1\n5 print r c x\n6 end\n");

    assert_eq!(result, Err(RuntimeError {
        pc: 5,
        kind: RuntimeErrorKind::NotSet { name: "c".into() },
    }));
    assert!(output.emissions().is_empty());
}

#[test]
fn test_division_by_zero() {
    let (result, symbols, _) = run("1 int x\n2 begin\n3 set x 9\n4 div x 0\n5 end\n");

    let err = result.unwrap_err();
    assert!(err.is_arithmetic_fault());
    assert_eq!(err.pc, 4);
    assert_eq!(symbols.value_of("x"), Some(9));
}

#[test]
fn test_assignments_before_begin_initialize() {
    let program = Program::parse("1 int a\n2 set a 7\n3 add a 1\n4 begin\n5 end\n").unwrap();
    let executor = Executor::new(&program, TestOutput::new());

    assert_eq!(executor.symbols().value_of("a"), Some(7));
    assert_eq!(executor.pc(), 4);
}

#[test]
fn test_if_true_runs_next() {
    let (result, _, output) = run(r#"
1 int a
2 set a 4
3 begin
4 if 3 eq 3
5 print a a yes
6 if a eq a
7 print a a again
8 end
"#);

    assert_eq!(result, Ok(()));
    assert_eq!(output.calls(), vec![(4, 4, "yes"), (4, 4, "again")]);
}

#[test]
fn test_if_false_skips_one() {
    let (result, _, output) = run(r#"
1 int a
2 set a 4
3 begin
4 if a lt -1
5 print a a skipped
6 print a a shown
7 end
"#);

    assert_eq!(result, Ok(()));
    assert_eq!(output.calls(), vec![(4, 4, "shown")]);
}

#[test]
fn test_if_unresolved_operand() {
    let (result, _, _) = run("1 int a\n2 begin\n3 if a eq 1\n4 end\n");

    assert_eq!(result, Err(RuntimeError {
        pc: 3,
        kind: RuntimeErrorKind::Unresolved { token: "a".into() },
    }));
}

#[test]
fn test_if_false_before_end_halts() {
    let (result, _, output) = run("1 begin\n2 if 1 gt 2\n3 end\n");

    assert_eq!(result, Ok(()));
    assert!(output.emissions().is_empty());
}

#[test]
fn test_if_false_skips_stored_end() {
    let (result, _, output) = run(r#"
1 int a
2 set a 1
4 begin
5 if a eq 2
10 end
6 print a a after
7 goto 10
"#);

    assert_eq!(result, Ok(()));
    assert_eq!(output.calls(), vec![(1, 1, "after")]);
}

#[test]
fn test_if_false_cannot_skip_last_instruction() {
    let (result, symbols, _) = run("9 end\n1 int x\n2 begin\n3 if 1 eq 2\n4 set x 5\n");

    assert_eq!(result, Err(RuntimeError {
        pc: 4,
        kind: RuntimeErrorKind::MissingSuccessor,
    }));
    assert_eq!(symbols.value_of("x"), Some(5));
}

#[test]
fn test_arithmetic_fault_keeps_value() {
    let (result, symbols, _) = run("1 int x\n2 begin\n3 set x -2147483648\n4 div x -1\n5 end\n");

    assert_eq!(result, Err(RuntimeError {
        pc: 4,
        kind: RuntimeErrorKind::ArithmeticFault {
            name: "x".into(),
            op: ArithmeticOp::Divide,
            rhs: -1,
        },
    }));
    assert_eq!(symbols.value_of("x"), Some(i32::min_value()));
}

#[test]
fn test_goto_loop() {
    let (result, symbols, output) = run(r#"
1 int i
2 int one
3 begin
4 set i 0
5 set one 1
6 add i 1
7 if i lt 3
8 goto 6
9 print i one done
10 end
"#);

    assert_eq!(result, Ok(()));
    assert_eq!(symbols.value_of("i"), Some(3));
    assert_eq!(output.calls(), vec![(3, 1, "done")]);
}

#[test]
fn test_goto_out_of_range() {
    for target in &["1", "9"] {
        let source = format!("1 int x\n2 begin\n3 goto {}\n4 end\n9 int y\n", target);
        let (result, _, _) = run(&source);

        let err = result.unwrap_err();
        assert_eq!(err.pc, 3);
        match err.kind {
            RuntimeErrorKind::GotoOutOfRange { begin: 2, end: 4, .. } => (),
            kind => panic!("unexpected error {:?}", kind),
        }
    }
}

#[test]
fn test_goto_missing_line() {
    let (result, _, _) = run("1 begin\n2 goto 3\n4 end\n");

    assert_eq!(result, Err(RuntimeError {
        pc: 2,
        kind: RuntimeErrorKind::LineNotFound { line: 3 },
    }));
}

#[test]
fn test_successor_follows_storage_order() {
    let (result, _, output) = run(r#"
1 int a
2 set a 0
3 begin
30 print a a first
20 print a a second
40 end
"#);

    assert_eq!(result, Ok(()));
    assert_eq!(output.calls(), vec![(0, 0, "first"), (0, 0, "second")]);
}

#[test]
fn test_missing_successor() {
    let (result, _, _) = run("5 end\n1 begin\n");

    assert_eq!(result, Err(RuntimeError {
        pc: 1,
        kind: RuntimeErrorKind::MissingSuccessor,
    }));
}

#[test]
fn test_halted_after_error() {
    let program = Program::parse("1 int x\n2 begin\n3 add x 1\n4 end\n").unwrap();
    let mut executor = Executor::new(&program, TestOutput::new());

    assert!(executor.step().is_err());
    assert!(executor.halted());
    assert_eq!(executor.step(), Ok(State::Halted));
}

#[test]
fn test_program_can_run_twice() {
    let program = Program::parse("1 int x\n2 begin\n3 set x 1\n4 add x 1\n5 end\n").unwrap();

    for _ in 0..2 {
        let mut executor = Executor::new(&program, TestOutput::new());
        executor.run().unwrap();
        assert_eq!(executor.symbols().value_of("x"), Some(2));
    }

    assert_eq!(program.symbol_table.value_of("x"), None);
}

#[test]
fn test_begin_after_end_does_nothing() {
    let program = Program::parse("1 end\n2 int x\n3 begin\n").unwrap();
    let mut executor = Executor::new(&program, TestOutput::new());

    assert!(executor.halted());
    assert_eq!(executor.run(), Ok(()));
    assert_eq!(executor.pc(), 3);
}
