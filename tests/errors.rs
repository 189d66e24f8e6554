use tinyline::{
    error::{Error, LoadErrorKind, RuntimeErrorKind},
    executor::Executor,
    instruction::Kind,
    output::TestOutput,
    program::Program,
};

fn load_error(source: &str) -> LoadErrorKind {
    Program::parse(source)
        .expect_err("the program should not load")
        .kind
}

fn runtime_error(source: &str) -> (u32, RuntimeErrorKind) {
    let program = Program::parse(source)
        .expect("could not parse the program");

    let mut executor = Executor::new(&program, TestOutput::new());
    let err = executor.run()
        .expect_err("the program should fail");

    assert!(executor.halted());

    (err.pc, err.kind)
}

#[test]
fn test_redeclaration_anywhere() {
    let sources = [
        "1 int x\n2 int x\n3 begin\n4 end\n",
        "1 begin\n2 int x\n3 end\n4 int x\n",
        "4 int x\n1 begin\n2 end\n3 int x\n",
    ];

    for source in &sources {
        assert_eq!(load_error(source), LoadErrorKind::AlreadyDeclared { name: "x".into() });
    }
}

#[test]
fn test_use_before_declaration() {
    for command in &["set x 1", "add x 1", "sub x 1", "mult x 1", "div x 1", "print x x t"] {
        let source = format!("1 begin\n2 {}\n3 int x\n4 end\n", command);

        match load_error(&source) {
            LoadErrorKind::Undeclared { name, .. } => assert_eq!(name, "x"),
            kind => panic!("unexpected error for '{}': {:?}", command, kind),
        }
    }
}

#[test]
fn test_if_operands_are_not_checked_when_loading() {
    let program = Program::parse("1 begin\n2 if y eq 1\n3 end\n")
        .expect("could not parse the program");

    assert_eq!(program.instructions[1].kind, Kind::If);
}

#[test]
fn test_wrong_operand_counts() {
    let cases = [
        ("1 int", Kind::Declare, 1, 0),
        ("1 set x", Kind::Assign, 2, 1),
        ("1 end now", Kind::End, 0, 1),
        ("1 print x x", Kind::Print, 3, 2),
        ("1 goto 1 2", Kind::Goto, 1, 2),
    ];

    for (line, kind, expected, got) in cases.iter().cloned() {
        assert_eq!(
            load_error(line),
            LoadErrorKind::OperandCount { kind, expected, got },
            "for line '{}'", line,
        );
    }
}

#[test]
fn test_unset_arithmetic_fails_at_runtime() {
    let (pc, kind) = runtime_error("1 int x\n2 begin\n3 mult x 2\n4 end\n");

    assert_eq!(pc, 3);
    assert_eq!(kind, RuntimeErrorKind::NotSet { name: "x".into() });
}

#[test]
fn test_goto_before_begin_and_after_end() {
    let (pc, kind) = runtime_error("1 int x\n5 begin\n6 goto 4\n8 end\n");
    assert_eq!(pc, 6);
    assert_eq!(kind, RuntimeErrorKind::GotoOutOfRange { target: 4, begin: 5, end: 8 });

    let (pc, kind) = runtime_error("5 begin\n6 goto 9\n8 end\n9 int x\n");
    assert_eq!(pc, 6);
    assert_eq!(kind, RuntimeErrorKind::GotoOutOfRange { target: 9, begin: 5, end: 8 });
}

#[test]
fn test_goto_end_halts() {
    let program = Program::parse("1 begin\n2 goto 9\n3 goto 2\n9 end\n").unwrap();
    let mut executor = Executor::new(&program, TestOutput::new());

    assert_eq!(executor.run(), Ok(()));
    assert_eq!(executor.pc(), 9);
}

#[test]
fn test_division_by_zero_is_an_arithmetic_fault() {
    let program = Program::parse("1 int x\n2 set x 1\n3 begin\n4 div x 0\n5 end\n").unwrap();
    let mut executor = Executor::new(&program, TestOutput::new());

    let err = executor.run().unwrap_err();

    assert!(err.is_arithmetic_fault());
    assert_eq!(err.to_string(), "error at line 4: division of x by zero");

    match Error::from(err) {
        Error::Runtime(_) => (),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_load_error_messages() {
    let err = Program::parse("1 begin\n2 int x\n\n7 prnt x x hello\n8 end\n").unwrap_err();

    assert_eq!(err.to_string(), "error at line 7 (source line 4): invalid command 'prnt', did you mean 'print'?");

    let err = Program::parse("1 int x\n2 begin\n").unwrap_err();

    assert_eq!(err.to_string(), "error: no end command");
}
