use tinyline::{
    executor::{Executor, State},
    instruction::Kind,
    output::{Screen, TestOutput},
    program::Program,
};

use slog::{Logger, Drain, o};
use slog_term::{TermDecorator, FullFormat};

fn load(source: &str) -> Program {
    Program::parse(source)
        .expect("could not parse the program")
}

#[test]
fn test_hello_read_program() {
    let p = load(include_str!("hello.tl"));

    assert_eq!(p.len(), 5);
    assert_eq!(p.begin, 3);
    assert_eq!(p.end, 5);

    let kinds: Vec<_> = p.instructions.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![Kind::Declare, Kind::Assign, Kind::Begin, Kind::Print, Kind::End]);

    assert_eq!(p.instructions[3].operands, vec!["a", "a", "hi"]);
    assert!(p.symbol_table.lookup_declared("a").is_some());
    assert_eq!(p.symbol_table.lookup_set("a"), None);
}

#[test]
fn test_hello_execute_program() {
    let p = load(include_str!("hello.tl"));

    let mut output = TestOutput::new();
    let mut e = Executor::new(&p, &mut output);

    while !e.halted() {
        println!("{:?}", e.current_instruction());
        e.step().unwrap();
    }

    assert_eq!(e.pc(), 5);
    drop(e);

    assert_eq!(output.calls(), vec![(7, 7, "hi")]);
}

#[test]
fn test_countdown_execute_program() {
    let p = load(include_str!("countdown.tl"));

    assert_eq!(p.len(), 15);

    let mut e = Executor::new(&p, TestOutput::new());
    e.run().expect("error while executing the program");

    assert_eq!(e.symbols().value_of("n"), Some(0));
    assert_eq!(e.output().calls(), vec![
        (0, 0, "tick"),
        (1, 2, "tick"),
        (2, 4, "tick"),
        (0, 0, "liftoff"),
    ]);
}

#[test]
fn test_countdown_on_screen() {
    let p = load(include_str!("countdown.tl"));

    let mut e = Executor::new(&p, Screen::new(5, 10));
    e.run().expect("error while executing the program");

    assert_eq!(e.into_output().render(), "liftoff\n  tick\n    tick");
}

#[test]
fn test_shuffled_lines_follow_source_order() {
    let p = load(include_str!("shuffled.tl"));

    let mut e = Executor::new(&p, TestOutput::new());
    let mut visited = Vec::new();

    loop {
        visited.push(e.pc());

        if e.step().expect("error while executing the program") == State::Halted {
            break;
        }
    }

    assert_eq!(visited, vec![5, 40, 20, 30, 50]);
    assert_eq!(e.pc(), 100);
    assert_eq!(e.output().calls(), vec![(1, 1, "first")]);
}

#[test]
fn test_false_if_before_end() {
    let p = load("1 int a\n2 set a 1\n3 begin\n4 if a eq 2\n5 end\n");

    let mut e = Executor::new(&p, TestOutput::new());

    assert_eq!(e.run(), Ok(()));
    assert_eq!(e.pc(), 5);
    assert!(e.output().emissions().is_empty());
}

#[test]
fn test_verbose_logging() {
    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = Logger::root(drain, o!());

    let p = Program::parse_with_logger(include_str!("countdown.tl"), logger.clone())
        .expect("could not parse the program");

    let mut e = Executor::new(&p, TestOutput::new());
    e.set_logger(logger.new(o!("phase" => "execute")));
    e.run().expect("error while executing the program");

    assert_eq!(e.output().emissions().len(), 4);
}
