use tinyline::{
    error::{Error, RuntimeError},
    executor::Executor,
    output::{Output, Screen, StdOutput},
    program::Program,
};

use clap::{App, Arg, ArgMatches};
use slog::{o, Discard, Drain, Logger};
use slog_term::{FullFormat, TermDecorator};

const EXIT_IO: i32 = 1;
const EXIT_LOAD: i32 = 2;
const EXIT_RUNTIME: i32 = 3;
const EXIT_ARITHMETIC: i32 = 4;

fn parse_arguments() -> ArgMatches<'static> {
    App::new("tinylinerun")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Mitja Karhusaari <mitja@karhusaari.me>")
        .about("Utility for loading and executing line-numbered programs")
        .arg(Arg::with_name("source")
             .help("File containing the program source")
             .value_name("SOURCE")
             .required(true)
             .index(1))
        .arg(Arg::with_name("verbose")
             .help("Enables verbose logging")
             .long("verbose")
             .short("v"))
        .arg(Arg::with_name("list")
             .help("Prints the instruction table before executing")
             .long("list")
             .short("l"))
        .arg(Arg::with_name("screen")
             .help("Renders the output onto a character grid instead of printing lines")
             .long("screen")
             .short("s"))
        .arg(Arg::with_name("rows")
             .help("Number of rows of the screen")
             .long("rows")
             .value_name("ROWS")
             .default_value("24")
             .validator(is_number))
        .arg(Arg::with_name("cols")
             .help("Number of columns of the screen")
             .long("cols")
             .value_name("COLS")
             .default_value("80")
             .validator(is_number))
        .get_matches()
}

fn is_number(value: String) -> Result<(), String> {
    value.parse::<usize>()
        .map(|_| ())
        .map_err(|_| format!("{} is not a number", value))
}

fn logger(verbose: bool) -> Logger {
    if !verbose {
        return Logger::root(Discard, o!());
    }

    let decorator = TermDecorator::new().build();
    let drain = FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, o!())
}

fn execute<O: Output>(program: &Program, output: O, logger: &Logger) -> Result<O, RuntimeError> {
    let mut executor = Executor::with_logger(program, output, logger.new(o!("phase" => "execute")));

    executor.run()?;

    Ok(executor.into_output())
}

fn run(args: &ArgMatches, logger: &Logger) -> Result<(), Error> {
    let file_path = args.value_of("source").unwrap_or_default();

    let program = Program::load_with_logger(file_path, logger.new(o!("phase" => "load")))?;

    if args.is_present("list") {
        print!("{}", program.listing());
    }

    if args.is_present("screen") {
        let rows = args.value_of("rows").and_then(|v| v.parse().ok()).unwrap_or(24);
        let cols = args.value_of("cols").and_then(|v| v.parse().ok()).unwrap_or(80);

        let screen = execute(&program, Screen::new(rows, cols), logger)?;
        println!("{}", screen.render());
    } else {
        execute(&program, StdOutput, logger)?;
    }

    Ok(())
}

fn main() {
    let args = parse_arguments();
    let logger = logger(args.is_present("verbose"));

    let status = match run(&args, &logger) {
        Ok(()) => 0,
        Err(Error::Io(io)) => {
            eprintln!("IO error: {}", io);
            EXIT_IO
        },
        Err(Error::Load(err)) => {
            eprintln!("Could not load the program: {}", err);
            EXIT_LOAD
        },
        Err(Error::Runtime(err)) if err.is_arithmetic_fault() => {
            eprintln!("Arithmetic fault: {}", err);
            EXIT_ARITHMETIC
        },
        Err(Error::Runtime(err)) => {
            eprintln!("Execution error: {}", err);
            EXIT_RUNTIME
        },
    };

    // Flush the asynchronous drain before exiting.
    drop(logger);

    std::process::exit(status);
}
