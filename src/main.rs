use clap::{Arg, ArgAction, Command as ClapCommand};
use minilang::{lexer, parser, Error, Session};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

const INTERACTIVE_NAME: &str = "<interactive>";

fn main() {
    let matches = ClapCommand::new("minilang")
        .version(env!("CARGO_PKG_VERSION"))
        .about("MiniLang interpreter")
        .arg(
            Arg::new("input")
                .help("Source file to run; starts an interactive session when omitted")
                .index(1),
        )
        .arg(
            Arg::new("emit")
                .long("emit")
                .help("Print the token stream or syntax tree as JSON instead of running")
                .value_parser(["tokens", "ast"]),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log pipeline stages to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    let emit = matches.get_one::<String>("emit").map(String::as_str);
    let status = match matches.get_one::<String>("input") {
        Some(path) => run_file(path, emit),
        None => repl(),
    };
    process::exit(status);
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run_file(path: &str, emit: Option<&str>) -> i32 {
    if !Path::new(path).is_file() {
        eprintln!("Error: file '{}' not found", path);
        return 1;
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            report(&Error::Io(e), path);
            return 1;
        }
    };

    let result = match emit {
        Some(stage) => emit_stage(&source, stage),
        None => minilang::run(&source, path),
    };
    match result {
        Ok(()) => 0,
        Err(e) => {
            report(&e, path);
            1
        }
    }
}

fn emit_stage(source: &str, stage: &str) -> Result<(), Error> {
    let tokens = lexer::tokenize(source)?;
    let json = if stage == "tokens" {
        serde_json::to_string_pretty(&tokens)
    } else {
        serde_json::to_string_pretty(&parser::parse(tokens)?)
    };
    let json = json.map_err(|e| Error::Io(e.into()))?;
    println!("{}", json);
    Ok(())
}

fn repl() -> i32 {
    println!("MiniLang interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' to quit");

    let mut session = Session::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!(">>> ");
        if io::stdout().flush().is_err() {
            return 1;
        }

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                report(&Error::Io(e), INTERACTIVE_NAME);
                return 1;
            }
        }

        let input = line.trim();
        if input == "exit" {
            break;
        }
        if input.is_empty() {
            continue;
        }
        if let Err(e) = session.execute(input) {
            report(&e, INTERACTIVE_NAME);
        }
    }
    0
}

fn report(error: &Error, display_name: &str) {
    match error.location() {
        Some(location) => eprintln!(
            "{} error in {}: {} (line {}, column {})",
            error.category(),
            display_name,
            error.message(),
            location.line,
            location.column
        ),
        None => eprintln!(
            "{} error in {}: {}",
            error.category(),
            display_name,
            error.message()
        ),
    }
}
