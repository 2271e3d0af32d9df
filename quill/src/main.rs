use clap::Parser;
use console::style;
use quill::{run_tokens, Mode};
use quill_interp::Interpreter;
use quill_parser::lexer::{scan, Token};
use quill_source::Source;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// quill is a small dynamically typed scripting language with first-class functions and closures.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run. Starts an interactive prompt when omitted.
    script: Option<PathBuf>,

    /// Print the scanned tokens to stderr before parsing.
    #[arg(long)]
    tokens: bool,
}

/// Lexical or syntax error.
const EXIT_STATIC_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;
/// The script could not be read.
const EXIT_IO_ERROR: u8 = 74;

fn main() -> ExitCode {
    quill::init_tracing();
    let args = Args::parse();

    let result = match &args.script {
        Some(path) => run_file(path, args.tokens),
        None => run_prompt(args.tokens).map(|_| ExitCode::SUCCESS),
    };
    result.unwrap_or_else(|err| {
        eprintln!("{}", style(err).red().for_stderr());
        ExitCode::from(EXIT_IO_ERROR)
    })
}

fn run_file(path: &Path, dump_tokens: bool) -> io::Result<ExitCode> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!(
                "{}",
                style(format!("Could not read '{}': {}", path.display(), err))
                    .red()
                    .for_stderr()
            );
            return Ok(ExitCode::from(EXIT_IO_ERROR));
        }
    };

    let source = Source::new(&content);
    let mut interpreter = Interpreter::new();
    run_tokens(&mut interpreter, &source, tokens(&source, dump_tokens), Mode::Script)?;
    report(&source);

    Ok(if source.errors.had_syntax_error() {
        ExitCode::from(EXIT_STATIC_ERROR)
    } else if source.errors.had_runtime_error() {
        ExitCode::from(EXIT_RUNTIME_ERROR)
    } else {
        ExitCode::SUCCESS
    })
}

/// Reads and runs one line at a time until end of input.
/// Globals live as long as the session, errors only affect the line they were reported on.
fn run_prompt(dump_tokens: bool) -> io::Result<()> {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let source = Source::new(&line);
        run_tokens(&mut interpreter, &source, tokens(&source, dump_tokens), Mode::Interactive)?;
        report(&source);
    }

    println!();
    Ok(())
}

fn tokens(source: &Source, dump: bool) -> Vec<Token> {
    let tokens = scan(source);
    if dump {
        for token in &tokens {
            eprintln!("{:>4} {}", token.line, token);
        }
    }
    tokens
}

fn report(source: &Source) {
    for diagnostic in source.errors.diagnostics() {
        eprintln!("{}", style(diagnostic).red().for_stderr());
    }
}
