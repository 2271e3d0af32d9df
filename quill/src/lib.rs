//! Pipeline glue: scan, parse, check and evaluate a piece of quill source code.

use quill_interp::Interpreter;
use quill_parser::lexer::{scan, Token};
use quill_parser::parser::Parser;
use quill_passes::return_check::ReturnCheck;
use quill_source::Source;
use std::io::{self, Write};
use std::sync::Once;
use tracing::debug;

pub use quill_interp;
pub use quill_parser;
pub use quill_source;

/// How the input is being fed to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A whole script. Every statement needs its `;`.
    Script,
    /// A single REPL line. The final `;` may be omitted and the value of a trailing expression
    /// statement is echoed.
    Interactive,
}

impl Mode {
    fn is_interactive(self) -> bool {
        self == Mode::Interactive
    }
}

/// Runs `source` on `interpreter`.
///
/// Every diagnostic is reported to `source.errors`. Evaluation only starts when scanning, parsing and
/// the static checks reported nothing. Inspect [`quill_source::ErrorReporter::had_syntax_error`] and
/// [`quill_source::ErrorReporter::had_runtime_error`] afterwards to tell how the run went.
pub fn run<W: Write>(interpreter: &mut Interpreter<W>, source: &Source, mode: Mode) -> io::Result<()> {
    run_tokens(interpreter, source, scan(source), mode)
}

/// Same as [`run`] for tokens that were already scanned from `source`.
pub fn run_tokens<W: Write>(
    interpreter: &mut Interpreter<W>,
    source: &Source,
    tokens: Vec<Token>,
    mode: Mode,
) -> io::Result<()> {
    let statements = Parser::with_tokens(source, tokens)
        .interactive(mode.is_interactive())
        .parse_program();
    ReturnCheck::new(source).check_program(&statements);

    if source.errors.had_syntax_error() {
        debug!("static errors reported, skipping evaluation");
        return Ok(());
    }

    interpreter.interpret(&statements, mode.is_interactive(), &source.errors)
}

static TRACING_INIT: Once = Once::new();

/// Installs the log subscriber.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=quill_interp=debug` or `RUST_LOG=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}
