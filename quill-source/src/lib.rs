//! Source code representation and error management.

use std::{cell::RefCell, fmt};

/// Represents source code.
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
    /// Accumulated errors.
    pub errors: ErrorReporter,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            errors: ErrorReporter::new(),
        }
    }

    /// Returns `true` if `Source` has no accumulated errors. Returns `false` otherwise.
    pub fn has_no_errors(&self) -> bool {
        !self.errors.has_errors()
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// The pipeline stage a [`Diagnostic`] was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecognized character or unterminated string.
    Lexical,
    /// Unexpected token or invalid construct.
    Syntax,
    /// Raised while evaluating.
    Runtime,
}

/// Where on its line a [`Diagnostic`] points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Only the line is known.
    Line,
    /// The end of the input.
    End,
    /// A token with the given lexeme.
    Lexeme(String),
}

/// A single reported error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    /// 1-based source line.
    pub line: usize,
    pub location: Location,
}

impl Diagnostic {
    /// Create a lexical error pointing at `line`.
    pub fn lexical(line: usize, message: impl ToString) -> Self {
        Self {
            kind: ErrorKind::Lexical,
            message: message.to_string(),
            line,
            location: Location::Line,
        }
    }

    /// Create a syntax error pointing at `location` on `line`.
    pub fn syntax(line: usize, location: Location, message: impl ToString) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            message: message.to_string(),
            line,
            location,
        }
    }

    /// Create a runtime error raised on `line`.
    pub fn runtime(line: usize, message: impl ToString) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            message: message.to_string(),
            line,
            location: Location::Line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == ErrorKind::Runtime {
            return write!(f, "{}\n[line {}]", self.message, self.line);
        }

        let location = match &self.location {
            Location::Line => String::new(),
            Location::End => " at end".to_string(),
            Location::Lexeme(lexeme) => format!(" at '{}'", lexeme),
        };
        write!(
            f,
            "[line {line}] Error{location}: {message}",
            line = self.line,
            location = location,
            message = self.message
        )
    }
}

/// Manages all the errors.
pub struct ErrorReporter {
    errors: RefCell<Vec<Diagnostic>>,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter`.
    pub fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Adds an error to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn add_error(&self, error: Diagnostic) {
        // This should be the only place where self.errors is borrowed mutably.
        self.errors.borrow_mut().push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.borrow().is_empty()
    }

    /// Returns `true` if a lexical or syntax error was reported.
    /// The driver uses this to skip evaluation entirely.
    pub fn had_syntax_error(&self) -> bool {
        self.errors
            .borrow()
            .iter()
            .any(|error| error.kind != ErrorKind::Runtime)
    }

    pub fn had_runtime_error(&self) -> bool {
        self.errors
            .borrow()
            .iter()
            .any(|error| error.kind == ErrorKind::Runtime)
    }

    /// Returns a copy of all the accumulated errors, in reporting order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.borrow().clone()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors.borrow();
        for error in errors.iter() {
            writeln!(f, "{}", error)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_static_errors() {
        assert_eq!(
            Diagnostic::lexical(3, "Unexpected character.").to_string(),
            "[line 3] Error: Unexpected character."
        );
        assert_eq!(
            Diagnostic::syntax(1, Location::End, "Expect expression.").to_string(),
            "[line 1] Error at end: Expect expression."
        );
        assert_eq!(
            Diagnostic::syntax(2, Location::Lexeme("}".to_string()), "Expect ';' after value.")
                .to_string(),
            "[line 2] Error at '}': Expect ';' after value."
        );
    }

    #[test]
    fn test_render_runtime_error() {
        assert_eq!(
            Diagnostic::runtime(7, "Operands must be numbers.").to_string(),
            "Operands must be numbers.\n[line 7]"
        );
    }

    #[test]
    fn test_error_kinds() {
        let source: Source = "".into();
        assert!(source.has_no_errors());

        source.errors.add_error(Diagnostic::runtime(1, "boom"));
        assert!(!source.has_no_errors());
        assert!(source.errors.had_runtime_error());
        assert!(!source.errors.had_syntax_error());

        source.errors.add_error(Diagnostic::lexical(1, "Unexpected character."));
        assert!(source.errors.had_syntax_error());
        assert_eq!(source.errors.diagnostics().len(), 2);
        assert_eq!(
            source.errors.to_string(),
            "boom\n[line 1]\n[line 1] Error: Unexpected character.\n"
        );
    }
}
