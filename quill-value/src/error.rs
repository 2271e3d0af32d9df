//! Errors raised while evaluating.

use quill_parser::lexer::Token;
use quill_source::Diagnostic;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings.")]
    InvalidAddOperands,
    #[error("Invalid operator '{0}'.")]
    InvalidOperator(String),
    #[error("Invalid operand for '{0}', expected a variable.")]
    InvalidStepTarget(String),
    #[error("Can only call functions.")]
    NotCallable,
    #[error("Expected {expected} arguments but got {got}.")]
    ArityMismatch { expected: usize, got: usize },
    /// The output sink of `print` failed.
    #[error("Failed to write output: {0}")]
    Output(String),
}

/// A runtime error along with the token it was raised at.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct RuntimeError {
    pub token: Token,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(token: &Token, kind: RuntimeErrorKind) -> Self {
        Self {
            token: token.clone(),
            kind,
        }
    }

    /// Converts the error into a [`Diagnostic`] pointing at the offending token's line.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::runtime(self.token.line, &self.kind)
    }
}
