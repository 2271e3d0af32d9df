pub mod environment;
pub mod error;
pub mod function;

use quill_parser::lexer::Literal;
use std::fmt;
use std::rc::Rc;

pub use environment::Environment;
pub use error::{RuntimeError, RuntimeErrorKind};
pub use function::Function;

#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Function(Rc<Function>),
}

impl Value {
    /// `nil` and `false` are falsy. Every other value is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn cast_to_number(&self) -> Option<f64> {
        match self {
            Value::Number(val) => Some(*val),
            _ => None,
        }
    }
}

/// Values of different types are never equal. Functions are equal only to themselves.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(l), Value::Bool(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(val) => Value::Number(*val),
            Literal::Str(val) => Value::Str(val.as_str().into()),
            Literal::Bool(val) => Value::Bool(*val),
            Literal::Nil => Value::Nil,
        }
    }
}

impl From<&str> for Value {
    fn from(string: &str) -> Self {
        Value::Str(string.into())
    }
}

impl From<String> for Value {
    fn from(string: String) -> Self {
        Value::Str(string.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Number(val) => write_number(f, *val),
            Value::Str(val) => write!(f, "{}", val),
            Value::Function(func) => write!(f, "<fn {}>", func.name()),
        }
    }
}

/// Writes `val` the way quill prints numbers.
///
/// Magnitudes in `[1e-3, 1e7)` are printed in plain decimal, without a trailing `.0` for integral
/// values. Anything else uses scientific notation with a mantissa that always has a fractional part
/// (`1.0E7`, `1.5E-5`).
fn write_number(f: &mut fmt::Formatter<'_>, val: f64) -> fmt::Result {
    if val.is_nan() {
        return write!(f, "NaN");
    }
    if val.is_infinite() {
        return write!(f, "{}", if val > 0.0 { "Infinity" } else { "-Infinity" });
    }

    let magnitude = val.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return write!(f, "{}", val);
    }

    let scientific = format!("{:e}", val);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    if mantissa.contains('.') {
        write!(f, "{}E{}", mantissa, exponent)
    } else {
        write!(f, "{}.0E{}", mantissa, exponent)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(val) => write!(f, "{:?}", val),
            _ => fmt::Display::fmt(self, f),
        }
    }
}
