//! Tree-walking evaluation of quill programs.

pub mod callable;
pub mod interpreter;

pub use callable::Callable;
pub use interpreter::{Flow, Interpreter};
