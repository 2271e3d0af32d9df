//! Lexing and parsing for quill.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod visitor;
