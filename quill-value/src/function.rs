//! User-defined function values.

use crate::environment::Environment;
use quill_parser::ast::FunctionDecl;
use std::fmt;
use std::rc::Rc;

/// A function declaration paired with the scope active where it was declared (its closure).
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Environment,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Environment) -> Self {
        Self {
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}
