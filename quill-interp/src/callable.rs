use crate::interpreter::{Flow, Interpreter};
use quill_value::{Environment, Function, RuntimeError, Value};
use std::io::Write;

/// Anything that can be invoked by a call expression.
pub trait Callable {
    /// Number of arguments the callee accepts.
    fn arity(&self) -> usize;

    /// Invokes the callee. The caller has already checked `args.len()` against [`Callable::arity`].
    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError>;
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    #[tracing::instrument(level = "trace", skip_all, fields(name = self.name()))]
    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        // Parameters live in a scope enclosed by the closure, not by the caller's scope.
        let environment = Environment::new_enclosed(&self.closure);
        for (param, arg) in self.declaration.params.iter().zip(args) {
            environment.define(param.lexeme.clone(), arg);
        }

        match interpreter.execute_block(&self.declaration.body, environment)? {
            Flow::Return(value) => Ok(value),
            _ => Ok(Value::Nil), // implicit return
        }
    }
}
