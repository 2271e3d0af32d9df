use quill_parser::ast::Stmt;
use quill_source::ErrorReporter;
use quill_value::{Environment, Function, RuntimeError, RuntimeErrorKind, Value};
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;
use tracing::{debug, trace};

mod expr;

/// How a statement completed.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Ran to completion without producing a value.
    Normal,
    /// An expression statement produced a value.
    Value(Value),
    /// A `return` statement is unwinding to the nearest function call.
    Return(Value),
}

impl Flow {
    /// Keeps only a [`Flow::Return`]. Used by statements that contain other statements.
    fn propagate(self) -> Flow {
        match self {
            Flow::Return(value) => Flow::Return(value),
            _ => Flow::Normal,
        }
    }
}

pub struct Interpreter<W: Write = io::Stdout> {
    /// The outermost scope. Lives as long as the interpreter.
    globals: Environment,
    /// The scope statements are currently executed in.
    environment: Environment,
    /// Sink for `print` and interactive echoes.
    out: W,
}

impl Interpreter<io::Stdout> {
    /// Creates an interpreter that prints to stdout.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        let globals = Environment::new();
        Self {
            environment: globals.clone(),
            globals,
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Executes `statements` in order against the global scope.
    ///
    /// Nothing runs if `errors` already holds a lexical or syntax error. A runtime error is reported to
    /// `errors` and aborts the remaining statements. The interpreter stays usable afterwards. A `return`
    /// reaching the top level ends the run as well. In `interactive` mode, the value of a trailing
    /// expression statement is echoed unless it is `nil`. Only a failure to write the echo is returned
    /// as an `Err`.
    pub fn interpret(
        &mut self,
        statements: &[Stmt],
        interactive: bool,
        errors: &ErrorReporter,
    ) -> io::Result<()> {
        if errors.had_syntax_error() {
            debug!("refusing to run a program with static errors");
            return Ok(());
        }

        self.environment = self.globals.clone();
        let mut last = Flow::Normal;
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Return(_)) => {
                    debug!("return at top level, stopping");
                    return Ok(());
                }
                Ok(flow) => last = flow,
                Err(err) => {
                    debug!(line = err.token.line, "runtime error: {}", err);
                    errors.add_error(err.to_diagnostic());
                    return Ok(());
                }
            }
        }

        match last {
            Flow::Value(value) if interactive && !value.is_nil() => writeln!(self.out, "{}", value),
            _ => Ok(()),
        }
    }

    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => Ok(Flow::Value(self.evaluate(expr)?)),
            Stmt::Print { keyword, value } => {
                let value = self.evaluate(value)?;
                writeln!(self.out, "{}", value).map_err(|err| {
                    RuntimeError::new(keyword, RuntimeErrorKind::Output(err.to_string()))
                })?;
                Ok(Flow::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::Block(body) => {
                let environment = Environment::new_enclosed(&self.environment);
                self.execute_block(body, environment)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    Ok(self.execute(then_branch)?.propagate())
                } else if let Some(else_branch) = else_branch {
                    Ok(self.execute(else_branch)?.propagate())
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Function(declaration) => {
                let function = Function::new(Rc::clone(declaration), self.environment.clone());
                self.environment.define(
                    declaration.name.lexeme.clone(),
                    Value::Function(Rc::new(function)),
                );
                Ok(Flow::Normal)
            }
            Stmt::Return { keyword: _, value } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            // `interpret` never runs a program with syntax errors.
            Stmt::Error => Ok(Flow::Normal),
        }
    }

    /// Executes `statements` inside `environment`, then restores the current scope on every exit path.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Environment,
    ) -> Result<Flow, RuntimeError> {
        trace!(statements = statements.len(), "entering scope");
        let previous = mem::replace(&mut self.environment, environment);
        let result = self.execute_all(statements);
        self.environment = previous;
        result
    }

    fn execute_all(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }
}
