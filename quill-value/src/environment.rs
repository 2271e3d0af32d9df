//! Lexical scope chain.

use crate::error::{RuntimeError, RuntimeErrorKind};
use crate::Value;
use quill_parser::lexer::Token;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Default)]
struct Scope {
    values: HashMap<String, Value>,
    /// Back-reference to the parent scope. `None` for the global scope.
    enclosing: Option<Environment>,
}

/// A handle to a single scope in the chain.
/// Cloning the handle shares the scope; it does not copy the bindings.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// Creates a new global scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new scope nested inside `enclosing`.
    pub fn new_enclosed(enclosing: &Environment) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            values: HashMap::new(),
            enclosing: Some(enclosing.clone()),
        })))
    }

    pub fn enclosing(&self) -> Option<Environment> {
        self.0.borrow().enclosing.clone()
    }

    /// Returns `true` if both handles point to the same scope.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Binds `name` in this scope only, shadowing any outer binding and overwriting an existing one.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().values.insert(name.into(), value);
    }

    /// Looks `name` up in this scope, then outward through the enclosing scopes.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        let mut scope = self.clone();
        loop {
            let enclosing = {
                let inner = scope.0.borrow();
                if let Some(value) = inner.values.get(&name.lexeme) {
                    return Ok(value.clone());
                }
                inner.enclosing.clone()
            };
            match enclosing {
                Some(enclosing) => scope = enclosing,
                None => return Err(undefined(name)),
            }
        }
    }

    /// Updates the nearest existing binding of `name` and returns the assigned value.
    pub fn assign(&self, name: &Token, value: Value) -> Result<Value, RuntimeError> {
        let mut scope = self.clone();
        loop {
            let enclosing = {
                let mut inner = scope.0.borrow_mut();
                if let Some(slot) = inner.values.get_mut(&name.lexeme) {
                    *slot = value.clone();
                    return Ok(value);
                }
                inner.enclosing.clone()
            };
            match enclosing {
                Some(enclosing) => scope = enclosing,
                None => return Err(undefined(name)),
            }
        }
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::new(
        name,
        RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()),
    )
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bindings are left out: a closure stored in its own defining scope would recurse forever.
        let mut depth = 0;
        let mut scope = self.enclosing();
        while let Some(enclosing) = scope {
            depth += 1;
            scope = enclosing.enclosing();
        }
        f.debug_struct("Environment")
            .field("bindings", &self.0.borrow().values.len())
            .field("depth", &depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_parser::lexer::TokenKind;

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, None, 1)
    }

    #[test]
    fn test_define_and_get() {
        let globals = Environment::new();
        globals.define("a", Value::Number(1.0));
        assert_eq!(globals.get(&ident("a")), Ok(Value::Number(1.0)));

        globals.define("a", Value::Bool(true)); // redefinition overwrites
        assert_eq!(globals.get(&ident("a")), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_lookup_walks_outward() {
        let globals = Environment::new();
        globals.define("a", Value::from("global"));
        let inner = Environment::new_enclosed(&Environment::new_enclosed(&globals));

        assert_eq!(inner.get(&ident("a")), Ok(Value::from("global")));
        assert_eq!(inner.assign(&ident("a"), Value::Nil), Ok(Value::Nil));
        assert_eq!(globals.get(&ident("a")), Ok(Value::Nil));
    }

    #[test]
    fn test_shadowing() {
        let globals = Environment::new();
        globals.define("a", Value::from("outer"));
        let inner = Environment::new_enclosed(&globals);
        inner.define("a", Value::from("inner"));

        assert_eq!(inner.get(&ident("a")), Ok(Value::from("inner")));
        assert_eq!(globals.get(&ident("a")), Ok(Value::from("outer")));

        inner.assign(&ident("a"), Value::Number(2.0)).unwrap();
        assert_eq!(globals.get(&ident("a")), Ok(Value::from("outer")));
    }

    #[test]
    fn test_undefined_variable() {
        let globals = Environment::new();
        let inner = Environment::new_enclosed(&globals);
        let name = Token::new(TokenKind::Identifier, "missing", None, 4);

        let err = inner.get(&name).unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::UndefinedVariable("missing".to_string()));
        assert_eq!(err.token.line, 4);
        assert_eq!(err.to_string(), "Undefined variable 'missing'.");

        let err = inner.assign(&name, Value::Nil).unwrap_err();
        assert_eq!(err.to_diagnostic().to_string(), "Undefined variable 'missing'.\n[line 4]");
        // a failed assignment never creates a binding
        assert!(globals.get(&name).is_err());
    }

    #[test]
    fn test_enclosing() {
        let globals = Environment::new();
        let inner = Environment::new_enclosed(&globals);
        assert!(globals.enclosing().is_none());
        assert!(inner.enclosing().map_or(false, |env| env.ptr_eq(&globals)));
        assert!(!inner.ptr_eq(&globals));
    }
}
