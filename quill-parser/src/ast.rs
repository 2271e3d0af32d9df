use crate::lexer::{Literal, Token};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// A variable reference (e.g. `foo`).
    Variable(Token),
    /// An assignment to a variable (e.g. `foo = 1`). Right associative.
    Assign { name: Token, value: Box<Expr> },
    /// A parenthesized expression (e.g. `(1 + 2)`).
    Grouping(Box<Expr>),
    /// A prefix expression (e.g. `-1`, `!ok`, `~mask` or `++i`).
    Prefix { op: Token, operand: Box<Expr> },
    /// A postfix increment or decrement of a variable (e.g. `i++`).
    Postfix { op: Token, target: Token },
    /// A binary expression (e.g. `1+1`).
    Binary {
        lhs: Box<Expr>,
        op: Token,
        rhs: Box<Expr>,
    },
    /// A short-circuiting `and` / `or` expression.
    Logical {
        lhs: Box<Expr>,
        op: Token,
        rhs: Box<Expr>,
    },
    /// A call expression (e.g. `foo(1, bar)`).
    Call {
        callee: Box<Expr>,
        /// The closing parenthesis. Used for error reporting.
        paren: Token,
        args: Vec<Expr>,
    },
}

/// A `fun` declaration. Shared between the AST and the function values created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    Print {
        keyword: Token,
        value: Expr,
    },
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Function(Rc<FunctionDecl>),
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    /// Placeholder for a statement that failed to parse.
    Error,
}
