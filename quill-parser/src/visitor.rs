//! Visitor pattern for AST nodes.

use crate::ast::{Expr, FunctionDecl, Stmt};

pub trait Visitor<'ast>: Sized {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }
    fn visit_function(&mut self, func: &'ast FunctionDecl) {
        walk_function(self, func);
    }
}

pub fn walk_expr<'ast>(visitor: &mut impl Visitor<'ast>, expr: &'ast Expr) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Variable(_) => {}
        Expr::Assign { name: _, value } => visitor.visit_expr(value),
        Expr::Grouping(inner) => visitor.visit_expr(inner),
        Expr::Prefix { op: _, operand } => visitor.visit_expr(operand),
        Expr::Postfix { .. } => {}
        Expr::Binary { lhs, op: _, rhs } | Expr::Logical { lhs, op: _, rhs } => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(rhs);
        }
        Expr::Call {
            callee,
            paren: _,
            args,
        } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
    }
}

/// Iteratively visit all statements in a `Vec<Stmt>`.
macro_rules! visit_stmt_list {
    ($visitor: expr, $body: expr) => {
        for stmt in $body {
            Visitor::visit_stmt($visitor, stmt);
        }
    };
}

pub fn walk_stmt<'ast>(visitor: &mut impl Visitor<'ast>, stmt: &'ast Stmt) {
    match stmt {
        Stmt::Expression(expr) => visitor.visit_expr(expr),
        Stmt::Print { keyword: _, value } => visitor.visit_expr(value),
        Stmt::Var {
            name: _,
            initializer,
        } => {
            if let Some(initializer) = initializer {
                visitor.visit_expr(initializer);
            }
        }
        Stmt::Block(body) => visit_stmt_list!(visitor, body),
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr(condition);
            visitor.visit_stmt(then_branch);
            if let Some(else_branch) = else_branch {
                visitor.visit_stmt(else_branch);
            }
        }
        Stmt::While { condition, body } => {
            visitor.visit_expr(condition);
            visitor.visit_stmt(body);
        }
        Stmt::Function(func) => visitor.visit_function(func),
        Stmt::Return { keyword: _, value } => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        Stmt::Error => {}
    }
}

pub fn walk_function<'ast>(visitor: &mut impl Visitor<'ast>, func: &'ast FunctionDecl) {
    visit_stmt_list!(visitor, &func.body);
}
