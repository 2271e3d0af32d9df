//! Top-level `return` rejection pass.

use quill_parser::ast::{FunctionDecl, Stmt};
use quill_parser::visitor::{walk_function, walk_stmt, Visitor};
use quill_source::{Diagnostic, Location, Source};
use tracing::debug;

/// Reports every `return` statement that is not nested inside a function body.
pub struct ReturnCheck<'a> {
    /// Number of function bodies enclosing the statement being visited. `0` is top-level code.
    function_depth: u32,
    source: &'a Source<'a>,
}

impl<'a> ReturnCheck<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        Self {
            function_depth: 0,
            source,
        }
    }

    pub fn check_program(&mut self, program: &[Stmt]) {
        for stmt in program {
            self.visit_stmt(stmt);
        }
        debug!(statements = program.len(), "checked return placement");
    }
}

impl<'a, 'ast> Visitor<'ast> for ReturnCheck<'a> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        if let Stmt::Return { keyword, .. } = stmt {
            if self.function_depth == 0 {
                self.source.errors.add_error(Diagnostic::syntax(
                    keyword.line,
                    Location::Lexeme(keyword.lexeme.clone()),
                    "Can't return from top-level code.",
                ));
            }
        }

        walk_stmt(self, stmt);
    }

    fn visit_function(&mut self, func: &'ast FunctionDecl) {
        self.function_depth += 1;
        walk_function(self, func);
        self.function_depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_parser::parser::Parser;

    fn check(source: &str) -> Vec<String> {
        let source = source.into();
        let ast = Parser::new(&source).parse_program();
        assert!(source.has_no_errors(), "{}", source.errors);

        ReturnCheck::new(&source).check_program(&ast);
        source
            .errors
            .diagnostics()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_return_inside_function() {
        assert!(check("fun f() { return 1; }").is_empty());
        assert!(check("fun f() { if (true) { while (false) return; } }").is_empty());
        assert!(check("fun f() { fun g() { return 2; } return g; }").is_empty());
    }

    #[test]
    fn test_top_level_return() {
        assert_eq!(
            check("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
        assert_eq!(
            check("fun f() {}\n{\n  if (true) return;\n}"),
            vec!["[line 3] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn test_depth_is_restored_after_function() {
        assert_eq!(
            check("fun f() { return; } return;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
    }
}
