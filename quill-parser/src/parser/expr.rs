use super::rules::{InfixRule, Precedence, PrefixRule};
use super::*;

/// Maximum number of arguments in a call expression.
const MAX_ARGS: usize = 255;

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_expr_bp`] with `min_prec = Precedence::None`.
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_expr_bp(Precedence::None) // accept any expression
    }

    /// Parses an expression whose infix operators all bind tighter than `min_prec`.
    /// To parse any expression use, [`Self::parse_expr`].
    pub fn parse_expr_bp(&mut self, min_prec: Precedence) -> ParseResult<Expr> {
        let rule = match self.peek().kind.prefix_rule() {
            Some(rule) => rule,
            None => return Err(self.error(self.peek(), "Expect expression.")),
        };
        let token = self.advance();
        let mut lhs = self.parse_prefix(rule, token)?;

        loop {
            let (prec, rule) = match self.peek().kind.infix_rule() {
                Some(infix) => infix,
                None => break, // not a valid infix operator, stop parsing
            };
            if prec <= min_prec {
                break; // binds looser than the enclosing operator, stop parsing
            }

            let op = self.advance();
            lhs = self.parse_infix(rule, prec, lhs, op)?;
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self, rule: PrefixRule, token: Token) -> ParseResult<Expr> {
        match rule {
            PrefixRule::Literal => self.parse_literal_expr(token),
            PrefixRule::Variable => Ok(Expr::Variable(token)),
            PrefixRule::Grouping => {
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen, "Expect ')' after expression.")?;
                Ok(Expr::Grouping(Box::new(inner)))
            }
            PrefixRule::Operator => {
                let operand = self.parse_expr_bp(Precedence::Prefix)?;
                let is_step = matches!(token.kind, TokenKind::PlusPlus | TokenKind::MinusMinus);
                if is_step && !matches!(operand, Expr::Variable(_)) {
                    return Err(self.error(&token, "Invalid operand for prefix operator."));
                }
                Ok(Expr::Prefix {
                    op: token,
                    operand: Box::new(operand),
                })
            }
        }
    }

    fn parse_infix(
        &mut self,
        rule: InfixRule,
        prec: Precedence,
        lhs: Expr,
        op: Token,
    ) -> ParseResult<Expr> {
        match rule {
            InfixRule::Binary => {
                let rhs = self.parse_expr_bp(prec)?;
                Ok(Expr::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                })
            }
            InfixRule::Logical => {
                let rhs = self.parse_expr_bp(prec)?;
                Ok(Expr::Logical {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                })
            }
            InfixRule::Assign => {
                // One level looser than assignment so that `a = b = c` is `a = (b = c)`.
                let value = self.parse_expr_bp(Precedence::None)?;
                match lhs {
                    Expr::Variable(name) => Ok(Expr::Assign {
                        name,
                        value: Box::new(value),
                    }),
                    _ => Err(self.error(&op, "Invalid assignment target.")),
                }
            }
            InfixRule::Postfix => match lhs {
                Expr::Variable(target) => Ok(Expr::Postfix { op, target }),
                _ => Err(self.error(&op, "Invalid operand for postfix operator.")),
            },
            InfixRule::Call => self.parse_call_expr(lhs),
        }
    }

    /* Expressions.Literals */
    /// Parses a literal expression.
    /// A literal can be a number, a string, a bool or `nil`.
    fn parse_literal_expr(&mut self, token: Token) -> ParseResult<Expr> {
        let literal = match token.kind {
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Nil => Literal::Nil,
            _ => match token.literal {
                Some(ref literal) => literal.clone(),
                None => return Err(self.error(&token, "Expect expression.")),
            },
        };
        Ok(Expr::Literal(literal))
    }

    /* Expressions.Call */
    /// Parses the argument list of a call. The opening `(` has already been eaten.
    fn parse_call_expr(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut args = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARGS {
                    // reported but not fatal, keep parsing
                    self.error(self.peek(), "Can't have more than 255 arguments.");
                }
                args.push(self.parse_expr()?);

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let paren = self.expect(TokenKind::RightParen, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn expr(source: &str) -> String {
        let source = source.into();
        let ast = Parser::new(&source).parse_expr();
        assert!(source.has_no_errors(), "{}", source.errors);
        match ast {
            Ok(ast) => sexpr::expr(&ast),
            Err(err) => panic!("{}", err),
        }
    }

    fn expr_errors(source: &str) -> Vec<String> {
        let source = source.into();
        let ast = Parser::new(&source).parse_expr();
        assert!(ast.is_err());
        source
            .errors
            .diagnostics()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_literal() {
        assert_snapshot!(expr("true"), @"true");
        assert_snapshot!(expr("false"), @"false");
        assert_snapshot!(expr("nil"), @"nil");
        assert_snapshot!(expr("1"), @"1");
        assert_snapshot!(expr("2.5"), @"2.5");
        assert_snapshot!(expr(r#""hello""#), @r#""hello""#);
    }

    #[test]
    fn test_binary_expr() {
        assert_snapshot!(expr("1 + 1"), @"(+ 1 1)");
        assert_snapshot!(expr("1 + 2 * 3"), @"(+ 1 (* 2 3))");
        assert_snapshot!(expr("1 == 2 - 1"), @"(== 1 (- 2 1))");
        assert_snapshot!(expr("2 * 2 * 2"), @"(* (* 2 2) 2)"); // should be (2 * 2) * 2
        assert_snapshot!(expr("a - b - c"), @"(- (- a b) c)");
        assert_snapshot!(expr("(1 + 2) * 3"), @"(* (group (+ 1 2)) 3)");
        assert_snapshot!(expr("a < b == c >= d"), @"(== (< a b) (>= c d))");
    }

    #[test]
    fn test_bitwise_expr() {
        assert_snapshot!(expr("a & b < c"), @"(& a (< b c))");
        assert_snapshot!(expr("a | b == c"), @"(== (| a b) c)");
        assert_snapshot!(expr("1 << 2 >> 3 ^ 4"), @"(^ (>> (<< 1 2) 3) 4)");
        assert_snapshot!(expr("~a + 1"), @"(+ (~ a) 1)");
    }

    #[test]
    fn test_logical_expr() {
        assert_snapshot!(expr("a or b and c"), @"(or a (and b c))");
        assert_snapshot!(expr("a and b or c"), @"(or (and a b) c)");
        assert_snapshot!(expr("a && b || c"), @"(|| (&& a b) c)");
        assert_snapshot!(expr("a == b and c"), @"(and (== a b) c)");
    }

    #[test]
    fn test_assignment() {
        assert_snapshot!(expr("a = 1"), @"(= a 1)");
        assert_snapshot!(expr("a = b = c"), @"(= a (= b c))"); // should be a = (b = c)
        assert_snapshot!(expr("a = b or c"), @"(= a (or b c))");
    }

    #[test]
    fn test_prefix_and_postfix() {
        assert_snapshot!(expr("-a * b"), @"(* (- a) b)");
        assert_snapshot!(expr("!!ok"), @"(! (! ok))");
        assert_snapshot!(expr("- -1"), @"(- (- 1))");
        assert_snapshot!(expr("++x"), @"(++ x)");
        assert_snapshot!(expr("x++ + ++y"), @"(+ (x ++) (++ y))");
        assert_snapshot!(expr("-x--"), @"(- (x --))");
    }

    #[test]
    fn test_fn_call() {
        assert_snapshot!(expr("foo()"), @"(call foo)");
        assert_snapshot!(expr("foo(1, bar)"), @"(call foo 1 bar)");
        assert_snapshot!(expr("foo(1, bar, baz())"), @"(call foo 1 bar (call baz))");
        assert_snapshot!(expr("make()(2)"), @"(call (call make) 2)");
        assert_snapshot!(expr("-f(x) * 2"), @"(* (- (call f x)) 2)");
    }

    #[test]
    fn test_invalid_targets() {
        assert_eq!(
            expr_errors("a + b = c"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
        assert_eq!(
            expr_errors("1++"),
            vec!["[line 1] Error at '++': Invalid operand for postfix operator."]
        );
        assert_eq!(
            expr_errors("++(a)"),
            vec!["[line 1] Error at '++': Invalid operand for prefix operator."]
        );
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            expr_errors("1 +"),
            vec!["[line 1] Error at end: Expect expression."]
        );
        assert_eq!(
            expr_errors("(1 + 2"),
            vec!["[line 1] Error at end: Expect ')' after expression."]
        );
        assert_eq!(
            expr_errors("f(1, 2"),
            vec!["[line 1] Error at end: Expect ')' after arguments."]
        );
    }

    #[test]
    fn test_too_many_args() {
        let args: Vec<_> = (0..256).map(|i| i.to_string()).collect();
        let text = format!("f({})", args.join(", "));
        let source = text.as_str().into();
        let ast = Parser::new(&source).parse_expr();

        assert!(matches!(ast, Ok(Expr::Call { ref args, .. }) if args.len() == 256));
        assert_eq!(
            source
                .errors
                .diagnostics()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["[line 1] Error at '255': Can't have more than 255 arguments."]
        );
    }
}
