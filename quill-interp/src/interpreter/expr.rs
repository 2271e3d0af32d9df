use super::Interpreter;
use crate::Callable;
use quill_parser::ast::Expr;
use quill_parser::lexer::{Token, TokenKind};
use quill_value::{RuntimeError, RuntimeErrorKind, Value};
use std::io::Write;

impl<W: Write> Interpreter<W> {
    /// Evaluates an expression in the current scope.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal)),
            Expr::Variable(name) => self.environment.get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value)
            }
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Prefix { op, operand } => self.eval_prefix(op, operand),
            Expr::Postfix { op, target } => self.step(op, target, false),
            Expr::Binary { lhs, op, rhs } => {
                let lhs = self.evaluate(lhs)?;
                let rhs = self.evaluate(rhs)?;
                binary(op, lhs, rhs)
            }
            Expr::Logical { lhs, op, rhs } => {
                let lhs = self.evaluate(lhs)?;
                let short_circuit = match op.kind {
                    TokenKind::Or | TokenKind::PipePipe => lhs.is_truthy(),
                    _ => !lhs.is_truthy(),
                };
                if short_circuit {
                    Ok(lhs)
                } else {
                    self.evaluate(rhs)
                }
            }
            Expr::Call {
                callee,
                paren,
                args,
            } => {
                let callee = self.evaluate(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>, _>>()?;

                let function = match callee {
                    Value::Function(function) => function,
                    _ => return Err(RuntimeError::new(paren, RuntimeErrorKind::NotCallable)),
                };
                if args.len() != function.arity() {
                    return Err(RuntimeError::new(
                        paren,
                        RuntimeErrorKind::ArityMismatch {
                            expected: function.arity(),
                            got: args.len(),
                        },
                    ));
                }
                function.call(self, args)
            }
        }
    }

    fn eval_prefix(&mut self, op: &Token, operand: &Expr) -> Result<Value, RuntimeError> {
        match op.kind {
            TokenKind::PlusPlus | TokenKind::MinusMinus => match operand {
                Expr::Variable(name) => self.step(op, name, true),
                _ => Err(RuntimeError::new(
                    op,
                    RuntimeErrorKind::InvalidStepTarget(op.lexeme.clone()),
                )),
            },
            TokenKind::Bang => Ok(Value::Bool(!self.evaluate(operand)?.is_truthy())),
            TokenKind::Minus => {
                let value = number_operand(op, &self.evaluate(operand)?)?;
                Ok(Value::Number(-value))
            }
            TokenKind::Tilde => {
                let value = number_operand(op, &self.evaluate(operand)?)?;
                Ok(Value::Number(f64::from(!(value as i32))))
            }
            _ => Err(invalid_operator(op)),
        }
    }

    /// Adds or subtracts one from the variable `name`.
    /// Returns the updated value when `prefix` is set, the previous one otherwise.
    fn step(&mut self, op: &Token, name: &Token, prefix: bool) -> Result<Value, RuntimeError> {
        let delta = match op.kind {
            TokenKind::PlusPlus => 1.0,
            TokenKind::MinusMinus => -1.0,
            _ => return Err(invalid_operator(op)),
        };
        let old = number_operand(op, &self.environment.get(name)?)?;
        let new = old + delta;
        self.environment.assign(name, Value::Number(new))?;

        Ok(Value::Number(if prefix { new } else { old }))
    }
}

/// Raised for operator tokens the parser never produces in that position.
fn invalid_operator(op: &Token) -> RuntimeError {
    RuntimeError::new(op, RuntimeErrorKind::InvalidOperator(op.lexeme.clone()))
}

fn number_operand(op: &Token, value: &Value) -> Result<f64, RuntimeError> {
    value
        .cast_to_number()
        .ok_or_else(|| RuntimeError::new(op, RuntimeErrorKind::OperandMustBeNumber))
}

/// Bitwise operators work on the operands truncated to 32-bit integers.
fn int_operands(op: &Token, lhs: &Value, rhs: &Value) -> Result<(i32, i32), RuntimeError> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => Ok((*l as i32, *r as i32)),
        _ => Err(RuntimeError::new(op, RuntimeErrorKind::OperandsMustBeNumbers)),
    }
}

fn binary(op: &Token, lhs: Value, rhs: Value) -> Result<Value, RuntimeError> {
    match op.kind {
        TokenKind::Plus => match (&lhs, &rhs) {
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            (Value::Str(l), Value::Str(r)) => Ok(Value::from(format!("{}{}", l, r))),
            _ => Err(RuntimeError::new(op, RuntimeErrorKind::InvalidAddOperands)),
        },
        TokenKind::EqualEqual => Ok(Value::Bool(lhs == rhs)),
        TokenKind::BangEqual => Ok(Value::Bool(lhs != rhs)),
        TokenKind::Ampersand => int_operands(op, &lhs, &rhs).map(|(l, r)| int(l & r)),
        TokenKind::Pipe => int_operands(op, &lhs, &rhs).map(|(l, r)| int(l | r)),
        TokenKind::Caret => int_operands(op, &lhs, &rhs).map(|(l, r)| int(l ^ r)),
        TokenKind::LessLess => {
            int_operands(op, &lhs, &rhs).map(|(l, r)| int(l.wrapping_shl(r as u32)))
        }
        TokenKind::GreaterGreater => {
            int_operands(op, &lhs, &rhs).map(|(l, r)| int(l.wrapping_shr(r as u32)))
        }
        _ => {
            let (l, r) = match (&lhs, &rhs) {
                (Value::Number(l), Value::Number(r)) => (*l, *r),
                _ => return Err(RuntimeError::new(op, RuntimeErrorKind::OperandsMustBeNumbers)),
            };
            match op.kind {
                TokenKind::Minus => Ok(Value::Number(l - r)),
                TokenKind::Star => Ok(Value::Number(l * r)),
                TokenKind::Slash => Ok(Value::Number(l / r)),
                TokenKind::Greater => Ok(Value::Bool(l > r)),
                TokenKind::GreaterEqual => Ok(Value::Bool(l >= r)),
                TokenKind::Less => Ok(Value::Bool(l < r)),
                TokenKind::LessEqual => Ok(Value::Bool(l <= r)),
                _ => Err(invalid_operator(op)),
            }
        }
    }
}

fn int(value: i32) -> Value {
    Value::Number(f64::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_parser::lexer::Literal;
    use quill_parser::parser::Parser;
    use quill_source::Source;

    /// Runs `program` then evaluates `expr` in the resulting global scope.
    fn eval_after(program: &str, expr: &str) -> Result<Value, RuntimeError> {
        let mut interpreter = Interpreter::with_output(Vec::new());

        let source: Source = program.into();
        let statements = Parser::new(&source).parse_program();
        assert!(source.has_no_errors(), "{}", source.errors);
        interpreter
            .interpret(&statements, false, &source.errors)
            .unwrap();
        assert!(source.has_no_errors(), "{}", source.errors);

        let source: Source = expr.into();
        let expr = Parser::new(&source).parse_expr().unwrap();
        assert!(source.has_no_errors(), "{}", source.errors);
        interpreter.evaluate(&expr)
    }

    fn eval(expr: &str) -> Result<Value, RuntimeError> {
        eval_after("", expr)
    }

    fn eval_err(expr: &str) -> RuntimeErrorKind {
        eval(expr).unwrap_err().kind
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Ok(Value::Number(7.0)));
        assert_eq!(eval("(1 + 2) * 3"), Ok(Value::Number(9.0)));
        assert_eq!(eval("10 - 4 - 3"), Ok(Value::Number(3.0)));
        assert_eq!(eval("0.1 + 0.2"), Ok(Value::Number(0.1 + 0.2)));
        assert_eq!(eval("1 / 0"), Ok(Value::Number(f64::INFINITY)));
        assert_eq!(eval("-(3)"), Ok(Value::Number(-3.0)));
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(eval(r#""a" + "b" + "c""#), Ok(Value::from("abc")));
        assert_eq!(eval(r#""" + """#), Ok(Value::from("")));
    }

    #[test]
    fn test_comparison_and_equality() {
        assert_eq!(eval("1 < 2"), Ok(Value::Bool(true)));
        assert_eq!(eval("2 <= 2"), Ok(Value::Bool(true)));
        assert_eq!(eval("1 > 2"), Ok(Value::Bool(false)));
        assert_eq!(eval("1 == 1"), Ok(Value::Bool(true)));
        assert_eq!(eval(r#"1 == "1""#), Ok(Value::Bool(false)));
        assert_eq!(eval("nil == false"), Ok(Value::Bool(false)));
        assert_eq!(eval("nil == nil"), Ok(Value::Bool(true)));
        assert_eq!(eval(r#""a" != "b""#), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(eval("!nil"), Ok(Value::Bool(true)));
        assert_eq!(eval("!false"), Ok(Value::Bool(true)));
        assert_eq!(eval("!0"), Ok(Value::Bool(false)));
        assert_eq!(eval(r#"!"""#), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_logical_returns_operand() {
        assert_eq!(eval(r#"nil or "default""#), Ok(Value::from("default")));
        assert_eq!(eval("1 or 2"), Ok(Value::Number(1.0)));
        assert_eq!(eval("nil and 2"), Ok(Value::Nil));
        assert_eq!(eval("1 && 2"), Ok(Value::Number(2.0)));
        assert_eq!(eval("false || 3"), Ok(Value::Number(3.0)));
    }

    #[test]
    fn test_short_circuit() {
        assert_eq!(eval_after("var x = 0;", "true or (x = 1)"), Ok(Value::Bool(true)));
        assert_eq!(eval_after("var x = 0; true or (x = 1);", "x"), Ok(Value::Number(0.0)));
        assert_eq!(eval_after("var x = 0; false and (x = 1);", "x"), Ok(Value::Number(0.0)));
        assert_eq!(eval_after("var x = 0; false or (x = 1);", "x"), Ok(Value::Number(1.0)));
    }

    #[test]
    fn test_increment_decrement() {
        assert_eq!(eval_after("var x = 5;", "++x"), Ok(Value::Number(6.0)));
        assert_eq!(eval_after("var x = 5;", "x++"), Ok(Value::Number(5.0)));
        assert_eq!(eval_after("var x = 5; var y = x++;", "x + y"), Ok(Value::Number(11.0)));
        assert_eq!(eval_after("var x = 5; --x;", "x--"), Ok(Value::Number(4.0)));
        assert_eq!(eval_after("var x = 5; x--; x--;", "x"), Ok(Value::Number(3.0)));
        assert_eq!(
            eval_after(r#"var s = "a";"#, "s++").unwrap_err().kind,
            RuntimeErrorKind::OperandMustBeNumber
        );
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(eval("5 & 3"), Ok(Value::Number(1.0)));
        assert_eq!(eval("5 | 3"), Ok(Value::Number(7.0)));
        assert_eq!(eval("5 ^ 3"), Ok(Value::Number(6.0)));
        assert_eq!(eval("1 << 4"), Ok(Value::Number(16.0)));
        assert_eq!(eval("-16 >> 2"), Ok(Value::Number(-4.0)));
        assert_eq!(eval("~5"), Ok(Value::Number(-6.0)));
        assert_eq!(eval("7.9 & 3"), Ok(Value::Number(3.0))); // operands are truncated
    }

    #[test]
    fn test_assignment_value() {
        assert_eq!(eval_after("var a; var b;", "a = b = 2"), Ok(Value::Number(2.0)));
        assert_eq!(eval_after("var a; var b; a = b = 2;", "a + b"), Ok(Value::Number(4.0)));
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(eval_err(r#"-"a""#), RuntimeErrorKind::OperandMustBeNumber);
        assert_eq!(eval_err("~nil"), RuntimeErrorKind::OperandMustBeNumber);
        assert_eq!(eval_err(r#"1 + "a""#), RuntimeErrorKind::InvalidAddOperands);
        assert_eq!(eval_err(r#"1 < "a""#), RuntimeErrorKind::OperandsMustBeNumbers);
        assert_eq!(eval_err("true * 2"), RuntimeErrorKind::OperandsMustBeNumbers);
        assert_eq!(eval_err("nil & 1"), RuntimeErrorKind::OperandsMustBeNumbers);
        assert_eq!(eval_err("missing"), RuntimeErrorKind::UndefinedVariable("missing".to_string()));
    }

    #[test]
    fn test_calls() {
        assert_eq!(
            eval_after("fun add(a, b) { return a + b; }", "add(1, 2)"),
            Ok(Value::Number(3.0))
        );
        assert_eq!(eval_after("fun noop() {}", "noop()"), Ok(Value::Nil));
        assert_eq!(eval_err(r#""text"()"#), RuntimeErrorKind::NotCallable);
        assert_eq!(
            eval_after("fun add(a, b) { return a + b; }", "add(1)")
                .unwrap_err()
                .kind,
            RuntimeErrorKind::ArityMismatch {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_hand_built_operators_are_errors() {
        let mut interpreter = Interpreter::with_output(Vec::new());
        let op = |kind, lexeme| Token::new(kind, lexeme, None, 3);
        let one = || Box::new(Expr::Literal(Literal::Number(1.0)));

        let err = interpreter
            .evaluate(&Expr::Prefix {
                op: op(TokenKind::Plus, "+"),
                operand: one(),
            })
            .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::InvalidOperator("+".to_string()));
        assert_eq!(err.to_diagnostic().to_string(), "Invalid operator '+'.\n[line 3]");

        let err = interpreter
            .evaluate(&Expr::Prefix {
                op: op(TokenKind::PlusPlus, "++"),
                operand: one(),
            })
            .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::InvalidStepTarget("++".to_string()));

        let err = interpreter
            .evaluate(&Expr::Binary {
                lhs: one(),
                op: op(TokenKind::Comma, ","),
                rhs: one(),
            })
            .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::InvalidOperator(",".to_string()));

        interpreter.globals.define("x", Value::Number(1.0));
        let err = interpreter
            .evaluate(&Expr::Postfix {
                op: op(TokenKind::Plus, "+"),
                target: op(TokenKind::Identifier, "x"),
            })
            .unwrap_err();
        assert_eq!(err.kind, RuntimeErrorKind::InvalidOperator("+".to_string()));
    }

    #[test]
    fn test_function_equality() {
        assert_eq!(eval_after("fun f() {} var g = f;", "f == g"), Ok(Value::Bool(true)));
        assert_eq!(
            eval_after("fun make() { fun inner() {} return inner; }", "make() == make()"),
            Ok(Value::Bool(false))
        );
    }
}
