//! Precedence tables for the expression parser.
//!
//! Every token kind that can start an expression maps to a [`PrefixRule`]. Every token kind that can
//! continue one maps to an [`InfixRule`] paired with its binding power.

use crate::lexer::TokenKind;

/// Binding power of infix operators, from loosest to tightest.
/// [`Precedence::None`] is reserved for accepting any expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None = 0,
    Assignment = 1,
    Or = 2,
    And = 3,
    Equality = 4,
    Bitwise = 5,
    Comparison = 6,
    Term = 7,
    Factor = 8,
    Prefix = 9,
    Postfix = 10,
    Call = 11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixRule {
    /// Number, string, `true`, `false` and `nil`.
    Literal,
    Variable,
    /// `(` expr `)`
    Grouping,
    /// `-`, `!`, `~`, `++` and `--`.
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixRule {
    Binary,
    /// Short-circuiting `and` / `or`.
    Logical,
    /// Right associative, only valid on a variable.
    Assign,
    /// `++` and `--` after a variable.
    Postfix,
    /// `(` args `)`
    Call,
}

impl TokenKind {
    /// Returns the rule used when the token starts an expression or `None` if it can not.
    pub fn prefix_rule(self) -> Option<PrefixRule> {
        match self {
            TokenKind::Number
            | TokenKind::String
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Nil => Some(PrefixRule::Literal),
            TokenKind::Identifier => Some(PrefixRule::Variable),
            TokenKind::LeftParen => Some(PrefixRule::Grouping),
            TokenKind::Minus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => Some(PrefixRule::Operator),
            _ => None,
        }
    }

    /// Returns the binding power and rule used when the token continues an expression,
    /// or `None` if it is not an infix operator.
    pub fn infix_rule(self) -> Option<(Precedence, InfixRule)> {
        match self {
            TokenKind::Equal => Some((Precedence::Assignment, InfixRule::Assign)),
            TokenKind::Or | TokenKind::PipePipe => Some((Precedence::Or, InfixRule::Logical)),
            TokenKind::And | TokenKind::AmpersandAmpersand => {
                Some((Precedence::And, InfixRule::Logical))
            }
            TokenKind::EqualEqual | TokenKind::BangEqual => {
                Some((Precedence::Equality, InfixRule::Binary))
            }
            TokenKind::Ampersand
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::LessLess
            | TokenKind::GreaterGreater => Some((Precedence::Bitwise, InfixRule::Binary)),
            TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => Some((Precedence::Comparison, InfixRule::Binary)),
            TokenKind::Plus | TokenKind::Minus => Some((Precedence::Term, InfixRule::Binary)),
            TokenKind::Star | TokenKind::Slash => Some((Precedence::Factor, InfixRule::Binary)),
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                Some((Precedence::Postfix, InfixRule::Postfix))
            }
            TokenKind::LeftParen => Some((Precedence::Call, InfixRule::Call)),
            _ => None,
        }
    }
}
