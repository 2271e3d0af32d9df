use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::lexer::{scan, Literal, Token, TokenKind};
use quill_source::{Diagnostic, Location, Source};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

mod expr;
pub mod rules;
mod stmt;

/// Unwinds the parser up to the enclosing declaration.
/// The error has already been reported to the [`Source`] when this is created.
#[derive(Debug, Clone, Error)]
#[error("[line {line}] {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    /// Index of the next token to consume.
    current: usize,
    /// If `true`, a missing `;` at the very end of the input is accepted.
    interactive: bool,
    /// Source code
    source: &'a Source<'a>,
}

impl<'a> Parser<'a> {
    /// Scans `source` and creates a parser over the resulting tokens.
    pub fn new(source: &'a Source<'a>) -> Self {
        let tokens = scan(source);
        Self::with_tokens(source, tokens)
    }

    pub fn with_tokens(source: &'a Source<'a>, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Token::new(TokenKind::Eof, "", None, line));
        }
        Self {
            tokens,
            current: 0,
            interactive: false,
            source,
        }
    }

    /// Sets whether the parser accepts a trailing statement without `;` (REPL input).
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }
}

impl<'a> Parser<'a> {
    /// Parses declarations until the end of the input.
    /// Statements that failed to parse are returned as [`Stmt::Error`].
    pub fn parse_program(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_declaration());
        }

        debug!(count = statements.len(), "parsed statements");
        statements
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consumes the current token and returns it. Never moves past [`TokenKind::Eof`].
    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    /// Predicate that tests whether the next token is of `kind` and eats the next token if yes as a side effect.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance(); // eat token
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        if self.interactive && kind == TokenKind::Semicolon && self.is_at_end() {
            return Ok(Token::new(TokenKind::Semicolon, ";", None, self.peek().line));
        }
        Err(self.error(self.peek(), message))
    }

    /// Reports a syntax error at `token`.
    fn error(&self, token: &Token, message: &str) -> ParseError {
        let location = match token.kind {
            TokenKind::Eof => Location::End,
            _ => Location::Lexeme(token.lexeme.clone()),
        };
        self.source
            .errors
            .add_error(Diagnostic::syntax(token.line, location, message));
        ParseError {
            message: message.to_string(),
            line: token.line,
        }
    }

    /// Discards tokens until one that plausibly starts a new statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                break;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => break,
                _ => {
                    self.advance();
                }
            }
        }
        debug!(line = self.peek().line, "synchronized after syntax error");
    }
}
