use logos::Logos;
use quill_source::{Diagnostic, Source};
use std::fmt;
use tracing::debug;

#[derive(Debug, Logos, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // punctuation
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,

    // operators
    // - arithmetics
    #[token("+")]
    Plus,
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    // - bitwise
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    LessLess,
    #[token(">>")]
    GreaterGreater,
    // - logical
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpersandAmpersand,
    #[token("||")]
    PipePipe,
    // - assignment
    #[token("=")]
    Equal,
    // - equality
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    // - ordering
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,

    // literals
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
    #[regex(r#""[^"]*""#)]
    String,
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    // keywords
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("class")]
    Class,
    #[token("continue")]
    Continue,
    #[token("else")]
    Else,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("fun")]
    Fun,
    #[token("if")]
    If,
    #[token("nil")]
    Nil,
    #[token("or")]
    Or,
    #[token("print")]
    Print,
    #[token("return")]
    Return,
    #[token("super")]
    Super,
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("var")]
    Var,
    #[token("while")]
    While,

    // misc
    /// A string literal missing its closing quote. Reported and dropped by [`scan`].
    #[regex(r#""[^"]*"#)]
    UnterminatedString,
    #[regex(r"[ \t\n\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)] // single line comments
    #[error]
    Error,

    /// Only generated by [`scan`] after the last token.
    Eof,
}

/// The value carried by a literal token or a literal expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(val) => write!(f, "{}", val),
            Literal::Str(val) => write!(f, "{}", val),
            Literal::Bool(val) => write!(f, "{}", val),
            Literal::Nil => write!(f, "nil"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub lexeme: String,
    /// Only set for number and string literals.
    pub literal: Option<Literal>,
    /// 1-based line the token ends on.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl ToString, literal: Option<Literal>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.to_string(),
            literal,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}", self.kind, self.lexeme)?;
        if let Some(literal) = &self.literal {
            write!(f, " {}", literal)?;
        }
        Ok(())
    }
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&byte| byte == b'\n').count()
}

/// Scans `source` into tokens, always terminated by a single [`TokenKind::Eof`].
/// Lexical errors are reported to `source.errors` and scanning continues after them.
pub fn scan(source: &Source) -> Vec<Token> {
    let bytes = source.content.as_bytes();
    let mut lexer = TokenKind::lexer(source.content);
    let mut tokens = Vec::new();
    let mut line = 1;
    // Newlines have been counted up to this byte offset.
    let mut counted = 0;

    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        line += count_newlines(&bytes[counted..span.end]);
        counted = span.end;

        let literal = match kind {
            TokenKind::Error => {
                source
                    .errors
                    .add_error(Diagnostic::lexical(line, "Unexpected character."));
                continue;
            }
            TokenKind::UnterminatedString => {
                source
                    .errors
                    .add_error(Diagnostic::lexical(line, "Unterminated string."));
                continue;
            }
            TokenKind::Number => match lexer.slice().parse() {
                Ok(val) => Some(Literal::Number(val)),
                Err(_) => {
                    source
                        .errors
                        .add_error(Diagnostic::lexical(line, "Invalid number literal."));
                    continue;
                }
            },
            TokenKind::String => {
                let slice = lexer.slice();
                Some(Literal::Str(slice[1..slice.len() - 1].to_string()))
            }
            _ => None,
        };

        tokens.push(Token::new(kind, lexer.slice(), literal, line));
    }

    line += count_newlines(&bytes[counted..]);
    tokens.push(Token::new(TokenKind::Eof, "", None, line));

    debug!(count = tokens.len(), "scanned tokens");
    tokens
}
