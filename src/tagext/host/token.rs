//! Token definitions for the host template language
//!
//! The lexer produces a flat list of [`Token`]s. Grammars inspect tokens by kind and,
//! for names, by value (the `name:as` style test).

use std::fmt;

/// Kinds of lexical tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Name,
    String,
    Integer,
    Float,
    Assign,
    Dot,
    Pipe,
    Comma,
    LParen,
    RParen,
    BlockBegin,
    BlockEnd,
    VariableBegin,
    VariableEnd,
    Data,
    Eof,
}

impl TokenKind {
    /// Human description of the kind, used in error messages
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Name => "name",
            TokenKind::String => "string",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Assign => "=",
            TokenKind::Dot => ".",
            TokenKind::Pipe => "|",
            TokenKind::Comma => ",",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::BlockBegin => "begin of statement block",
            TokenKind::BlockEnd => "end of statement block",
            TokenKind::VariableBegin => "begin of print statement",
            TokenKind::VariableEnd => "end of print statement",
            TokenKind::Data => "template data / text",
            TokenKind::Eof => "end of template",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A lexical token with its (unescaped) value and 1-based source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Token::new(TokenKind::Eof, "", line)
    }

    /// True for a NAME token with exactly this value
    pub fn is_name(&self, value: &str) -> bool {
        self.kind == TokenKind::Name && self.value == value
    }

    /// Description for error messages: names describe as themselves
    pub fn describe(&self) -> &str {
        match self.kind {
            TokenKind::Name => &self.value,
            kind => kind.describe(),
        }
    }
}
