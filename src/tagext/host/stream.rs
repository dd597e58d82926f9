//! Token cursor shared by the host parser and every tag grammar
//!
//! The stream always holds a current token and never advances past EOF, so grammars can
//! look at `current()` and `look()` freely. All `expect*` helpers fail with a
//! [`TemplateError::Syntax`] describing what was found, at the offending token's line.

use crate::tagext::error::{TemplateError, TemplateResult};
use crate::tagext::host::token::{Token, TokenKind};

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    /// Build a stream; an EOF token is appended if the input lacks one
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::eof(line));
        }
        TokenStream { tokens, pos: 0 }
    }

    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// The token after the current one (EOF when there is none)
    pub fn look(&self) -> &Token {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Return the current token and advance
    pub fn next_token(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Advance only if the current token has this kind
    pub fn next_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.current().kind == kind {
            Some(self.next_token())
        } else {
            None
        }
    }

    /// The `name:<value>` test against the current token
    pub fn is_name(&self, value: &str) -> bool {
        self.current().is_name(value)
    }

    /// Skip the current token if it is the name `value`
    pub fn skip_if_name(&mut self, value: &str) -> bool {
        if self.is_name(value) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> TemplateResult<Token> {
        if self.current().kind == kind {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    pub fn expect_name(&mut self, value: &str) -> TemplateResult<Token> {
        if self.is_name(value) {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(value))
        }
    }

    fn unexpected(&self, expected: &str) -> TemplateError {
        let current = self.current();
        if current.kind == TokenKind::Eof {
            TemplateError::syntax(
                format!("unexpected end of template, expected '{}'", expected),
                current.line,
            )
        } else {
            TemplateError::syntax(
                format!(
                    "expected token '{}', got '{}'",
                    expected,
                    current.describe()
                ),
                current.line,
            )
        }
    }
}
