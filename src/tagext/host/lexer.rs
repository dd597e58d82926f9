//! Template lexer
//!
//! Tokenization is handled by two logos lexers over the same source. `DataLexeme` runs
//! outside delimiters and only knows about `{%`, `{{`, `{# ... #}` and plain text. On an
//! opening delimiter the lexer morphs into `TagLexeme`, which produces names, literals and
//! punctuation until the matching closing delimiter, then morphs back.
//!
//! Adjacent text fragments are merged into a single DATA token and comments are dropped,
//! so the parser sees exactly the token kinds listed in [`TokenKind`].

use crate::tagext::error::{TemplateError, TemplateResult};
use crate::tagext::host::token::{Token, TokenKind};
use logos::{Lexer, Logos};

#[derive(Logos, Debug, PartialEq, Clone)]
enum DataLexeme {
    #[token("{%")]
    BlockBegin,

    #[token("{{")]
    VariableBegin,

    #[token("{#", skip_comment)]
    Comment,

    #[regex(r"[^{]+")]
    Text,

    // A lone brace that opens nothing
    #[token("{")]
    Brace,
}

fn skip_comment(lex: &mut Lexer<DataLexeme>) -> bool {
    match lex.remainder().find("#}") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n]+")]
enum TagLexeme {
    #[token("%}")]
    BlockEnd,

    #[token("}}")]
    VariableEnd,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    #[regex(r#""([^"\\]|\\.)*""#, string_literal)]
    #[regex(r#"'([^'\\]|\\.)*'"#, string_literal)]
    Str(String),

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Integer,

    #[token("=")]
    Assign,

    #[token(".")]
    Dot,

    #[token("|")]
    Pipe,

    #[token(",")]
    Comma,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

fn string_literal(lex: &mut Lexer<TagLexeme>) -> String {
    let raw = lex.slice();
    unescape(&raw[1..raw.len() - 1])
}

/// Resolve backslash escapes inside a quoted literal
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(escaped @ ('\\' | '\'' | '"')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

impl TagLexeme {
    fn into_token(self, slice: &str, line: usize) -> Token {
        let kind = match self {
            TagLexeme::Str(value) => return Token::new(TokenKind::String, value, line),
            TagLexeme::BlockEnd => TokenKind::BlockEnd,
            TagLexeme::VariableEnd => TokenKind::VariableEnd,
            TagLexeme::Name => TokenKind::Name,
            TagLexeme::Float => TokenKind::Float,
            TagLexeme::Integer => TokenKind::Integer,
            TagLexeme::Assign => TokenKind::Assign,
            TagLexeme::Dot => TokenKind::Dot,
            TagLexeme::Pipe => TokenKind::Pipe,
            TagLexeme::Comma => TokenKind::Comma,
            TagLexeme::LParen => TokenKind::LParen,
            TagLexeme::RParen => TokenKind::RParen,
        };
        Token::new(kind, slice, line)
    }

    fn is_closing(&self) -> bool {
        matches!(self, TagLexeme::BlockEnd | TagLexeme::VariableEnd)
    }
}

/// Maps byte offsets to 1-based line numbers. Offsets must be queried in ascending order.
struct LineCounter<'s> {
    source: &'s str,
    offset: usize,
    line: usize,
}

impl<'s> LineCounter<'s> {
    fn new(source: &'s str) -> Self {
        LineCounter {
            source,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        if offset > self.offset {
            self.line += self.source.as_bytes()[self.offset..offset]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            self.offset = offset;
        }
        self.line
    }
}

/// Tokenize template source into a token list terminated by EOF
pub fn tokenize(source: &str) -> TemplateResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut lines = LineCounter::new(source);
    let mut pending: Option<Token> = None;
    let mut data = DataLexeme::lexer(source);

    while let Some(result) = data.next() {
        let line = lines.line_at(data.span().start);
        match result {
            Ok(DataLexeme::Text) | Ok(DataLexeme::Brace) => match pending.as_mut() {
                Some(token) => token.value.push_str(data.slice()),
                None => pending = Some(Token::new(TokenKind::Data, data.slice(), line)),
            },
            Ok(DataLexeme::Comment) => {}
            Ok(opener) => {
                tokens.extend(pending.take());
                let kind = if opener == DataLexeme::BlockBegin {
                    TokenKind::BlockBegin
                } else {
                    TokenKind::VariableBegin
                };
                tokens.push(Token::new(kind, data.slice(), line));

                let mut tag = data.morph::<TagLexeme>();
                lex_tag(&mut tag, &mut lines, &mut tokens)?;
                data = tag.morph();
            }
            Err(()) => return Err(TemplateError::syntax("missing end of comment tag", line)),
        }
    }

    tokens.extend(pending.take());
    tokens.push(Token::eof(lines.line_at(source.len())));
    Ok(tokens)
}

/// Lex the inside of one delimiter pair, up to and including the closing delimiter
fn lex_tag(
    tag: &mut Lexer<'_, TagLexeme>,
    lines: &mut LineCounter<'_>,
    tokens: &mut Vec<Token>,
) -> TemplateResult<()> {
    while let Some(result) = tag.next() {
        let line = lines.line_at(tag.span().start);
        let lexeme = result.map_err(|_| {
            TemplateError::syntax(format!("unexpected char '{}'", tag.slice()), line)
        })?;
        let closing = lexeme.is_closing();
        tokens.push(lexeme.into_token(tag.slice(), line));
        if closing {
            break;
        }
    }
    Ok(())
}
