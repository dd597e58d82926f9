//! Host parser
//!
//! Drives the template loop over the [`TokenStream`]: DATA becomes `Node::Data`,
//! `{{ expr }}` becomes `Node::Output`, and `{% name ... %}` is dispatched to the extension
//! owning `name`. After the extension returns, the parser expects the closing `%}`.
//!
//! The expression sub-parser is deliberately small:
//!
//!     expr     := postfix ('|' NAME)*
//!     postfix  := primary ('.' NAME | '(' [arg (',' arg)*] ')')*
//!     arg      := [NAME '='] expr
//!     primary  := NAME | STRING+ | INTEGER | FLOAT | '(' expr ')'
//!
//! Adjacent string literals are concatenated into one constant, so `'a' 'b'` is `'ab'`.
//! Grammars that need separate literals (the url tag) read STRING tokens themselves.

use crate::tagext::environment::Environment;
use crate::tagext::error::{TemplateError, TemplateResult};
use crate::tagext::host::ast::{Expr, Node};
use crate::tagext::host::lexer::tokenize;
use crate::tagext::host::render::is_builtin_filter;
use crate::tagext::host::stream::TokenStream;
use crate::tagext::host::token::{Token, TokenKind};
use serde_json::{Number, Value};

pub struct Parser<'env> {
    env: &'env Environment,
    stream: TokenStream,
}

impl<'env> Parser<'env> {
    pub fn new(env: &'env Environment, source: &str) -> TemplateResult<Self> {
        Ok(Parser {
            env,
            stream: TokenStream::new(tokenize(source)?),
        })
    }

    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut TokenStream {
        &mut self.stream
    }

    /// Parse the whole template
    pub fn parse(mut self) -> TemplateResult<Vec<Node>> {
        let mut nodes = Vec::new();
        loop {
            let token = self.stream.next_token();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Data => nodes.push(Node::data(token.value)),
                TokenKind::VariableBegin => {
                    let expr = self.parse_expression()?;
                    self.stream.expect(TokenKind::VariableEnd)?;
                    nodes.push(Node::output(expr));
                }
                TokenKind::BlockBegin => {
                    nodes.push(self.parse_statement()?);
                    self.stream.expect(TokenKind::BlockEnd)?;
                }
                _ => return Err(unexpected(&token)),
            }
        }
        Ok(nodes)
    }

    fn parse_statement(&mut self) -> TemplateResult<Node> {
        let token = self.stream.current().clone();
        if token.kind != TokenKind::Name {
            return Err(TemplateError::syntax("tag name expected", token.line));
        }
        let env = self.env;
        match env.extension_for(&token.value) {
            Some(extension) => {
                tracing::debug!(
                    tag = %token.value,
                    extension = extension.name(),
                    line = token.line,
                    "dispatching tag"
                );
                extension.parse(self)
            }
            None => Err(TemplateError::syntax(
                format!("encountered unknown tag '{}'", token.value),
                token.line,
            )),
        }
    }

    /// Parse one expression starting at the current token
    pub fn parse_expression(&mut self) -> TemplateResult<Expr> {
        let mut expr = self.parse_postfix()?;
        while self.stream.next_if(TokenKind::Pipe).is_some() {
            let name = self.stream.expect(TokenKind::Name)?;
            if !is_builtin_filter(&name.value) {
                return Err(TemplateError::syntax(
                    format!("no filter named '{}'", name.value),
                    name.line,
                ));
            }
            expr = Expr::Filter {
                expr: Box::new(expr),
                name: name.value,
            };
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> TemplateResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.stream.current().kind {
                TokenKind::Dot => {
                    self.stream.next_token();
                    let attr = self.stream.expect(TokenKind::Name)?;
                    expr = Expr::Getattr {
                        object: Box::new(expr),
                        attr: attr.value,
                    };
                }
                TokenKind::LParen => {
                    let Expr::Name { name } = &expr else { break };
                    let name = name.clone();
                    self.stream.next_token();
                    let (args, kwargs) = self.parse_call_args()?;
                    expr = Expr::Call { name, args, kwargs };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Arguments up to the closing parenthesis; keyword arguments come last
    fn parse_call_args(&mut self) -> TemplateResult<(Vec<Expr>, Vec<(String, Expr)>)> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();
        while self.stream.next_if(TokenKind::RParen).is_none() {
            if !args.is_empty() || !kwargs.is_empty() {
                self.stream.expect(TokenKind::Comma)?;
            }
            let keyword = self.stream.current().kind == TokenKind::Name
                && self.stream.look().kind == TokenKind::Assign;
            if keyword {
                let key = self.stream.next_token();
                self.stream.next_token();
                if kwargs.iter().any(|(name, _)| *name == key.value) {
                    return Err(TemplateError::syntax(
                        format!("keyword argument '{}' repeated", key.value),
                        key.line,
                    ));
                }
                kwargs.push((key.value, self.parse_expression()?));
            } else if kwargs.is_empty() {
                args.push(self.parse_expression()?);
            } else {
                return Err(TemplateError::syntax(
                    "positional argument follows keyword argument",
                    self.stream.current().line,
                ));
            }
        }
        Ok((args, kwargs))
    }

    fn parse_primary(&mut self) -> TemplateResult<Expr> {
        let token = self.stream.next_token();
        match token.kind {
            TokenKind::Name => Ok(match token.value.as_str() {
                "true" | "True" => Expr::constant(true),
                "false" | "False" => Expr::constant(false),
                "none" | "None" => Expr::constant(Value::Null),
                _ => Expr::name(token.value),
            }),
            TokenKind::String => {
                let mut text = token.value;
                while let Some(next) = self.stream.next_if(TokenKind::String) {
                    text.push_str(&next.value);
                }
                Ok(Expr::constant(text))
            }
            TokenKind::Integer => token
                .value
                .parse::<i64>()
                .map(Expr::constant)
                .map_err(|_| TemplateError::syntax("integer literal out of range", token.line)),
            TokenKind::Float => token
                .value
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(|n| Expr::constant(Value::Number(n)))
                .ok_or_else(|| TemplateError::syntax("invalid float literal", token.line)),
            TokenKind::LParen => {
                let expr = self.parse_expression()?;
                self.stream.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(unexpected(&token)),
        }
    }
}

fn unexpected(token: &Token) -> TemplateError {
    match token.kind {
        TokenKind::Eof => TemplateError::syntax("unexpected end of template", token.line),
        _ => TemplateError::syntax(format!("unexpected '{}'", token.describe()), token.line),
    }
}
