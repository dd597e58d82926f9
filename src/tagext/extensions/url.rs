//! `{% url "name" arg ... [as var] %}` and `{% url "name" key=arg ... [as var] %}`
//!
//! The first argument decides whether the call is positional or keyword; the two are never
//! mixed. String literals are read one token at a time so that `'a' 'b'` stays two
//! arguments instead of being concatenated by the expression parser.

use super::capture;
use super::Extension;
use crate::tagext::error::{TemplateError, TemplateResult};
use crate::tagext::host::ast::{Expr, Node};
use crate::tagext::host::parser::Parser;
use crate::tagext::host::token::TokenKind;
use crate::tagext::runtime::RuntimeFn;

#[derive(Debug, Clone, Copy, Default)]
pub struct Url;

/// Argument list, locked to one shape by its first entry
#[derive(Debug)]
enum Arguments {
    Undecided,
    Positional(Vec<Expr>),
    Keyword(Vec<(String, Expr)>),
}

impl Extension for Url {
    fn name(&self) -> &str {
        "url"
    }

    fn tags(&self) -> &[&'static str] {
        &["url"]
    }

    fn parse(&self, parser: &mut Parser<'_>) -> TemplateResult<Node> {
        parser.stream_mut().next_token();
        let view = parser.stream_mut().expect(TokenKind::String)?;

        let mut arguments = Arguments::Undecided;
        let mut target = None;
        loop {
            let token = parser.stream().current().clone();
            if matches!(token.kind, TokenKind::BlockEnd | TokenKind::Eof) {
                break;
            }
            if token.is_name("as") {
                target = capture::store_target(parser.stream_mut())?;
                break;
            }
            let keyword_shaped =
                token.kind == TokenKind::Name && parser.stream().look().kind == TokenKind::Assign;
            match &mut arguments {
                Arguments::Undecided => {
                    arguments = if keyword_shaped {
                        Arguments::Keyword(Vec::new())
                    } else {
                        Arguments::Positional(Vec::new())
                    };
                }
                Arguments::Positional(args) => {
                    if keyword_shaped {
                        return Err(TemplateError::syntax(
                            format!(
                                "got '{}=' after positional arguments, expected name for keyword argument",
                                token.value
                            ),
                            token.line,
                        ));
                    }
                    args.push(argument(parser)?);
                }
                Arguments::Keyword(kwargs) => {
                    if token.kind != TokenKind::Name {
                        return Err(TemplateError::syntax(
                            format!(
                                "got '{}', expected name for keyword argument",
                                token.describe()
                            ),
                            token.line,
                        ));
                    }
                    parser.stream_mut().next_token();
                    parser.stream_mut().expect(TokenKind::Assign)?;
                    kwargs.push((token.value, argument(parser)?));
                }
            }
        }

        let mut args = vec![Expr::constant(view.value)];
        let kwargs = match arguments {
            Arguments::Undecided => Vec::new(),
            Arguments::Positional(positional) => {
                args.extend(positional);
                Vec::new()
            }
            Arguments::Keyword(kwargs) => kwargs,
        };
        let call = Expr::runtime_kw(RuntimeFn::ResolveName, args, kwargs);
        Ok(capture::emit(call, target))
    }
}

/// One argument value: a lone string literal, or any expression
fn argument(parser: &mut Parser<'_>) -> TemplateResult<Expr> {
    match parser.stream_mut().next_if(TokenKind::String) {
        Some(literal) => Ok(Expr::constant(literal.value)),
        None => parser.parse_expression(),
    }
}
