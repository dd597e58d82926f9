//! `as NAME` capture suffix shared by the single-line tags

use crate::tagext::error::TemplateResult;
use crate::tagext::host::ast::{Expr, Node};
use crate::tagext::host::parser::Parser;
use crate::tagext::host::stream::TokenStream;
use crate::tagext::host::token::TokenKind;
use crate::tagext::runtime::RuntimeFn;

/// Consume `as NAME` if the stream is on it
pub fn store_target(stream: &mut TokenStream) -> TemplateResult<Option<String>> {
    if !stream.skip_if_name("as") {
        return Ok(None);
    }
    let target = stream.expect(TokenKind::Name)?;
    Ok(Some(target.value))
}

/// Output the value, or assign it when a capture target was given
pub fn emit(value: Expr, target: Option<String>) -> Node {
    match target {
        Some(target) => Node::assign(target, value),
        None => Node::output(value),
    }
}

/// Grammar of `{% tag "literal" [as NAME] %}`
pub fn literal_call(parser: &mut Parser<'_>, func: RuntimeFn) -> TemplateResult<Node> {
    let stream = parser.stream_mut();
    stream.next_token();
    let literal = stream.expect(TokenKind::String)?;
    let call = Expr::runtime(func, vec![Expr::constant(literal.value)]);
    let target = store_target(stream)?;
    Ok(emit(call, target))
}
