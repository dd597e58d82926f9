//! Translation tags
//!
//! `{% trans "msg" [noop] [context "c"] [as name] %}` translates a single literal. The
//! modifiers may come in any order, each at most once, but `noop` and `context` exclude
//! each other.
//!
//! `{% blocktrans [trimmed] [asvar name] [with k=v ...] [count n=v] [context "c"] %}`
//! translates a templated body up to `{% endblocktrans %}`. Inside the body only literal
//! text, bare `{{ name }}` references and a single `{% plural %}` marker are allowed.
//! References are rewritten to `%(name)s` placeholders, which is the exact message id the
//! translation catalog sees. Names not bound in the header are looked up in the render
//! context.
//!
//! The extension also registers the `_`, `gettext` and `pgettext` globals.

use super::capture;
use super::Extension;
use crate::tagext::environment::{Environment, EnvironmentBuilder};
use crate::tagext::error::{TemplateError, TemplateResult};
use crate::tagext::host::ast::{Expr, Node};
use crate::tagext::host::parser::Parser;
use crate::tagext::host::render::to_text;
use crate::tagext::host::stream::TokenStream;
use crate::tagext::host::token::TokenKind;
use crate::tagext::runtime::RuntimeFn;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// `%(name)s` placeholders and `%%` escapes
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%(?:\(([^)]*)\)s|%)").expect("valid placeholder pattern"));

const HEADER_CLAUSES: &str = "expected 'trimmed', 'asvar', 'with', 'count' or 'context'";

#[derive(Debug, Clone, Copy, Default)]
pub struct I18n;

impl Extension for I18n {
    fn name(&self) -> &str {
        "i18n"
    }

    fn tags(&self) -> &[&'static str] {
        &["trans", "blocktrans"]
    }

    fn parse(&self, parser: &mut Parser<'_>) -> TemplateResult<Node> {
        let token = parser.stream_mut().next_token();
        match token.value.as_str() {
            "trans" => parse_trans(parser.stream_mut()),
            "blocktrans" => parse_blocktrans(parser, token.line),
            other => Err(TemplateError::syntax(
                format!("got unexpected tag '{}'", other),
                token.line,
            )),
        }
    }

    fn install(&self, env: &mut EnvironmentBuilder) {
        let runtime = env.runtime().clone();
        let gettext = move |args: &[Value], kwargs: &Map<String, Value>| -> TemplateResult<Value> {
            let message = argument(args, kwargs, 0, "message")
                .ok_or_else(|| TemplateError::render("gettext expects a message"))?;
            Ok(Value::String(runtime.translate(&message)))
        };
        env.add_global("_", gettext.clone());
        env.add_global("gettext", gettext);

        let runtime = env.runtime().clone();
        env.add_global("pgettext", move |args: &[Value], kwargs: &Map<String, Value>| {
            match (
                argument(args, kwargs, 0, "context"),
                argument(args, kwargs, 1, "message"),
            ) {
                (Some(context), Some(message)) => {
                    Ok(Value::String(runtime.translate_ctx(&context, &message)))
                }
                _ => Err(TemplateError::render("pgettext expects a context and a message")),
            }
        });
    }
}

/// Global call argument by position, or by keyword
fn argument(
    args: &[Value],
    kwargs: &Map<String, Value>,
    index: usize,
    keyword: &str,
) -> Option<String> {
    args.get(index).or_else(|| kwargs.get(keyword)).map(to_text)
}

fn parse_trans(stream: &mut TokenStream) -> TemplateResult<Node> {
    let message = stream.expect(TokenKind::String)?.value;
    let mut noop = false;
    let mut context: Option<String> = None;
    let mut target: Option<String> = None;

    loop {
        if target.is_none() {
            if let Some(name) = capture::store_target(stream)? {
                target = Some(name);
                continue;
            }
        }
        let Some(token) = stream.next_if(TokenKind::Name) else {
            break;
        };
        match token.value.as_str() {
            "noop" if !noop => {
                if context.is_some() {
                    return Err(noop_with_context(token.line));
                }
                noop = true;
            }
            "context" if context.is_none() => {
                if noop {
                    return Err(noop_with_context(token.line));
                }
                context = Some(stream.expect(TokenKind::String)?.value);
            }
            _ => {
                return Err(TemplateError::syntax(
                    "expected 'noop', 'context' or 'as'",
                    token.line,
                ))
            }
        }
    }

    let value = if noop {
        Expr::constant(message)
    } else if let Some(context) = context {
        Expr::runtime(
            RuntimeFn::TranslateContext,
            vec![Expr::constant(context), Expr::constant(message)],
        )
    } else {
        Expr::runtime(RuntimeFn::Translate, vec![Expr::constant(message)])
    };
    Ok(capture::emit(value, target))
}

fn noop_with_context(line: usize) -> TemplateError {
    TemplateError::syntax("noop translation can't have context", line)
}

/// Header of a `blocktrans` tag
#[derive(Debug, Default)]
struct BlockHeader {
    trimmed: bool,
    asvar: Option<String>,
    with: Option<Vec<(String, Expr)>>,
    count: Option<(String, Expr)>,
    context: Option<String>,
}

impl BlockHeader {
    fn parse(parser: &mut Parser<'_>) -> TemplateResult<Self> {
        let mut header = BlockHeader::default();
        loop {
            let token = parser.stream().current().clone();
            match token.kind {
                TokenKind::BlockEnd | TokenKind::Eof => break,
                TokenKind::Name => {}
                _ => return Err(TemplateError::syntax(HEADER_CLAUSES, token.line)),
            }
            let seen = match token.value.as_str() {
                "trimmed" => header.trimmed,
                "asvar" => header.asvar.is_some(),
                "with" => header.with.is_some(),
                "count" => header.count.is_some(),
                "context" => header.context.is_some(),
                _ => return Err(TemplateError::syntax(HEADER_CLAUSES, token.line)),
            };
            if seen {
                return Err(TemplateError::syntax(
                    format!("duplicate '{}' in blocktrans tag", token.value),
                    token.line,
                ));
            }
            parser.stream_mut().next_token();

            match token.value.as_str() {
                "trimmed" => header.trimmed = true,
                "asvar" => {
                    header.asvar = Some(parser.stream_mut().expect(TokenKind::Name)?.value);
                }
                "with" => {
                    let mut bindings = vec![binding(parser)?];
                    while parser.stream().current().kind == TokenKind::Name
                        && parser.stream().look().kind == TokenKind::Assign
                    {
                        bindings.push(binding(parser)?);
                    }
                    header.with = Some(bindings);
                }
                "count" => header.count = Some(binding(parser)?),
                _ => {
                    header.context = Some(parser.stream_mut().expect(TokenKind::String)?.value);
                }
            }
        }
        Ok(header)
    }

    fn binds(&self, name: &str) -> bool {
        let in_with = self
            .with
            .iter()
            .flatten()
            .any(|(bound, _)| bound == name);
        in_with || matches!(&self.count, Some((bound, _)) if bound == name)
    }
}

/// `NAME '=' expr`
fn binding(parser: &mut Parser<'_>) -> TemplateResult<(String, Expr)> {
    let name = parser.stream_mut().expect(TokenKind::Name)?.value;
    parser.stream_mut().expect(TokenKind::Assign)?;
    let value = parser.parse_expression()?;
    Ok((name, value))
}

/// Body text accumulated between the header and `endblocktrans`
#[derive(Debug, Default)]
struct BlockBody {
    singular: String,
    plural: Option<String>,
    implicit: Vec<String>,
}

impl BlockBody {
    fn parse(stream: &mut TokenStream, header: &BlockHeader) -> TemplateResult<Self> {
        let mut body = BlockBody::default();
        let mut text = String::new();
        loop {
            let token = stream.next_token();
            match token.kind {
                TokenKind::Eof => {
                    return Err(TemplateError::syntax(
                        "unexpected end of template, expected 'endblocktrans'",
                        token.line,
                    ))
                }
                TokenKind::Data => text.push_str(&token.value),
                TokenKind::VariableBegin => {
                    let name = stream.expect(TokenKind::Name)?.value;
                    stream.expect(TokenKind::VariableEnd)?;
                    text.push_str(&format!("%({})s", name));
                    if !header.binds(&name) && !body.implicit.contains(&name) {
                        body.implicit.push(name);
                    }
                }
                TokenKind::BlockBegin => {
                    if body.plural.is_none() && stream.is_name("plural") {
                        let marker = stream.next_token();
                        if header.count.is_none() {
                            return Err(TemplateError::config(
                                "used plural without specifying count",
                                Some(marker.line),
                            ));
                        }
                        stream.expect(TokenKind::BlockEnd)?;
                        body.singular = std::mem::take(&mut text);
                        body.plural = Some(String::new());
                        continue;
                    }
                    stream.expect_name("endblocktrans")?;
                    break;
                }
                _ => {
                    return Err(TemplateError::syntax(
                        format!("unexpected '{}' in blocktrans body", token.describe()),
                        token.line,
                    ))
                }
            }
        }
        match body.plural {
            Some(_) => body.plural = Some(text),
            None => body.singular = text,
        }
        Ok(body)
    }
}

fn parse_blocktrans(parser: &mut Parser<'_>, line: usize) -> TemplateResult<Node> {
    let header = BlockHeader::parse(parser)?;
    parser.stream_mut().expect(TokenKind::BlockEnd)?;
    let body = BlockBody::parse(parser.stream_mut(), &header)?;

    if header.count.is_some() && body.plural.is_none() {
        return Err(TemplateError::config("plural form not found", Some(line)));
    }

    let tidy = |text: String| {
        if header.trimmed {
            trim_body(&text)
        } else {
            text
        }
    };
    let mut args = vec![Expr::template_data(tidy(body.singular))];
    if let Some(plural) = body.plural {
        args.push(Expr::template_data(tidy(plural)));
    }
    tracing::trace!(
        line,
        plural = args.len() == 2,
        implicit = ?body.implicit,
        "parsed blocktrans"
    );

    let BlockHeader {
        asvar,
        with,
        count,
        context,
        ..
    } = header;
    let mut trans_vars = with.unwrap_or_default();
    let count_var = count.as_ref().map(|(name, _)| name.clone());
    trans_vars.extend(count);
    trans_vars.extend(
        body.implicit
            .into_iter()
            .map(|name| (name.clone(), Expr::name(name))),
    );

    let mut kwargs = vec![("trans_vars".to_string(), Expr::Dict { items: trans_vars })];
    if let Some(context) = context {
        kwargs.push(("context".to_string(), Expr::constant(context)));
    }
    if let Some(count_var) = count_var {
        kwargs.push(("count_var".to_string(), Expr::constant(count_var)));
    }

    let call = Expr::runtime_kw(RuntimeFn::BlockTranslate, args, kwargs);
    Ok(capture::emit(Expr::mark_safe(call), asvar))
}

/// Collapse a body onto one line: strip the block, strip every line, join with spaces
pub fn trim_body(text: &str) -> String {
    split_lines(text.trim())
        .into_iter()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Line boundaries include a lone `\r`, form feeds, file/group/record separators
/// and the Unicode line and paragraph separators, not only `\n` and `\r\n`
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find(is_line_break) {
        lines.push(&rest[..pos]);
        let tail = &rest[pos..];
        let width = if tail.starts_with("\r\n") {
            2
        } else {
            tail.chars().next().map_or(1, char::len_utf8)
        };
        rest = &tail[width..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}

/// Substitute `%(name)s` placeholders. `%%` becomes `%`, any other `%` is kept.
pub fn interpolate(text: &str, vars: &Map<String, Value>) -> TemplateResult<String> {
    let mut missing = None;
    let out = PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| match caps.get(1) {
        None => "%".to_string(),
        Some(name) => match vars.get(name.as_str()) {
            Some(value) => to_text(value),
            None => {
                missing.get_or_insert_with(|| name.as_str().to_string());
                String::new()
            }
        },
    });
    match missing {
        Some(name) => Err(TemplateError::render(format!(
            "no value for placeholder '{}'",
            name
        ))),
        None => Ok(out.into_owned()),
    }
}

/// Render-time half of `blocktrans`
pub fn render_blocktrans(
    env: &Environment,
    args: &[Value],
    kwargs: &Map<String, Value>,
) -> TemplateResult<Value> {
    let (singular, plural) = match args {
        [singular] => (to_text(singular), None),
        [singular, plural] => (to_text(singular), Some(to_text(plural))),
        _ => {
            return Err(TemplateError::render(
                "blocktrans expects a singular and an optional plural form",
            ))
        }
    };
    let empty = Map::new();
    let trans_vars = kwargs
        .get("trans_vars")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let context = kwargs.get("context").and_then(Value::as_str);
    let finalized: Map<String, Value> = trans_vars
        .iter()
        .map(|(key, value)| (key.clone(), env.finalize_value(value.clone())))
        .collect();

    let runtime = env.runtime();
    let translated = match plural {
        None => match context {
            Some(context) => runtime.translate_ctx(context, &singular),
            None => runtime.translate(&singular),
        },
        Some(plural) => {
            let count_var = kwargs
                .get("count_var")
                .and_then(Value::as_str)
                .ok_or_else(|| TemplateError::render("plural blocktrans without count"))?;
            let count = count_value(count_var, trans_vars.get(count_var))?;
            match context {
                Some(context) => runtime.translate_plural_ctx(context, &singular, &plural, count),
                None => runtime.translate_plural(&singular, &plural, count),
            }
        }
    };
    interpolate(&translated, &finalized).map(Value::String)
}

fn count_value(name: &str, value: Option<&Value>) -> TemplateResult<i64> {
    let count = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::Bool(b)) => Some(i64::from(*b)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    count.ok_or_else(|| {
        TemplateError::render(format!("count variable '{}' is not a number", name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trim_body() {
        assert_eq!(trim_body("\n  a\n  b\n"), "a b");
        assert_eq!(trim_body("   "), "");
        assert_eq!(trim_body("one"), "one");
    }

    #[test]
    fn test_trim_body_line_breaks() {
        assert_eq!(trim_body(" a\r  b "), "a b");
        assert_eq!(trim_body("a\r\n  b\r\nc"), "a b c");
        assert_eq!(trim_body("a\u{2028}b\x0cc"), "a b c");
        assert_eq!(trim_body("a\n\nb"), "a  b");
    }

    #[test]
    fn test_interpolate() {
        let vars = json!({"n": 3, "foo": "X"});
        let vars = vars.as_object().unwrap();
        assert_eq!(
            interpolate("%(n)s of %(foo)s", vars).unwrap(),
            "3 of X"
        );
        assert_eq!(interpolate("100%% sure", vars).unwrap(), "100% sure");
        assert_eq!(interpolate("50% off", vars).unwrap(), "50% off");
    }

    #[test]
    fn test_interpolate_missing_placeholder() {
        let err = interpolate("%(nope)s", &Map::new()).unwrap_err();
        assert_eq!(err.message(), "no value for placeholder 'nope'");
    }

    #[test]
    fn test_count_value() {
        assert_eq!(count_value("n", Some(&json!(3))).unwrap(), 3);
        assert_eq!(count_value("n", Some(&json!(2.7))).unwrap(), 2);
        assert_eq!(count_value("n", Some(&json!(" 5 "))).unwrap(), 5);
        assert_eq!(count_value("n", Some(&json!(true))).unwrap(), 1);
        assert_eq!(count_value("n", Some(&json!(false))).unwrap(), 0);
        let err = count_value("n", Some(&json!("many"))).unwrap_err();
        assert_eq!(err.message(), "count variable 'n' is not a number");
        assert!(count_value("n", None).is_err());
    }

    #[test]
    fn test_header_binds() {
        let header = BlockHeader {
            with: Some(vec![("foo".to_string(), Expr::name("bar"))]),
            count: Some(("n".to_string(), Expr::constant(1))),
            ..BlockHeader::default()
        };
        assert!(header.binds("foo"));
        assert!(header.binds("n"));
        assert!(!header.binds("bar"));
    }
}
