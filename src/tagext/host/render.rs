//! Host renderer
//!
//! Executes the AST against a JSON object context. `Assign` nodes write into that context,
//! so later output sees captured tag results. Every expression of an `Output` node goes
//! through the environment finalizer, except `TemplateData` which is emitted as written.

use crate::tagext::environment::Environment;
use crate::tagext::error::{TemplateError, TemplateResult};
use crate::tagext::extensions::i18n;
use crate::tagext::host::ast::{Expr, Node};
use crate::tagext::runtime::RuntimeFn;
use serde_json::{Map, Value};

const BUILTIN_FILTERS: &[&str] = &["upper", "lower", "trim", "length", "safe"];

pub fn is_builtin_filter(name: &str) -> bool {
    BUILTIN_FILTERS.contains(&name)
}

/// Text form of a value as it appears in output. Null renders as nothing.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub struct Renderer<'env> {
    env: &'env Environment,
    vars: Map<String, Value>,
}

impl<'env> Renderer<'env> {
    pub fn new(env: &'env Environment, context: &Value) -> TemplateResult<Self> {
        let vars = match context {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => return Err(TemplateError::render("render context must be an object")),
        };
        Ok(Renderer { env, vars })
    }

    pub fn render(mut self, nodes: &[Node]) -> TemplateResult<String> {
        let mut out = String::new();
        for node in nodes {
            match node {
                Node::Data { text } => out.push_str(text),
                Node::Output { exprs } => {
                    for expr in exprs {
                        let value = self.eval(expr)?;
                        let value = match expr {
                            Expr::TemplateData { .. } => value,
                            _ => self.env.finalize_value(value),
                        };
                        out.push_str(&to_text(&value));
                    }
                }
                Node::Assign { target, value } => {
                    let value = self.eval(value)?;
                    self.vars.insert(target.clone(), value);
                }
            }
        }
        Ok(out)
    }

    pub fn eval(&self, expr: &Expr) -> TemplateResult<Value> {
        match expr {
            Expr::Const { value } => Ok(value.clone()),
            Expr::TemplateData { text } => Ok(Value::String(text.clone())),
            Expr::Name { name } => Ok(self.vars.get(name).cloned().unwrap_or(Value::Null)),
            Expr::Getattr { object, attr } => Ok(match self.eval(object)? {
                Value::Object(map) => map.get(attr).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            }),
            Expr::Filter { expr, name } => apply_filter(name, self.eval(expr)?),
            Expr::Call { name, args, kwargs } => {
                let global = self.env.global(name).ok_or_else(|| {
                    TemplateError::render(format!("'{}' is undefined or not callable", name))
                })?;
                let args = self.eval_all(args)?;
                global(&args[..], &self.eval_pairs(kwargs)?)
            }
            Expr::Runtime { func, args, kwargs } => {
                let args = self.eval_all(args)?;
                self.call_runtime(*func, &args, &self.eval_pairs(kwargs)?)
            }
            Expr::Dict { items } => Ok(Value::Object(self.eval_pairs(items)?)),
            // No autoescaping in this host, safe values render as they are
            Expr::MarkSafe { expr } => self.eval(expr),
        }
    }

    fn eval_all(&self, exprs: &[Expr]) -> TemplateResult<Vec<Value>> {
        exprs.iter().map(|expr| self.eval(expr)).collect()
    }

    fn eval_pairs(&self, pairs: &[(String, Expr)]) -> TemplateResult<Map<String, Value>> {
        pairs
            .iter()
            .map(|(key, expr)| Ok((key.clone(), self.eval(expr)?)))
            .collect()
    }

    fn call_runtime(
        &self,
        func: RuntimeFn,
        args: &[Value],
        kwargs: &Map<String, Value>,
    ) -> TemplateResult<Value> {
        tracing::trace!(%func, args = args.len(), kwargs = kwargs.len(), "runtime call");
        let runtime = self.env.runtime();
        let text = match func {
            RuntimeFn::Translate => runtime.translate(&text_arg(func, args, 0)?),
            RuntimeFn::TranslateContext => {
                runtime.translate_ctx(&text_arg(func, args, 0)?, &text_arg(func, args, 1)?)
            }
            RuntimeFn::BlockTranslate => return i18n::render_blocktrans(self.env, args, kwargs),
            RuntimeFn::ResolveName => {
                let name = text_arg(func, args, 0)?;
                if kwargs.is_empty() {
                    runtime.resolve_name(&name, &args[1..])?
                } else {
                    runtime.resolve_name_kw(&name, kwargs)?
                }
            }
            RuntimeFn::AssetPath => runtime.asset_path(&text_arg(func, args, 0)?),
            RuntimeFn::CsrfToken => {
                runtime.render_token_field(args.first().unwrap_or(&Value::Null))
            }
            RuntimeFn::Now => runtime.format_now(&text_arg(func, args, 0)?)?,
        };
        Ok(Value::String(text))
    }
}

fn text_arg(func: RuntimeFn, args: &[Value], index: usize) -> TemplateResult<String> {
    args.get(index).map(to_text).ok_or_else(|| {
        TemplateError::render(format!(
            "{} expects at least {} argument(s)",
            func,
            index + 1
        ))
    })
}

fn apply_filter(name: &str, value: Value) -> TemplateResult<Value> {
    Ok(match name {
        "upper" => Value::String(to_text(&value).to_uppercase()),
        "lower" => Value::String(to_text(&value).to_lowercase()),
        "trim" => Value::String(to_text(&value).trim().to_string()),
        "length" => Value::from(match &value {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            Value::Null => 0,
            other => to_text(other).chars().count(),
        }),
        "safe" => value,
        _ => return Err(TemplateError::render(format!("no filter named '{}'", name))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagext::config::Settings;
    use crate::tagext::finalize::Finalizer;
    use crate::tagext::runtime::Runtime;
    use serde_json::json;

    fn env() -> Environment {
        let settings = Settings::default();
        Environment::builder(settings.clone(), Runtime::with_defaults(&settings))
            .build()
            .unwrap()
    }

    fn render(env: &Environment, source: &str, context: Value) -> String {
        env.from_string(source).unwrap().render(&context).unwrap()
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&Value::Null), "");
        assert_eq!(to_text(&json!("a")), "a");
        assert_eq!(to_text(&json!(3)), "3");
        assert_eq!(to_text(&json!(true)), "true");
        assert_eq!(to_text(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_undefined_renders_empty() {
        assert_eq!(render(&env(), "[{{ missing }}]", json!({})), "[]");
    }

    #[test]
    fn test_attributes_and_filters() {
        let context = json!({"foo": {"bar": "argument"}, "items": [1, 2, 3]});
        assert_eq!(
            render(&env(), "{{ foo.bar|upper }} {{ items|length }}", context),
            "ARGUMENT 3"
        );
    }

    #[test]
    fn test_finalizer_skips_data() {
        let settings = Settings::default();
        let env = Environment::builder(settings.clone(), Runtime::with_defaults(&settings))
            .finalize(Finalizer::new(|value| {
                Value::String(format!("<{}>", to_text(&value)))
            }))
            .build()
            .unwrap();
        assert_eq!(render(&env, "a {{ b }} c", json!({"b": "x"})), "a <x> c");
    }

    #[test]
    fn test_non_object_context_is_rejected() {
        let env = env();
        let template = env.from_string("x").unwrap();
        assert!(template.render(&json!([1])).is_err());
        assert_eq!(template.render(&Value::Null).unwrap(), "x");
    }

    #[test]
    fn test_calling_unknown_global() {
        let env = env();
        let err = env
            .from_string("{{ nope('x') }}")
            .unwrap()
            .render(&json!({}))
            .unwrap_err();
        assert_eq!(err.message(), "'nope' is undefined or not callable");
    }
}
