//! Runtime-support hooks
//!
//! Compiled templates never look translation catalogs, route tables or clocks up from
//! ambient state. Every such call goes through a [`Runtime`] that the embedding application
//! builds once and passes to the environment. Each hook has a default so an environment
//! can be built with only the hooks an application cares about replaced.
//!
//! Defaults:
//!
//!     translate*       identity; plural forms pick singular when count == 1
//!     resolve_name*    fail: there is no route table to consult
//!     asset_path       `assets.static_url` joined with the path
//!     token field      hidden csrf input, empty for a missing or NOTPROVIDED token
//!     format_now       chrono strftime, UTC when `l10n.use_tz`, local time otherwise
//!     localize         identity
//!     localtime        identity

use crate::tagext::config::Settings;
use crate::tagext::error::{TemplateError, TemplateResult};
use chrono::{Local, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{self, Write};
use std::sync::Arc;

type TextHook = Arc<dyn Fn(&str) -> String + Send + Sync>;
type ContextHook = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;
type PluralHook = Arc<dyn Fn(&str, &str, i64) -> String + Send + Sync>;
type PluralContextHook = Arc<dyn Fn(&str, &str, &str, i64) -> String + Send + Sync>;
type ResolveHook = Arc<dyn Fn(&str, &[Value]) -> Result<String, String> + Send + Sync>;
type ResolveKwHook =
    Arc<dyn Fn(&str, &Map<String, Value>) -> Result<String, String> + Send + Sync>;
type TokenFieldHook = Arc<dyn Fn(&Value) -> String + Send + Sync>;
type FallibleTextHook = Arc<dyn Fn(&str) -> Result<String, String> + Send + Sync>;
type ValueHook = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Runtime functions a compiled tag can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeFn {
    Translate,
    TranslateContext,
    BlockTranslate,
    ResolveName,
    AssetPath,
    CsrfToken,
    Now,
}

impl RuntimeFn {
    pub fn name(self) -> &'static str {
        match self {
            RuntimeFn::Translate => "translate",
            RuntimeFn::TranslateContext => "translate_ctx",
            RuntimeFn::BlockTranslate => "block_translate",
            RuntimeFn::ResolveName => "resolve_name",
            RuntimeFn::AssetPath => "asset_path",
            RuntimeFn::CsrfToken => "render_token_field",
            RuntimeFn::Now => "format_now",
        }
    }
}

impl fmt::Display for RuntimeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The injected runtime-support functions
#[derive(Clone)]
pub struct Runtime {
    translate: TextHook,
    translate_ctx: ContextHook,
    translate_plural: PluralHook,
    translate_plural_ctx: PluralContextHook,
    resolve_name: ResolveHook,
    resolve_name_kw: ResolveKwHook,
    asset_path: TextHook,
    render_token_field: TokenFieldHook,
    format_now: FallibleTextHook,
    localize: ValueHook,
    localtime: ValueHook,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn builder(settings: &Settings) -> RuntimeBuilder {
        RuntimeBuilder::new(settings)
    }

    /// A runtime with every hook at its default
    pub fn with_defaults(settings: &Settings) -> Self {
        RuntimeBuilder::new(settings).build()
    }

    pub fn translate(&self, message: &str) -> String {
        (self.translate)(message)
    }

    pub fn translate_ctx(&self, context: &str, message: &str) -> String {
        (self.translate_ctx)(context, message)
    }

    pub fn translate_plural(&self, singular: &str, plural: &str, count: i64) -> String {
        (self.translate_plural)(singular, plural, count)
    }

    pub fn translate_plural_ctx(
        &self,
        context: &str,
        singular: &str,
        plural: &str,
        count: i64,
    ) -> String {
        (self.translate_plural_ctx)(context, singular, plural, count)
    }

    pub fn resolve_name(&self, name: &str, args: &[Value]) -> TemplateResult<String> {
        (self.resolve_name)(name, args).map_err(TemplateError::render)
    }

    pub fn resolve_name_kw(&self, name: &str, kwargs: &Map<String, Value>) -> TemplateResult<String> {
        (self.resolve_name_kw)(name, kwargs).map_err(TemplateError::render)
    }

    pub fn asset_path(&self, path: &str) -> String {
        (self.asset_path)(path)
    }

    pub fn render_token_field(&self, token: &Value) -> String {
        (self.render_token_field)(token)
    }

    pub fn format_now(&self, format: &str) -> TemplateResult<String> {
        (self.format_now)(format).map_err(TemplateError::render)
    }

    pub fn localize(&self, value: Value) -> Value {
        (self.localize)(value)
    }

    pub fn localtime(&self, value: Value) -> Value {
        (self.localtime)(value)
    }
}

/// Builder replacing individual hooks of the default runtime
pub struct RuntimeBuilder {
    runtime: Runtime,
}

impl RuntimeBuilder {
    fn new(settings: &Settings) -> Self {
        let static_url = settings.assets.static_url.clone();
        let field_name = settings.csrf.field_name.clone();
        let use_tz = settings.l10n.use_tz;

        RuntimeBuilder {
            runtime: Runtime {
                translate: Arc::new(|message: &str| message.to_string()),
                translate_ctx: Arc::new(|_context: &str, message: &str| message.to_string()),
                translate_plural: Arc::new(choose_plural),
                translate_plural_ctx: Arc::new(
                    |_context: &str, singular: &str, plural: &str, count: i64| {
                        choose_plural(singular, plural, count)
                    },
                ),
                resolve_name: Arc::new(|name: &str, _args: &[Value]| Err(no_resolver(name))),
                resolve_name_kw: Arc::new(|name: &str, _kwargs: &Map<String, Value>| {
                    Err(no_resolver(name))
                }),
                asset_path: Arc::new(move |path: &str| join_url(&static_url, path)),
                render_token_field: Arc::new(move |token: &Value| {
                    csrf_input(&field_name, token)
                }),
                format_now: Arc::new(move |format: &str| now(format, use_tz)),
                localize: Arc::new(|value: Value| value),
                localtime: Arc::new(|value: Value| value),
            },
        }
    }

    pub fn translate(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.runtime.translate = Arc::new(f);
        self
    }

    pub fn translate_ctx(
        mut self,
        f: impl Fn(&str, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.runtime.translate_ctx = Arc::new(f);
        self
    }

    pub fn translate_plural(
        mut self,
        f: impl Fn(&str, &str, i64) -> String + Send + Sync + 'static,
    ) -> Self {
        self.runtime.translate_plural = Arc::new(f);
        self
    }

    pub fn translate_plural_ctx(
        mut self,
        f: impl Fn(&str, &str, &str, i64) -> String + Send + Sync + 'static,
    ) -> Self {
        self.runtime.translate_plural_ctx = Arc::new(f);
        self
    }

    pub fn resolve_name(
        mut self,
        f: impl Fn(&str, &[Value]) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.runtime.resolve_name = Arc::new(f);
        self
    }

    pub fn resolve_name_kw(
        mut self,
        f: impl Fn(&str, &Map<String, Value>) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.runtime.resolve_name_kw = Arc::new(f);
        self
    }

    pub fn asset_path(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.runtime.asset_path = Arc::new(f);
        self
    }

    pub fn render_token_field(
        mut self,
        f: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> Self {
        self.runtime.render_token_field = Arc::new(f);
        self
    }

    pub fn format_now(
        mut self,
        f: impl Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.runtime.format_now = Arc::new(f);
        self
    }

    pub fn localize(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.runtime.localize = Arc::new(f);
        self
    }

    pub fn localtime(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.runtime.localtime = Arc::new(f);
        self
    }

    pub fn build(self) -> Runtime {
        self.runtime
    }
}

fn choose_plural(singular: &str, plural: &str, count: i64) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}

fn no_resolver(name: &str) -> String {
    format!("no URL resolver configured, cannot resolve '{}'", name)
}

fn join_url(prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn csrf_input(field_name: &str, token: &Value) -> String {
    match token {
        Value::String(token) if !token.is_empty() && token != "NOTPROVIDED" => format!(
            "<input type=\"hidden\" name=\"{}\" value=\"{}\" />",
            field_name, token
        ),
        _ => String::new(),
    }
}

fn now(format: &str, use_tz: bool) -> Result<String, String> {
    let mut out = String::new();
    let written = if use_tz {
        write!(out, "{}", Utc::now().format(format))
    } else {
        write!(out, "{}", Local::now().format(format))
    };
    written
        .map(|_| out)
        .map_err(|_| format!("invalid time format '{}'", format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_translation_is_identity() {
        let runtime = Runtime::with_defaults(&Settings::default());
        assert_eq!(runtime.translate("Hello"), "Hello");
        assert_eq!(runtime.translate_ctx("menu", "File"), "File");
        assert_eq!(runtime.translate_plural("one item", "items", 1), "one item");
        assert_eq!(runtime.translate_plural("one item", "items", 0), "items");
        assert_eq!(
            runtime.translate_plural_ctx("cart", "one item", "items", 3),
            "items"
        );
    }

    #[test]
    fn test_default_resolver_fails() {
        let runtime = Runtime::with_defaults(&Settings::default());
        let err = runtime.resolve_name("home", &[]).unwrap_err();
        assert!(err.message().contains("cannot resolve 'home'"));
        assert!(runtime.resolve_name_kw("home", &Map::new()).is_err());
    }

    #[test]
    fn test_default_asset_path_joins_static_url() {
        let runtime = Runtime::with_defaults(&Settings::default());
        assert_eq!(runtime.asset_path("css/site.css"), "/static/css/site.css");
        assert_eq!(runtime.asset_path("/img/a.png"), "/static/img/a.png");
    }

    #[test]
    fn test_default_token_field() {
        let runtime = Runtime::with_defaults(&Settings::default());
        assert_eq!(
            runtime.render_token_field(&json!("a_csrf_token")),
            "<input type=\"hidden\" name=\"csrfmiddlewaretoken\" value=\"a_csrf_token\" />"
        );
        assert_eq!(runtime.render_token_field(&json!("NOTPROVIDED")), "");
        assert_eq!(runtime.render_token_field(&Value::Null), "");
    }

    #[test]
    fn test_default_format_now() {
        let runtime = Runtime::with_defaults(&Settings::default());
        let year = runtime.format_now("%Y").unwrap();
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_builder_replaces_single_hook() {
        let runtime = Runtime::builder(&Settings::default())
            .translate(|message: &str| format!("{} - translated", message))
            .build();
        assert_eq!(runtime.translate("Hi"), "Hi - translated");
        assert_eq!(runtime.translate_ctx("c", "Hi"), "Hi");
    }
}
