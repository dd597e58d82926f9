//! Test support: a runtime that records every call it receives
//!
//! Outputs are deterministic and easy to assert on:
//!
//!     translate            "{msg} - translated"
//!     translate_ctx        "{msg} - alt translated"
//!     translate_plural*    singular or plural (count == 1), same suffixes
//!     resolve_name*        "Url for: {name}"
//!     asset_path           "Static: {path}"
//!     format_now           "now:{fmt}"

use crate::tagext::config::Settings;
use crate::tagext::environment::Environment;
use crate::tagext::error::TemplateResult;
use crate::tagext::runtime::Runtime;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

/// One recorded runtime call
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCall {
    Translate(String),
    TranslateCtx {
        context: String,
        message: String,
    },
    TranslatePlural {
        singular: String,
        plural: String,
        count: i64,
    },
    TranslatePluralCtx {
        context: String,
        singular: String,
        plural: String,
        count: i64,
    },
    ResolveName {
        name: String,
        args: Vec<Value>,
    },
    ResolveNameKw {
        name: String,
        kwargs: Map<String, Value>,
    },
    AssetPath(String),
    FormatNow(String),
}

#[derive(Debug, Clone, Default)]
pub struct StubRuntime {
    calls: Arc<Mutex<Vec<RuntimeCall>>>,
}

impl StubRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runtime whose hooks record into this stub
    pub fn runtime(&self, settings: &Settings) -> Runtime {
        let translate = self.recorder();
        let translate_ctx = self.recorder();
        let plural = self.recorder();
        let plural_ctx = self.recorder();
        let resolve = self.recorder();
        let resolve_kw = self.recorder();
        let asset = self.recorder();
        let now = self.recorder();

        Runtime::builder(settings)
            .translate(move |message: &str| {
                translate(RuntimeCall::Translate(message.to_string()));
                format!("{} - translated", message)
            })
            .translate_ctx(move |context: &str, message: &str| {
                translate_ctx(RuntimeCall::TranslateCtx {
                    context: context.to_string(),
                    message: message.to_string(),
                });
                format!("{} - alt translated", message)
            })
            .translate_plural(move |singular: &str, plural_form: &str, count: i64| {
                plural(RuntimeCall::TranslatePlural {
                    singular: singular.to_string(),
                    plural: plural_form.to_string(),
                    count,
                });
                format!("{} - translated", pick(singular, plural_form, count))
            })
            .translate_plural_ctx(
                move |context: &str, singular: &str, plural_form: &str, count: i64| {
                    plural_ctx(RuntimeCall::TranslatePluralCtx {
                        context: context.to_string(),
                        singular: singular.to_string(),
                        plural: plural_form.to_string(),
                        count,
                    });
                    format!("{} - alt translated", pick(singular, plural_form, count))
                },
            )
            .resolve_name(move |name: &str, args: &[Value]| {
                resolve(RuntimeCall::ResolveName {
                    name: name.to_string(),
                    args: args.to_vec(),
                });
                Ok(format!("Url for: {}", name))
            })
            .resolve_name_kw(move |name: &str, kwargs: &Map<String, Value>| {
                resolve_kw(RuntimeCall::ResolveNameKw {
                    name: name.to_string(),
                    kwargs: kwargs.clone(),
                });
                Ok(format!("Url for: {}", name))
            })
            .asset_path(move |path: &str| {
                asset(RuntimeCall::AssetPath(path.to_string()));
                format!("Static: {}", path)
            })
            .format_now(move |format: &str| {
                now(RuntimeCall::FormatNow(format.to_string()));
                Ok(format!("now:{}", format))
            })
            .build()
    }

    /// Standard environment (every bundled extension) over the recording runtime
    pub fn environment(&self) -> TemplateResult<Environment> {
        let settings = Settings::default();
        let runtime = self.runtime(&settings);
        Environment::standard(settings, runtime)
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<RuntimeCall> {
        self.calls().pop()
    }

    fn recorder(&self) -> impl Fn(RuntimeCall) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |call| {
            if let Ok(mut calls) = calls.lock() {
                calls.push(call);
            }
        }
    }
}

fn pick<'a>(singular: &'a str, plural: &'a str, count: i64) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}
