//! Finalizer installation by the localization extension

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tagext::tagext::config::{Loader, Settings};
use tagext::tagext::extensions::{I18n, L10n};
use tagext::tagext::finalize::Finalizer;
use tagext::tagext::host::render::to_text;
use tagext::tagext::runtime::Runtime;
use tagext::Environment;

fn localizing_runtime(settings: &Settings) -> Runtime {
    Runtime::builder(settings)
        .localize(|value| json!(format!("{} - localized", to_text(&value))))
        .localtime(|value| json!(format!("{} - localtime", to_text(&value))))
        .build()
}

fn settings(overrides: &[(&str, bool)]) -> Settings {
    let mut loader = Loader::new();
    for (key, value) in overrides {
        loader = loader.set_override(key, *value).unwrap();
    }
    loader.build().unwrap()
}

#[test]
fn test_localize() {
    let settings = settings(&[("l10n.use_l10n", true)]);
    let env = Environment::builder(settings.clone(), localizing_runtime(&settings))
        .extension(L10n)
        .build()
        .unwrap();
    let rendered = env
        .from_string("{{ foo }}")
        .unwrap()
        .render(&json!({"foo": "foovar"}))
        .unwrap();
    assert_eq!(rendered, "foovar - localized");
}

#[test]
fn test_existing_finalizer_runs_first() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let recorder = Arc::clone(&seen);
    let settings = settings(&[("l10n.use_l10n", true)]);
    let env = Environment::builder(settings.clone(), localizing_runtime(&settings))
        .finalize(Finalizer::new(move |value| {
            if let Ok(mut seen) = recorder.lock() {
                seen.push(value.clone());
            }
            value
        }))
        .extension(L10n)
        .build()
        .unwrap();
    let rendered = env
        .from_string("{{ foo }}")
        .unwrap()
        .render(&json!({"foo": "foovar"}))
        .unwrap();
    assert_eq!(rendered, "foovar - localized");
    assert_eq!(*seen.lock().unwrap(), vec![json!("foovar")]);
}

#[test]
fn test_use_tz_and_l10n_compose_in_order() {
    let settings = settings(&[("l10n.use_tz", true), ("l10n.use_l10n", true)]);
    let env = Environment::builder(settings.clone(), localizing_runtime(&settings))
        .finalize(Finalizer::new(|value| json!(format!("{} - host", to_text(&value)))))
        .extension(L10n)
        .build()
        .unwrap();
    let rendered = env
        .from_string("a {{ foo }} b")
        .unwrap()
        .render(&json!({"foo": 1.23}))
        .unwrap();
    insta::assert_snapshot!(rendered, @"a 1.23 - host - localtime - localized b");
}

#[test]
fn test_blocktrans_bindings_are_localized() {
    let settings = settings(&[("l10n.use_l10n", true)]);
    let env = Environment::builder(settings.clone(), localizing_runtime(&settings))
        .extension(I18n)
        .extension(L10n)
        .build()
        .unwrap();
    let rendered = env
        .from_string("{% blocktrans asvar msg %}Price: {{ price }}{% endblocktrans %}[{{ msg }}]")
        .unwrap()
        .render(&json!({"price": 5}))
        .unwrap();
    assert_eq!(rendered, "[Price: 5 - localized - localized]");
}

#[test]
fn test_disabled_by_default() {
    let settings = Settings::default();
    let env = Environment::builder(settings.clone(), localizing_runtime(&settings))
        .extension(L10n)
        .build()
        .unwrap();
    let rendered = env
        .from_string("{{ foo }}")
        .unwrap()
        .render(&json!({"foo": "foovar"}))
        .unwrap();
    assert_eq!(rendered, "foovar");
}
