//! `{% url %}`: positional and keyword arguments, capture, and the mixing rule

use rstest::rstest;
use serde_json::{json, Map, Value};
use tagext::tagext::config::Settings;
use tagext::tagext::extensions::Url;
use tagext::tagext::testing::{RuntimeCall, StubRuntime};
use tagext::Environment;

fn url_env(stub: &StubRuntime) -> Environment {
    let settings = Settings::default();
    Environment::builder(settings.clone(), stub.runtime(&settings))
        .extension(Url)
        .build()
        .unwrap()
}

fn kwargs(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn test_simple() {
    let stub = StubRuntime::new();
    let rendered = url_env(&stub)
        .from_string("{% url 'my_view' %}")
        .unwrap()
        .render(&json!({}))
        .unwrap();
    assert_eq!(rendered, "Url for: my_view");
    assert_eq!(
        stub.last(),
        Some(RuntimeCall::ResolveName {
            name: "my_view".to_string(),
            args: vec![],
        })
    );
}

#[rstest]
#[case("{% url 'my_view' 'foo' 'bar' %}")]
#[case("{% url 'my_view' arg1 'bar' %}")]
#[case("{% url 'my_view' arg1 arg2 %}")]
fn test_positional(#[case] source: &str) {
    let stub = StubRuntime::new();
    let rendered = url_env(&stub)
        .from_string(source)
        .unwrap()
        .render(&json!({"arg1": "foo", "arg2": "bar"}))
        .unwrap();
    assert_eq!(rendered, "Url for: my_view");
    assert_eq!(
        stub.last(),
        Some(RuntimeCall::ResolveName {
            name: "my_view".to_string(),
            args: vec![json!("foo"), json!("bar")],
        })
    );
}

#[rstest]
#[case("{% url 'my_view' kw1='foo' kw2='bar' %}")]
#[case("{% url 'my_view' kw1=arg1 kw2='bar' %}")]
#[case("{% url 'my_view' kw1=arg1 kw2=arg2 %}")]
fn test_keyword(#[case] source: &str) {
    let stub = StubRuntime::new();
    let rendered = url_env(&stub)
        .from_string(source)
        .unwrap()
        .render(&json!({"arg1": "foo", "arg2": "bar"}))
        .unwrap();
    assert_eq!(rendered, "Url for: my_view");
    assert_eq!(
        stub.last(),
        Some(RuntimeCall::ResolveNameKw {
            name: "my_view".to_string(),
            kwargs: kwargs(json!({"kw1": "foo", "kw2": "bar"})),
        })
    );
}

#[test]
fn test_dotted_expressions() {
    let stub = StubRuntime::new();
    let env = url_env(&stub);
    let context = json!({"foo": {"bar": "argument"}});

    env.from_string("{% url 'my_view' foo.bar %}")
        .unwrap()
        .render(&context)
        .unwrap();
    assert_eq!(
        stub.last(),
        Some(RuntimeCall::ResolveName {
            name: "my_view".to_string(),
            args: vec![json!("argument")],
        })
    );

    env.from_string("{% url 'my_view' kw1=foo.bar %}")
        .unwrap()
        .render(&context)
        .unwrap();
    assert_eq!(
        stub.last(),
        Some(RuntimeCall::ResolveNameKw {
            name: "my_view".to_string(),
            kwargs: kwargs(json!({"kw1": "argument"})),
        })
    );
}

#[rstest]
#[case("{% url 'my_view' as my_url %}Url: {{ my_url }}")]
#[case("{% url 'my_view' arg1 'bar' as my_url %}Url: {{ my_url }}")]
#[case("{% url 'my_view' kw1=arg1 kw2='bar' as my_url %}Url: {{ my_url }}")]
fn test_as_var(#[case] source: &str) {
    let stub = StubRuntime::new();
    let rendered = url_env(&stub)
        .from_string(source)
        .unwrap()
        .render(&json!({"arg1": "foo"}))
        .unwrap();
    assert_eq!(rendered, "Url: Url for: my_view");
}

#[rstest]
#[case(
    "{% url 'my_view' kw1='foo' 123 %}",
    "got 'integer', expected name for keyword argument"
)]
#[case(
    "{% url 'my_view' 'foo' kw=bar %}",
    "got 'kw=' after positional arguments, expected name for keyword argument"
)]
#[case(
    "{% url 'my_view' kw1='foo' kw2 'bar' %}",
    "expected token '=', got 'string'"
)]
#[case("{% url %}", "expected token 'string', got 'end of statement block'")]
fn test_errors(#[case] source: &str, #[case] message: &str) {
    let stub = StubRuntime::new();
    let err = url_env(&stub).from_string(source).unwrap_err();
    assert!(err.is_syntax());
    assert_eq!(err.message(), message);
}

#[test]
fn test_default_runtime_has_no_resolver() {
    let settings = Settings::default();
    let env = Environment::standard(
        settings.clone(),
        tagext::tagext::runtime::Runtime::with_defaults(&settings),
    )
    .unwrap();
    let err = env
        .from_string("{% url 'home' %}")
        .unwrap()
        .render(&json!({}))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Render error: no URL resolver configured, cannot resolve 'home'"
    );
}
