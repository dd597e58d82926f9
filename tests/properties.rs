//! Property tests for body trimming, placeholder substitution and tag parsing

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use tagext::tagext::extensions::i18n::{interpolate, trim_body};
use tagext::tagext::testing::{RuntimeCall, StubRuntime};

/// Words without whitespace or template syntax
fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9.,!?]{1,8}"
}

/// Whitespace that never contains a newline
fn blanks() -> impl Strategy<Value = String> {
    "[ \t]{0,4}"
}

proptest! {
    #[test]
    fn trimmed_lines_join_with_single_spaces(
        lines in prop::collection::vec((blanks(), word(), blanks()), 1..6),
        lead in "[ \t\n]{0,4}",
        tail in "[ \t\n]{0,4}",
    ) {
        let body = lines
            .iter()
            .map(|(before, word, after)| format!("{}{}{}", before, word, after))
            .collect::<Vec<_>>()
            .join("\n");
        let words: Vec<&str> = lines.iter().map(|(_, word, _)| word.as_str()).collect();
        let text = format!("{}{}{}", lead, body, tail);
        prop_assert_eq!(trim_body(&text), words.join(" "));
    }

    #[test]
    fn text_without_percent_is_unchanged(text in "[^%]{0,40}") {
        prop_assert_eq!(interpolate(&text, &Map::new()).unwrap(), text);
    }

    #[test]
    fn placeholders_take_binding_values(
        name in "[a-z_]{1,8}",
        value in "[a-zA-Z0-9 ]{0,12}",
        prefix in "[a-zA-Z ]{0,10}",
    ) {
        let mut vars = Map::new();
        vars.insert(name.clone(), Value::String(value.clone()));
        let text = format!("{}%({})s", prefix, name);
        prop_assert_eq!(interpolate(&text, &vars).unwrap(), format!("{}{}", prefix, value));
    }

    #[test]
    fn trans_modifier_order_does_not_matter(message in "[a-zA-Z ]{1,16}") {
        let stub = StubRuntime::new();
        let env = stub.environment().unwrap();
        let a = env
            .parse(&format!("{{% trans '{}' noop as v %}}", message))
            .unwrap();
        let b = env
            .parse(&format!("{{% trans '{}' as v noop %}}", message))
            .unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn url_literals_stay_distinct(args in prop::collection::vec("[a-z]{1,6}", 0..5)) {
        let stub = StubRuntime::new();
        let env = stub.environment().unwrap();
        let quoted = args
            .iter()
            .map(|arg| format!("'{}'", arg))
            .collect::<Vec<_>>()
            .join(" ");
        env.from_string(&format!("{{% url 'v' {} %}}", quoted))
            .unwrap()
            .render(&json!({}))
            .unwrap();
        let expected: Vec<Value> = args.iter().map(|arg| json!(arg)).collect();
        prop_assert_eq!(
            stub.last(),
            Some(RuntimeCall::ResolveName { name: "v".to_string(), args: expected })
        );
    }
}
