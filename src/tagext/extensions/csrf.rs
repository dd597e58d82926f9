//! `{% csrf_token %}`

use super::Extension;
use crate::tagext::error::TemplateResult;
use crate::tagext::host::ast::{Expr, Node};
use crate::tagext::host::parser::Parser;
use crate::tagext::runtime::RuntimeFn;

/// Renders the hidden form field carrying the `csrf_token` context value
#[derive(Debug, Clone, Copy, Default)]
pub struct CsrfToken;

impl Extension for CsrfToken {
    fn name(&self) -> &str {
        "csrf"
    }

    fn tags(&self) -> &[&'static str] {
        &["csrf_token"]
    }

    fn parse(&self, parser: &mut Parser<'_>) -> TemplateResult<Node> {
        parser.stream_mut().next_token();
        let field = Expr::runtime(RuntimeFn::CsrfToken, vec![Expr::name("csrf_token")]);
        Ok(Node::output(Expr::mark_safe(field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagext::config::Settings;
    use crate::tagext::environment::Environment;
    use crate::tagext::runtime::Runtime;
    use serde_json::json;

    fn env() -> Environment {
        let settings = Settings::default();
        Environment::builder(settings.clone(), Runtime::with_defaults(&settings))
            .extension(CsrfToken)
            .build()
            .unwrap()
    }

    #[test]
    fn test_emits_safe_output() {
        let nodes = env().parse("{% csrf_token %}").unwrap();
        assert_eq!(
            nodes,
            vec![Node::output(Expr::mark_safe(Expr::runtime(
                RuntimeFn::CsrfToken,
                vec![Expr::name("csrf_token")]
            )))]
        );
    }

    #[test]
    fn test_renders_hidden_input() {
        let env = env();
        let template = env.from_string("{% csrf_token %}").unwrap();
        assert_eq!(
            template.render(&json!({"csrf_token": "abc"})).unwrap(),
            r#"<input type="hidden" name="csrfmiddlewaretoken" value="abc" />"#
        );
        assert_eq!(template.render(&json!({})).unwrap(), "");
    }

    #[test]
    fn test_takes_no_arguments() {
        assert!(env().parse("{% csrf_token 'x' %}").unwrap_err().is_syntax());
    }
}
