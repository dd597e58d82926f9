//! `{% static "path" [as name] %}`

use super::capture;
use super::Extension;
use crate::tagext::error::TemplateResult;
use crate::tagext::host::ast::Node;
use crate::tagext::host::parser::Parser;
use crate::tagext::runtime::RuntimeFn;

/// Resolves a static asset path through the runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAsset;

impl Extension for StaticAsset {
    fn name(&self) -> &str {
        "static"
    }

    fn tags(&self) -> &[&'static str] {
        &["static"]
    }

    fn parse(&self, parser: &mut Parser<'_>) -> TemplateResult<Node> {
        capture::literal_call(parser, RuntimeFn::AssetPath)
    }
}
