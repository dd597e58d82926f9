//! `{% now "format" [as name] %}`

use super::capture;
use super::Extension;
use crate::tagext::error::TemplateResult;
use crate::tagext::host::ast::Node;
use crate::tagext::host::parser::Parser;
use crate::tagext::runtime::RuntimeFn;

/// Formats the current time with a strftime-style format string
#[derive(Debug, Clone, Copy, Default)]
pub struct Now;

impl Extension for Now {
    fn name(&self) -> &str {
        "now"
    }

    fn tags(&self) -> &[&'static str] {
        &["now"]
    }

    fn parse(&self, parser: &mut Parser<'_>) -> TemplateResult<Node> {
        capture::literal_call(parser, RuntimeFn::Now)
    }
}
