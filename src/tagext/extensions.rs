//! Tag grammars
//!
//! An [`Extension`] owns a set of tag names. When the host parser meets `{% name ...`
//! and `name` belongs to an extension, it hands the parser over with the stream still on
//! the tag name; the extension consumes tokens up to (not including) the closing `%}` and
//! returns a host AST node.
//!
//!     csrf      {% csrf_token %}
//!     i18n      {% trans %}, {% blocktrans %} ... {% endblocktrans %}
//!     l10n      no tags, installs the localization finalizer
//!     now       {% now "fmt" [as name] %}
//!     assets    {% static "path" [as name] %}
//!     url       {% url "name" args... | kw=val... [as name] %}
//!     compat    all of the above behind one dispatcher
//!
//! Extensions may also hook into environment construction through
//! [`Extension::install`] to add globals or finalizers.

pub mod assets;
pub mod capture;
pub mod compat;
pub mod csrf;
pub mod dispatch;
pub mod i18n;
pub mod l10n;
pub mod now;
pub mod url;

pub use assets::StaticAsset;
pub use compat::Compat;
pub use csrf::CsrfToken;
pub use dispatch::TagTable;
pub use i18n::I18n;
pub use l10n::L10n;
pub use now::Now;
pub use url::Url;

use crate::tagext::environment::EnvironmentBuilder;
use crate::tagext::error::{TemplateError, TemplateResult};
use crate::tagext::host::ast::Node;
use crate::tagext::host::parser::Parser;

/// A tag grammar plugged into the host parser
pub trait Extension: Send + Sync {
    /// Name used in logs and configuration errors
    fn name(&self) -> &str;

    /// Tag names this extension parses
    fn tags(&self) -> &[&'static str] {
        &[]
    }

    /// Parse one tag. The stream is positioned on the tag name.
    fn parse(&self, parser: &mut Parser<'_>) -> TemplateResult<Node> {
        let token = parser.stream().current();
        Err(TemplateError::syntax(
            format!("got unexpected tag '{}'", token.value),
            token.line,
        ))
    }

    /// Called once while the environment is being built
    fn install(&self, _env: &mut EnvironmentBuilder) {}
}
