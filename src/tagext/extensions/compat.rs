//! Several grammars registered as one extension
//!
//! [`Compat`] holds its members in order together with a [`TagTable`] built from them.
//! Overlapping tag names are rejected when the composite is constructed. Parsing routes on
//! the tag name under the cursor and leaves the cursor untouched, so each member parses
//! exactly as it would when registered on its own.

use super::dispatch::TagTable;
use super::{CsrfToken, Extension, I18n, L10n, Now, StaticAsset, Url};
use crate::tagext::environment::EnvironmentBuilder;
use crate::tagext::error::{TemplateError, TemplateResult};
use crate::tagext::host::ast::Node;
use crate::tagext::host::parser::Parser;

pub struct Compat {
    members: Vec<Box<dyn Extension>>,
    table: TagTable,
}

impl Compat {
    pub fn new(members: Vec<Box<dyn Extension>>) -> TemplateResult<Self> {
        let table = TagTable::build(&members)?;
        Ok(Compat { members, table })
    }

    /// Every bundled extension
    pub fn standard() -> TemplateResult<Self> {
        let members: Vec<Box<dyn Extension>> = vec![
            Box::new(CsrfToken) as Box<dyn Extension>,
            Box::new(I18n) as Box<dyn Extension>,
            Box::new(L10n) as Box<dyn Extension>,
            Box::new(Now) as Box<dyn Extension>,
            Box::new(StaticAsset) as Box<dyn Extension>,
            Box::new(Url) as Box<dyn Extension>,
        ];
        Compat::new(members)
    }

    fn members(&self) -> impl Iterator<Item = &dyn Extension> {
        self.members.iter().map(|member| member.as_ref())
    }
}

impl std::fmt::Debug for Compat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compat")
            .field("members", &self.members().map(|m| m.name()).collect::<Vec<_>>())
            .field("tags", &self.table.names())
            .finish()
    }
}

impl Extension for Compat {
    fn name(&self) -> &str {
        "compat"
    }

    fn tags(&self) -> &[&'static str] {
        self.table.names()
    }

    fn parse(&self, parser: &mut Parser<'_>) -> TemplateResult<Node> {
        let token = parser.stream().current();
        match self.table.owner(&token.value) {
            Some(index) => {
                let member = &self.members[index];
                tracing::trace!(tag = %token.value, member = member.name(), "compat dispatch");
                member.parse(parser)
            }
            None => Err(TemplateError::syntax(
                format!("got unexpected tag '{}'", token.value),
                token.line,
            )),
        }
    }

    fn install(&self, env: &mut EnvironmentBuilder) {
        for member in &self.members {
            member.install(env);
        }
    }
}
