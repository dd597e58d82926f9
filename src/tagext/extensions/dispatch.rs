//! Tag name ownership
//!
//! A [`TagTable`] maps every tag name to the index of the extension that owns it. It is
//! built once, when extensions are assembled into an environment or a composite, and is
//! read-only afterwards. Two extensions claiming the same name is a configuration error
//! raised at build time, before any template is parsed.

use super::Extension;
use crate::tagext::error::{TemplateError, TemplateResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TagTable {
    owners: HashMap<&'static str, usize>,
    names: Vec<&'static str>,
}

impl TagTable {
    pub fn build(members: &[Box<dyn Extension>]) -> TemplateResult<Self> {
        let mut table = TagTable::default();
        for (index, member) in members.iter().enumerate() {
            for &tag in member.tags() {
                if let Some(&owner) = table.owners.get(tag) {
                    return Err(TemplateError::config(
                        format!(
                            "tag '{}' is claimed by both '{}' and '{}'",
                            tag,
                            members[owner].name(),
                            member.name()
                        ),
                        None,
                    ));
                }
                tracing::trace!(tag, extension = member.name(), "registered tag");
                table.owners.insert(tag, index);
                table.names.push(tag);
            }
        }
        Ok(table)
    }

    /// Index of the member owning `tag`
    pub fn owner(&self, tag: &str) -> Option<usize> {
        self.owners.get(tag).copied()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.owners.contains_key(tag)
    }

    /// All tag names, in registration order
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}
