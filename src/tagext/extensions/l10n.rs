//! Localization of every rendered value
//!
//! Owns no tags. On install it wraps the current finalizer with `localtime` when
//! `l10n.use_tz` is set, then with `localize` when `l10n.use_l10n` is set, so a host
//! finalizer installed earlier still runs first.

use super::Extension;
use crate::tagext::environment::EnvironmentBuilder;
use crate::tagext::finalize::Finalizer;

#[derive(Debug, Clone, Copy, Default)]
pub struct L10n;

impl Extension for L10n {
    fn name(&self) -> &str {
        "l10n"
    }

    fn install(&self, env: &mut EnvironmentBuilder) {
        let settings = env.settings().l10n.clone();
        if settings.use_tz {
            let runtime = env.runtime().clone();
            env.add_finalizer(Finalizer::new(move |value| runtime.localtime(value)));
        }
        if settings.use_l10n {
            let runtime = env.runtime().clone();
            env.add_finalizer(Finalizer::new(move |value| runtime.localize(value)));
        }
    }
}
