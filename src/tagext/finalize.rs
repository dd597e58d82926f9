//! Output finalizer composition
//!
//! A finalizer transforms every value right before it is written to the output. Several
//! parties may want one (the host, the localization extension), so installing a new
//! transform wraps whatever is already installed: `new(old(value))`. The pre-existing
//! finalizer stays the innermost call and the last installer sees values already processed
//! by everyone before it.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Finalizer(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl Finalizer {
    pub fn new(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Finalizer(Arc::new(f))
    }

    pub fn apply(&self, value: Value) -> Value {
        (self.0)(value)
    }

    /// `v -> outer(inner(v))`
    pub fn compose(outer: Finalizer, inner: Finalizer) -> Finalizer {
        Finalizer::new(move |value| outer.apply(inner.apply(value)))
    }

    /// Install `added` around the current finalizer, if any
    pub fn install(current: Option<Finalizer>, added: Finalizer) -> Finalizer {
        match current {
            Some(existing) => Finalizer::compose(added, existing),
            None => added,
        }
    }
}

impl fmt::Debug for Finalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Finalizer(..)")
    }
}
