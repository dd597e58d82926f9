//! Template environment
//!
//! The environment is assembled once at startup and is read-only afterwards: settings,
//! the injected [`Runtime`], the extensions with their tag table, globals, and the
//! finalizer chain. Extensions are installed in the order they are added, which is also
//! the order their finalizers wrap each other.
//!
//! ```ignore
//! let env = Environment::builder(settings.clone(), Runtime::with_defaults(&settings))
//!     .extension(I18n)
//!     .extension(Url)
//!     .build()?;
//! let html = env.from_string("{% trans 'Hello' %}")?.render(&json!({}))?;
//! ```

use crate::tagext::config::Settings;
use crate::tagext::error::TemplateResult;
use crate::tagext::extensions::{Compat, Extension, TagTable};
use crate::tagext::finalize::Finalizer;
use crate::tagext::host::ast::Node;
use crate::tagext::host::parser::Parser;
use crate::tagext::host::render::Renderer;
use crate::tagext::runtime::Runtime;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A global function callable from template expressions, given positional and keyword arguments
pub type GlobalFn =
    Arc<dyn Fn(&[Value], &Map<String, Value>) -> TemplateResult<Value> + Send + Sync>;

pub struct Environment {
    settings: Settings,
    runtime: Runtime,
    extensions: Vec<Box<dyn Extension>>,
    tags: TagTable,
    finalize: Option<Finalizer>,
    globals: HashMap<String, GlobalFn>,
}

impl Environment {
    pub fn builder(settings: Settings, runtime: Runtime) -> EnvironmentBuilder {
        EnvironmentBuilder {
            settings,
            runtime,
            extensions: Vec::new(),
            finalize: None,
            globals: HashMap::new(),
        }
    }

    /// Environment with every bundled extension behind the [`Compat`] dispatcher
    pub fn standard(settings: Settings, runtime: Runtime) -> TemplateResult<Self> {
        Self::builder(settings, runtime)
            .extension(Compat::standard()?)
            .build()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// The extension owning `tag`, if any
    pub fn extension_for(&self, tag: &str) -> Option<&dyn Extension> {
        self.tags
            .owner(tag)
            .map(|index| self.extensions[index].as_ref())
    }

    /// Every registered tag name
    pub fn tags(&self) -> &[&'static str] {
        self.tags.names()
    }

    pub fn global(&self, name: &str) -> Option<&GlobalFn> {
        self.globals.get(name)
    }

    /// Run a value through the installed finalizer chain
    pub fn finalize_value(&self, value: Value) -> Value {
        match &self.finalize {
            Some(finalizer) => finalizer.apply(value),
            None => value,
        }
    }

    /// Compile template source into host AST
    pub fn parse(&self, source: &str) -> TemplateResult<Vec<Node>> {
        Parser::new(self, source)?.parse()
    }

    pub fn from_string(&self, source: &str) -> TemplateResult<Template<'_>> {
        Ok(Template {
            env: self,
            nodes: self.parse(source)?,
        })
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("settings", &self.settings)
            .field("tags", &self.tags.names())
            .field("finalize", &self.finalize)
            .finish_non_exhaustive()
    }
}

/// Builder collecting extensions, globals and finalizers
pub struct EnvironmentBuilder {
    settings: Settings,
    runtime: Runtime,
    extensions: Vec<Box<dyn Extension>>,
    finalize: Option<Finalizer>,
    globals: HashMap<String, GlobalFn>,
}

impl EnvironmentBuilder {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Install a finalizer around whatever is installed so far
    pub fn finalize(mut self, finalizer: Finalizer) -> Self {
        self.add_finalizer(finalizer);
        self
    }

    pub fn add_finalizer(&mut self, finalizer: Finalizer) {
        tracing::debug!("installing finalizer");
        self.finalize = Some(Finalizer::install(self.finalize.take(), finalizer));
    }

    pub fn global(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&[Value], &Map<String, Value>) -> TemplateResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.add_global(name, f);
        self
    }

    pub fn add_global(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&[Value], &Map<String, Value>) -> TemplateResult<Value> + Send + Sync + 'static,
    ) {
        self.globals.insert(name.into(), Arc::new(f));
    }

    /// Install an extension now and register its tags at build time
    pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
        tracing::debug!(
            extension = extension.name(),
            tags = ?extension.tags(),
            "installing extension"
        );
        extension.install(&mut self);
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn build(self) -> TemplateResult<Environment> {
        let tags = TagTable::build(&self.extensions)?;
        Ok(Environment {
            settings: self.settings,
            runtime: self.runtime,
            extensions: self.extensions,
            tags,
            finalize: self.finalize,
            globals: self.globals,
        })
    }
}

/// A compiled template bound to its environment
pub struct Template<'env> {
    env: &'env Environment,
    nodes: Vec<Node>,
}

impl<'env> Template<'env> {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Render with a JSON object as the context (null is treated as empty)
    pub fn render(&self, context: &Value) -> TemplateResult<String> {
        Renderer::new(self.env, context)?.render(&self.nodes)
    }
}

impl fmt::Debug for Template<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}
