//! # tagext
//!
//! Custom tag grammars for a Jinja-style template compiler.
//!
//! The host compiler only knows how to lex template source, parse plain expressions and
//! render `{{ ... }}` output. Everything inside `{% ... %}` is handed to an [`Extension`]
//! that owns the tag name: it reads tokens straight off the shared [`TokenStream`] and
//! returns host AST nodes. The bundled extensions implement the Django tags
//! `trans`, `blocktrans`, `url`, `static`, `now` and `csrf_token`, plus value
//! localization through the output finalizer.
//!
//! Layout
//!
//!     src/tagext/host          The host compiler: lexer, token cursor, AST, parser, renderer
//!     src/tagext/extensions    Tag grammars and their composition
//!     src/tagext/runtime.rs    Injected runtime-support hooks (translation, url resolution, ...)
//!     src/tagext/finalize.rs   Output finalizer composition
//!     src/tagext/config.rs     Settings loader
//!
//! [`Extension`]: tagext::extensions::Extension
//! [`TokenStream`]: tagext::host::stream::TokenStream

pub mod tagext;

pub use tagext::environment::{Environment, EnvironmentBuilder, Template};
pub use tagext::error::{TemplateError, TemplateResult};
