//! Host template compiler
//!
//!     The tag grammars never see template source. They work on the token stream the host
//!     lexer produces and hand back nodes of the host AST, which the host renderer executes.
//!     This module is that host, kept to the surface the grammars depend on:
//!
//!         1. [lexer](lexer) turns source into [tokens](token), switching between a data
//!            lexer and an in-tag lexer at every `{%` / `{{` delimiter.
//!         2. [stream](stream) is the cursor the parser and all grammars share.
//!         3. [parser](parser) drives the template loop, parses plain expressions and
//!            dispatches `{% name ... %}` statements to the extension owning `name`.
//!         4. [render](render) evaluates the [AST](ast) against a JSON context.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod stream;
pub mod token;
