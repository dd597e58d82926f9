//! Host AST
//!
//! Grammars only construct these nodes; the [renderer](super::render) executes them.

use crate::tagext::runtime::RuntimeFn;
use serde::Serialize;
use serde_json::Value;

/// Top-level template node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    /// Literal template text, emitted verbatim
    Data { text: String },
    /// Expressions rendered into the output, each passed through the finalizer
    Output { exprs: Vec<Expr> },
    /// Store an expression's value in the render context
    Assign { target: String, value: Expr },
}

impl Node {
    pub fn data(text: impl Into<String>) -> Self {
        Node::Data { text: text.into() }
    }

    pub fn output(expr: Expr) -> Self {
        Node::Output { exprs: vec![expr] }
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Node::Assign {
            target: target.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Const {
        value: Value,
    },
    /// Text taken from template data; never finalized
    TemplateData {
        text: String,
    },
    /// Load a variable from the render context
    Name {
        name: String,
    },
    Getattr {
        object: Box<Expr>,
        attr: String,
    },
    Filter {
        expr: Box<Expr>,
        name: String,
    },
    /// Call a global function registered on the environment
    Call {
        name: String,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    /// Call one of the injected runtime-support hooks
    Runtime {
        func: RuntimeFn,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    Dict {
        items: Vec<(String, Expr)>,
    },
    /// Marks the value as already safe for output
    MarkSafe {
        expr: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Const {
            value: value.into(),
        }
    }

    pub fn template_data(text: impl Into<String>) -> Self {
        Expr::TemplateData { text: text.into() }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name { name: name.into() }
    }

    pub fn runtime(func: RuntimeFn, args: Vec<Expr>) -> Self {
        Expr::Runtime {
            func,
            args,
            kwargs: Vec::new(),
        }
    }

    pub fn runtime_kw(func: RuntimeFn, args: Vec<Expr>, kwargs: Vec<(String, Expr)>) -> Self {
        Expr::Runtime { func, args, kwargs }
    }

    pub fn mark_safe(expr: Expr) -> Self {
        Expr::MarkSafe {
            expr: Box::new(expr),
        }
    }
}
