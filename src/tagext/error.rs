//! Error types for template compilation and rendering
//!
//! There are two compile-time failures. A `Syntax` error means the template source is
//! malformed; a `Config` error means the engine was assembled or used in a way it does not
//! support (two grammars claiming one tag, `plural` without `count`). Both abort the
//! compile with the original message and line intact. `Render` errors come from runtime
//! hooks and value conversions after compilation succeeded.

use std::fmt;

/// Errors raised while compiling or rendering a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Malformed tag source: unexpected token, illegal modifier combination, missing clause
    Syntax { message: String, line: usize },
    /// Structural misuse of the engine
    Config { message: String, line: Option<usize> },
    /// Failure while executing a compiled template
    Render { message: String },
}

impl TemplateError {
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        TemplateError::Syntax {
            message: message.into(),
            line,
        }
    }

    pub fn config(message: impl Into<String>, line: Option<usize>) -> Self {
        TemplateError::Config {
            message: message.into(),
            line,
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        TemplateError::Render {
            message: message.into(),
        }
    }

    /// The human-readable message without location prefix
    pub fn message(&self) -> &str {
        match self {
            TemplateError::Syntax { message, .. }
            | TemplateError::Config { message, .. }
            | TemplateError::Render { message } => message,
        }
    }

    /// Source line the error points at, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            TemplateError::Syntax { line, .. } => Some(*line),
            TemplateError::Config { line, .. } => *line,
            TemplateError::Render { .. } => None,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, TemplateError::Syntax { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, TemplateError::Config { .. })
    }
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Syntax { message, line } => {
                write!(f, "Syntax error on line {}: {}", line, message)
            }
            TemplateError::Config {
                message,
                line: Some(line),
            } => write!(f, "Configuration error on line {}: {}", line, message),
            TemplateError::Config {
                message,
                line: None,
            } => write!(f, "Configuration error: {}", message),
            TemplateError::Render { message } => write!(f, "Render error: {}", message),
        }
    }
}

impl std::error::Error for TemplateError {}

impl From<TemplateError> for String {
    fn from(err: TemplateError) -> Self {
        err.to_string()
    }
}

/// Result alias used throughout the crate
pub type TemplateResult<T> = Result<T, TemplateError>;
