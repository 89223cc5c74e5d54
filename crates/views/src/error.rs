//! View error types.

use thiserror::Error;

/// Errors a rendering surface can report.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing rendered output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing rows failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A column identifier that names no known field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field {0:?}, expected one of name, birthYear, removeAction")]
pub struct UnknownFieldError(pub String);

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;
