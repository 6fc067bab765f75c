//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
///
/// Store mutations themselves never fail: unknown ids and unchanged values are
/// silent no-ops. These variants cover input validation and documents.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Template id is not one of the built-in templates.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// A style value from the editor panel was rejected.
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    /// Scene document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
