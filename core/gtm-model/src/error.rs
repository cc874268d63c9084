//! Error types for the resource model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or transforming resource values.
///
/// All of these are raised synchronously, before any remote call is made.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The caller supplied an unusable representation or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// A field required by the operation is absent from the representation.
    #[error("{kind} is missing required field '{field}'")]
    MissingField { kind: &'static str, field: &'static str },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
