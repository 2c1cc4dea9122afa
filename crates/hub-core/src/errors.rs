//! Cross-cutting error types for Plughub.
//!
//! Domain-specific errors (e.g., `PackageError`, `RegistryError`) are defined
//! in their respective crates. The CLI converges everything into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Plughub crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Input failed validation before any network call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The durable store rejected a read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
