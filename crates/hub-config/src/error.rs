//! Errors raised while loading or checking configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read, or a value had the wrong type.
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),

    /// The section an operation needs is missing its required fields.
    #[error("[{section}] is not configured")]
    NotConfigured { section: String },

    /// A value loaded but cannot be used.
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
