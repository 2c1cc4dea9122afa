//! Packaging error types.

use hub_core::CoreError;
use thiserror::Error;

/// Errors that can occur while building a plugin artifact.
#[derive(Debug, Error)]
pub enum PackageError {
    /// The manifest document is not valid YAML or not a mapping.
    #[error("manifest parse error: {0}")]
    ManifestParse(String),

    /// The plugin name or id failed validation.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Writing the zip archive failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error while writing archive entries.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for PackageError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::ManifestParse(error.to_string())
    }
}
