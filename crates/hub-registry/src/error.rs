//! Registry error types.

use hub_core::{CoreError, PublishStage};
use thiserror::Error;

/// Errors that can occur when talking to the GitHub-backed registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by GitHub.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// Failed to parse a GitHub or raw-content response.
    #[error("parse error: {0}")]
    Parse(String),

    /// GitHub returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// A proxied download URL is outside the allow-list.
    #[error("invalid download source: {0}")]
    InvalidSource(String),

    /// The registry repository is not configured.
    #[error("registry not configured: {0}")]
    NotConfigured(String),
}

impl RegistryError {
    /// HTTP status of an API error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// GitHub answers 422 when a ref with that name already exists.
    #[must_use]
    pub const fn is_unprocessable(&self) -> bool {
        matches!(self.status(), Some(422))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

/// Errors returned by the registry publisher.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The request failed validation; nothing was sent upstream.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The review branch for this plugin id already exists.
    #[error("branch '{branch}' already exists")]
    BranchExists { branch: String },

    /// An upstream call failed at the given stage.
    #[error("{stage} failed: {source}")]
    Upstream {
        stage: PublishStage,
        #[source]
        source: RegistryError,
    },

    /// Deleting a dangling review branch failed.
    #[error("cleanup of branch '{branch}' failed: {source}")]
    Cleanup {
        branch: String,
        #[source]
        source: RegistryError,
    },

    /// The publish journal could not be read.
    #[error("publish journal unavailable: {0}")]
    Journal(#[source] CoreError),
}

impl PublishError {
    /// Stage that failed, for upstream failures.
    #[must_use]
    pub const fn stage(&self) -> Option<PublishStage> {
        match self {
            Self::Upstream { stage, .. } => Some(*stage),
            Self::BranchExists { .. } => Some(PublishStage::CreateBranch),
            _ => None,
        }
    }

    pub(crate) fn at(stage: PublishStage) -> impl Fn(RegistryError) -> Self {
        move |source| Self::Upstream { stage, source }
    }
}
