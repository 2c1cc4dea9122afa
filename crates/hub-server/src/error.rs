//! Server error types and their HTTP mapping.

use hub_core::responses::ErrorResponse;
use hub_core::{CoreError, PublishStage};
use hub_registry::{PublishError, RegistryError};
use thiserror::Error;

/// Failures that stop the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("configuration error: {0}")]
    Config(#[from] hub_config::ConfigError),

    #[error("registry client error: {0}")]
    Registry(#[from] RegistryError),

    #[error("database error: {0}")]
    Database(#[from] hub_db::DatabaseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("accept loop stopped: {0}")]
    Join(String),
}

/// A failed request: HTTP status plus the JSON error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: error.into(),
                stage: None,
            },
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(400, error)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self::new(404, error)
    }

    #[must_use]
    pub const fn with_stage(mut self, stage: Option<PublishStage>) -> Self {
        self.body.stage = stage;
        self
    }
}

impl From<PublishError> for ApiError {
    fn from(error: PublishError) -> Self {
        let status = match &error {
            PublishError::Validation(_) => 400,
            PublishError::BranchExists { .. } => 409,
            PublishError::Upstream { .. } => 502,
            PublishError::Cleanup { .. } | PublishError::Journal(_) => 500,
        };
        Self::new(status, error.to_string()).with_stage(error.stage())
    }
}

impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        match &error {
            RegistryError::InvalidSource(_) => Self::bad_request(error.to_string()),
            RegistryError::NotConfigured(_) => Self::new(503, error.to_string()),
            RegistryError::Api { status: 404, .. } => Self::not_found(error.to_string()),
            _ => Self::new(502, error.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(_) => Self::bad_request(error.to_string()),
            CoreError::NotFound { .. } => Self::not_found(error.to_string()),
            _ => Self::new(500, error.to_string()),
        }
    }
}

impl From<multer::Error> for ApiError {
    fn from(error: multer::Error) -> Self {
        Self::bad_request(format!("malformed multipart body: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn branch_exists_is_conflict_at_create_branch() {
        let err = ApiError::from(PublishError::BranchExists {
            branch: "add-plugin-Echo_1".into(),
        });
        assert_eq!(err.status, 409);
        assert_eq!(err.body.stage, Some(PublishStage::CreateBranch));
    }

    #[test]
    fn upstream_failure_is_bad_gateway_with_stage() {
        let err = ApiError::from(PublishError::Upstream {
            stage: PublishStage::OpenPullRequest,
            source: RegistryError::Api {
                status: 500,
                message: "boom".into(),
            },
        });
        assert_eq!(err.status, 502);
        assert_eq!(err.body.stage, Some(PublishStage::OpenPullRequest));
    }

    #[test]
    fn invalid_source_is_bad_request() {
        let err = ApiError::from(RegistryError::InvalidSource("https://evil.test".into()));
        assert_eq!(err.status, 400);
        assert_eq!(err.body.stage, None);
    }
}
