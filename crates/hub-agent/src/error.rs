//! Agent client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Nothing is listening at the agent URL, or it did not answer in time.
    #[error("local agent not reachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP transport error after the connection was made.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The agent returned a non-success status code.
    #[error("agent error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The agent answered, but reported failure in its body.
    #[error("agent refused: {0}")]
    Rejected(String),

    /// Failed to parse an agent response.
    #[error("parse error: {0}")]
    Parse(String),
}

impl AgentError {
    /// Whether the caller should suggest starting the agent.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    pub(crate) fn from_send(url: &str, error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::Unreachable {
                url: url.to_string(),
                source: error,
            }
        } else {
            Self::Http(error)
        }
    }
}
