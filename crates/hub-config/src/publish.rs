//! Publish pipeline behaviour.

use hub_core::ReviewPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishConfig {
    /// Delete the proposal branch when a later publish step fails.
    #[serde(default = "default_cleanup")]
    pub cleanup_on_failure: bool,

    /// How unmerged pull requests are classified.
    #[serde(default)]
    pub review_policy: ReviewPolicy,
}

const fn default_cleanup() -> bool {
    true
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            cleanup_on_failure: default_cleanup(),
            review_policy: ReviewPolicy::default(),
        }
    }
}
