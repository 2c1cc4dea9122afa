//! Local agent endpoint.

use serde::{Deserialize, Serialize};

fn default_url() -> String {
    String::from("http://localhost:10417")
}

const fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Base URL of the agent running on the user's machine.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds. Installs download the plugin first, so
    /// this is longer than the registry timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
        }
    }
}
