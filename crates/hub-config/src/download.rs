//! Download proxy allow-list and bot release feed.

use serde::{Deserialize, Serialize};

fn default_allowed_prefixes() -> Vec<String> {
    vec![
        String::from("https://raw.githubusercontent.com/"),
        String::from("https://github.com/"),
    ]
}

fn default_release_repo() -> String {
    String::from("shuakami/amyalmond_bot")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// URL prefixes the `/download` proxy is allowed to fetch.
    #[serde(default = "default_allowed_prefixes")]
    pub allowed_prefixes: Vec<String>,

    /// Repository whose releases `/releases` reports, as `owner/name`.
    #[serde(default = "default_release_repo")]
    pub release_repo: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            allowed_prefixes: default_allowed_prefixes(),
            release_repo: default_release_repo(),
        }
    }
}
