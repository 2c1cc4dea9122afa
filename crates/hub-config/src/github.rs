//! GitHub registry configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_repo() -> String {
    String::from("shuakami/bot_plugins")
}

fn default_api_url() -> String {
    String::from("https://api.github.com")
}

fn default_raw_url() -> String {
    String::from("https://raw.githubusercontent.com")
}

fn default_branch() -> String {
    String::from("master")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// Personal access token with `contents` and `pull_requests` write scope.
    #[serde(default)]
    pub token: String,

    /// Registry repository as `owner/name`.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Raw content host used to read published plugin files.
    #[serde(default = "default_raw_url")]
    pub raw_url: String,

    /// Branch that published plugins are read from.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Resolve the default branch from the repository before publishing
    /// instead of trusting `branch`.
    #[serde(default = "default_true")]
    pub resolve_default_branch: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            repo: default_repo(),
            api_url: default_api_url(),
            raw_url: default_raw_url(),
            branch: default_branch(),
            resolve_default_branch: true,
        }
    }
}

impl GitHubConfig {
    /// Check if the config has the minimum required fields for writes.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && self.repo_parts().is_some()
    }

    /// Split `repo` into `(owner, name)`.
    #[must_use]
    pub fn repo_parts(&self) -> Option<(&str, &str)> {
        let (owner, name) = self.repo.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some((owner, name))
    }

    /// Reject values no registry client could use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming `github.repo` when it is not
    /// `owner/name`, or `github.raw_url` when it is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repo_parts().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "github.repo",
                reason: format!("expected owner/name, got '{}'", self.repo),
            });
        }
        if self.raw_url.trim_end_matches('/').is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "github.raw_url",
                reason: String::from("must not be empty"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = GitHubConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.repo_parts(), Some(("shuakami", "bot_plugins")));
        assert_eq!(config.branch, "master");
    }

    #[test]
    fn configured_with_token() {
        let config = GitHubConfig {
            token: "ghp_abc".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn malformed_repo_rejected() {
        for repo in ["noslash", "/name", "owner/", "a/b/c"] {
            let config = GitHubConfig {
                token: "ghp_abc".into(),
                repo: repo.into(),
                ..Default::default()
            };
            assert!(!config.is_configured(), "{repo} should not be accepted");
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { field: "github.repo", .. }),
                "{err}"
            );
        }
    }

    #[test]
    fn default_validates() {
        assert!(GitHubConfig::default().validate().is_ok());
    }
}
