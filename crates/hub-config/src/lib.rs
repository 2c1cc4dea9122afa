//! # hub-config
//!
//! Layered configuration loading for Plughub using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PLUGHUB_*` prefix, `__` as separator)
//! 2. Project-level `.plughub/config.toml`
//! 3. User-level `~/.config/plughub/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PLUGHUB_GITHUB__TOKEN` -> `github.token`,
//! `PLUGHUB_CACHE__LIST_TTL_SECS` -> `cache.list_ttl_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use hub_config::HubConfig;
//!
//! let config = HubConfig::load_with_dotenv().expect("config");
//! if config.github.is_configured() {
//!     println!("Registry: {}", config.github.repo);
//! }
//! ```

mod agent;
mod cache;
mod download;
mod error;
mod general;
mod github;
mod publish;
mod server;

pub use agent::AgentConfig;
pub use cache::CacheConfig;
pub use download::DownloadConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use github::GitHubConfig;
pub use publish::PublishConfig;
pub use server::{ClientConfig, ServerConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HubConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl HubConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be read or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support from the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".plughub/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("PLUGHUB_").split("__"))
    }

    /// Fail unless registry writes are possible.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` when the GitHub token is missing,
    /// or `ConfigError::InvalidValue` when the repository is malformed.
    pub fn require_github(&self) -> Result<&GitHubConfig, ConfigError> {
        self.github.validate()?;
        if self.github.is_configured() {
            Ok(&self.github)
        } else {
            Err(ConfigError::NotConfigured {
                section: String::from("github"),
            })
        }
    }

    /// Base URL used when building `/download` links for the local agent.
    #[must_use]
    pub fn public_url(&self) -> &str {
        let url = if self.server.public_url.is_empty() {
            &self.client.server_url
        } else {
            &self.server.public_url
        };
        url.trim_end_matches('/')
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plughub").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = HubConfig::default();
        assert!(!config.github.is_configured());
        assert!(config.publish.cleanup_on_failure);
        assert_eq!(config.cache.list_ttl_secs, 30);
        assert_eq!(config.cache.info_ttl_secs, 10);
        assert_eq!(config.agent.url, "http://localhost:10417");
    }

    #[test]
    fn require_github_reports_section() {
        let err = HubConfig::default().require_github().unwrap_err();
        assert!(matches!(err, ConfigError::NotConfigured { section } if section == "github"));
    }

    #[test]
    fn require_github_reports_malformed_repo() {
        let mut config = HubConfig::default();
        config.github.token = "ghp_abc".into();
        config.github.repo = "no-slash".into();
        let err = config.require_github().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "github.repo", .. }));
    }

    #[test]
    fn public_url_falls_back_to_client_url() {
        let mut config = HubConfig::default();
        assert_eq!(config.public_url(), "http://127.0.0.1:8787");
        config.server.public_url = "https://hub.example.com/".into();
        assert_eq!(config.public_url(), "https://hub.example.com");
    }
}
