//! General application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default listing page size.
const fn default_page_size() -> u32 {
    15
}

fn default_avatar_extensions() -> Vec<String> {
    ["jpeg", "jpg", "png", "gif", "webp"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Plugins per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Avatar extensions probed in order when resolving a plugin's image.
    #[serde(default = "default_avatar_extensions")]
    pub avatar_extensions: Vec<String>,

    /// Path of the libSQL store. Empty means the platform data directory.
    #[serde(default)]
    pub db_path: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            avatar_extensions: default_avatar_extensions(),
            db_path: String::new(),
        }
    }
}

impl GeneralConfig {
    /// Resolved store path.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        if !self.db_path.is_empty() {
            return PathBuf::from(&self.db_path);
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plughub")
            .join("plughub.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.page_size, 15);
        assert_eq!(config.avatar_extensions[0], "jpeg");
        assert!(config.db_path().ends_with("plughub/plughub.db"));
    }

    #[test]
    fn explicit_db_path_wins() {
        let config = GeneralConfig {
            db_path: "/tmp/x.db".into(),
            ..Default::default()
        };
        assert_eq!(config.db_path(), PathBuf::from("/tmp/x.db"));
    }
}
