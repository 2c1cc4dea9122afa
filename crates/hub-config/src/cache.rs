//! Read-through cache lifetimes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_list_ttl() -> u64 {
    30
}

const fn default_info_ttl() -> u64 {
    10
}

const fn default_release_ttl() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Lifetime of a cached plugin listing page, in seconds.
    #[serde(default = "default_list_ttl")]
    pub list_ttl_secs: u64,

    /// Lifetime of a cached plugin-info lookup, in seconds.
    #[serde(default = "default_info_ttl")]
    pub info_ttl_secs: u64,

    /// Lifetime of the cached release feed, in seconds.
    #[serde(default = "default_release_ttl")]
    pub release_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_ttl_secs: default_list_ttl(),
            info_ttl_secs: default_info_ttl(),
            release_ttl_secs: default_release_ttl(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_secs)
    }

    #[must_use]
    pub const fn info_ttl(&self) -> Duration {
        Duration::from_secs(self.info_ttl_secs)
    }

    #[must_use]
    pub const fn release_ttl(&self) -> Duration {
        Duration::from_secs(self.release_ttl_secs)
    }
}
