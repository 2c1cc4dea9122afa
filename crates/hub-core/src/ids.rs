//! Plugin identifiers and name rules.
//!
//! A plugin id is `{name}_{uuid}` and doubles as the registry directory name
//! (`plugins/{plugin_id}/`). Plugin names may themselves contain underscores,
//! so the name is always recovered by splitting on the *last* underscore.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Prefix of the registry branch opened for a new plugin.
pub const BRANCH_PREFIX: &str = "add-plugin-";

/// Whether `name` is usable as a plugin name.
///
/// Names become file names and path segments in the registry, so only ASCII
/// letters, digits, `_` and `-` are accepted.
#[must_use]
pub fn is_valid_plugin_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Globally unique plugin identifier, `{name}_{uuid}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    /// Build an id from a plugin name and an already generated suffix.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the name is not a valid plugin name
    /// or the suffix is not a non-empty run of ASCII letters, digits and `-`.
    pub fn new(name: &str, suffix: &str) -> Result<Self, CoreError> {
        if !is_valid_plugin_name(name) {
            return Err(CoreError::validation(format!(
                "invalid plugin name '{name}': use only letters, digits, '_' or '-'"
            )));
        }
        if suffix.is_empty()
            || !suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(CoreError::validation(format!(
                "invalid plugin id suffix '{suffix}'"
            )));
        }
        Ok(Self(format!("{name}_{suffix}")))
    }

    /// Parse an id received from a client or read from the registry tree.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the id does not have the
    /// `{name}_{suffix}` shape.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let Some((name, suffix)) = raw.rsplit_once('_') else {
            return Err(CoreError::validation(format!(
                "plugin id '{raw}' is not of the form {{name}}_{{uuid}}"
            )));
        };
        Self::new(name, suffix)
    }

    /// The plugin name embedded in the id.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit_once('_').map_or(self.0.as_str(), |(name, _)| name)
    }

    /// Registry branch used to propose this plugin.
    #[must_use]
    pub fn branch_name(&self) -> String {
        format!("{BRANCH_PREFIX}{}", self.0)
    }

    /// Registry directory holding this plugin's files.
    #[must_use]
    pub fn registry_dir(&self) -> String {
        format!("plugins/{}", self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PluginId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
