//! Plugin manifest documents.
//!
//! The manifest is kept as a YAML mapping rather than a fixed struct so that
//! every key the author wrote survives re-serialization in its original
//! order. Only `plugin_id` is ever written by Plughub.

use serde_yaml::{Mapping, Value};

use crate::error::PackageError;

/// Key the generated plugin id is stored under.
pub const PLUGIN_ID_KEY: &str = "plugin_id";

/// Keys every publishable manifest must define.
pub const REQUIRED_KEYS: [&str; 4] = ["plugin_name", "version", "author", "description"];

/// A parsed plugin manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginManifest {
    fields: Mapping,
}

impl PluginManifest {
    /// Parse a manifest document.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::ManifestParse` if the document is not valid YAML
    /// or its top level is not a mapping.
    pub fn parse(document: &str) -> Result<Self, PackageError> {
        match serde_yaml::from_str::<Value>(document)? {
            Value::Mapping(fields) => Ok(Self { fields }),
            Value::Null => Err(PackageError::ManifestParse(String::from(
                "manifest is empty",
            ))),
            _ => Err(PackageError::ManifestParse(String::from(
                "manifest must be a mapping of keys to values",
            ))),
        }
    }

    /// Write `plugin_id` into the manifest, replacing any previous value in place.
    pub fn inject_plugin_id(&mut self, plugin_id: &str) {
        self.fields.insert(
            Value::String(String::from(PLUGIN_ID_KEY)),
            Value::String(plugin_id.to_string()),
        );
    }

    /// Serialize back to YAML.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::ManifestParse` if a value cannot be represented.
    pub fn to_yaml(&self) -> Result<String, PackageError> {
        Ok(serde_yaml::to_string(&self.fields)?)
    }

    /// Scalar field rendered as a string (`version: 1.0` reads as `"1.0"`).
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn plugin_id(&self) -> Option<String> {
        self.text(PLUGIN_ID_KEY)
    }

    #[must_use]
    pub fn plugin_name(&self) -> Option<String> {
        self.text("plugin_name")
    }

    #[must_use]
    pub fn version(&self) -> Option<String> {
        self.text("version")
    }

    #[must_use]
    pub fn author(&self) -> Option<String> {
        self.text("author")
    }

    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.text("description")
    }

    /// Required keys that are absent.
    #[must_use]
    pub fn missing_keys(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .into_iter()
            .filter(|key| !self.fields.contains_key(*key))
            .collect()
    }

    /// The underlying mapping.
    #[must_use]
    pub const fn fields(&self) -> &Mapping {
        &self.fields
    }
}
