//! Plugin archive builder.
//!
//! Packs a plugin's source and its manifest into one in-memory zip, after
//! injecting a freshly generated `plugin_id` into the manifest. The checksum
//! is taken over the finished buffer, so a [`PluginArtifact`] can only ever
//! carry a digest of its own bytes.

use std::io::{Cursor, Write};

use hub_core::PluginId;
use uuid::Uuid;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::checksum::sha256_hex;
use crate::error::PackageError;
use crate::manifest::PluginManifest;

/// File extensions of the two archive members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    pub source_ext: String,
    pub manifest_ext: String,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self {
            source_ext: String::from("py"),
            manifest_ext: String::from("yaml"),
        }
    }
}

impl ArchiveLayout {
    #[must_use]
    pub fn source_entry(&self, name: &str) -> String {
        format!("{name}.{}", self.source_ext)
    }

    #[must_use]
    pub fn manifest_entry(&self, name: &str) -> String {
        format!("{name}.{}", self.manifest_ext)
    }
}

/// A finished, publishable plugin package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginArtifact {
    plugin_id: PluginId,
    bytes: Vec<u8>,
    checksum: String,
    manifest_yaml: String,
}

impl PluginArtifact {
    #[must_use]
    pub const fn plugin_id(&self) -> &PluginId {
        &self.plugin_id
    }

    #[must_use]
    pub fn plugin_name(&self) -> &str {
        self.plugin_id.name()
    }

    /// Compressed zip bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex SHA-256 of [`Self::bytes`].
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Manifest as it was written into the archive, `plugin_id` included.
    #[must_use]
    pub fn manifest_yaml(&self) -> &str {
        &self.manifest_yaml
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveBuilder {
    layout: ArchiveLayout,
}

impl ArchiveBuilder {
    #[must_use]
    pub fn new(layout: ArchiveLayout) -> Self {
        Self { layout }
    }

    #[must_use]
    pub const fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// Package a plugin under a newly generated id.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::Invalid` for a bad plugin name,
    /// `PackageError::ManifestParse` for a manifest that is not a YAML
    /// mapping, or an archive error if the zip cannot be written.
    pub fn build(
        &self,
        name: &str,
        source: &str,
        manifest: &str,
    ) -> Result<PluginArtifact, PackageError> {
        let suffix = Uuid::new_v4().to_string();
        let plugin_id = PluginId::new(name, &suffix)?;
        self.build_with_id(plugin_id, source, manifest)
    }

    /// Package a plugin under a caller-supplied id.
    ///
    /// Identical inputs produce byte-identical archives.
    ///
    /// # Errors
    ///
    /// Same as [`Self::build`].
    pub fn build_with_id(
        &self,
        plugin_id: PluginId,
        source: &str,
        manifest: &str,
    ) -> Result<PluginArtifact, PackageError> {
        let mut parsed = PluginManifest::parse(manifest)?;
        parsed.inject_plugin_id(plugin_id.as_str());
        let manifest_yaml = parsed.to_yaml()?;

        let name = plugin_id.name();
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(self.layout.source_entry(name), options)?;
        writer.write_all(source.as_bytes())?;
        writer.start_file(self.layout.manifest_entry(name), options)?;
        writer.write_all(manifest_yaml.as_bytes())?;
        let bytes = writer.finish()?.into_inner();

        let checksum = sha256_hex(&bytes);
        tracing::debug!(
            plugin_id = %plugin_id,
            size = bytes.len(),
            %checksum,
            "built plugin archive"
        );

        Ok(PluginArtifact {
            plugin_id,
            bytes,
            checksum,
            manifest_yaml,
        })
    }
}
