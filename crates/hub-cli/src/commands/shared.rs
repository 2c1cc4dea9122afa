use std::path::Path;

use anyhow::Context;
use hub_config::HubConfig;
use hub_db::HubDb;
use hub_package::{ArchiveBuilder, PluginArtifact, ValidationReport};

use crate::cli::root_commands::PluginSourceArgs;

/// Plugin source and manifest read from disk.
pub struct PluginSource {
    pub name: String,
    pub source: String,
    pub manifest: String,
}

impl PluginSource {
    pub fn read(args: &PluginSourceArgs) -> anyhow::Result<Self> {
        let name = match &args.name {
            Some(name) => name.clone(),
            None => file_stem(&args.source)?,
        };
        let source = std::fs::read_to_string(&args.source)
            .with_context(|| format!("failed to read source {}", args.source.display()))?;
        let manifest = std::fs::read_to_string(&args.manifest)
            .with_context(|| format!("failed to read manifest {}", args.manifest.display()))?;
        Ok(Self {
            name,
            source,
            manifest,
        })
    }

    pub fn validate(&self) -> ValidationReport {
        hub_package::validate(&self.name, &self.source, &self.manifest)
    }

    /// Validate, then package.
    pub fn build(&self) -> anyhow::Result<PluginArtifact> {
        let report = self.validate();
        if !report.is_valid() {
            anyhow::bail!(
                "plugin '{}' is not valid:\n  {}",
                self.name,
                report.messages().join("\n  ")
            );
        }
        ArchiveBuilder::default()
            .build(&self.name, &self.source, &self.manifest)
            .with_context(|| format!("failed to package plugin '{}'", self.name))
    }
}

fn file_stem(path: &Path) -> anyhow::Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a plugin name from {}", path.display()))
}

/// Open the local publish-record database, creating its directory.
pub async fn open_db(config: &HubConfig) -> anyhow::Result<HubDb> {
    let path = config.general.db_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    HubDb::open_local(&path.to_string_lossy())
        .await
        .with_context(|| format!("failed to open database at {}", path.display()))
}
