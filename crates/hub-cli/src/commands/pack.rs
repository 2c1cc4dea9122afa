use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PackArgs;
use crate::commands::shared::PluginSource;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct PackResponse {
    pub plugin_id: String,
    pub plugin_name: String,
    pub checksum: String,
    pub path: PathBuf,
    pub bytes: usize,
}

pub fn handle(args: &PackArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&pack_to_file(args)?, flags.format)
}

fn pack_to_file(args: &PackArgs) -> anyhow::Result<PackResponse> {
    let plugin = PluginSource::read(&args.plugin)?;
    let artifact = plugin.build()?;
    let path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.zip", plugin.name)));
    std::fs::write(&path, artifact.bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(plugin_id = %artifact.plugin_id(), path = %path.display(), "packaged plugin");
    Ok(PackResponse {
        plugin_id: artifact.plugin_id().to_string(),
        plugin_name: plugin.name,
        checksum: artifact.checksum().to_string(),
        bytes: artifact.bytes().len(),
        path,
    })
}
