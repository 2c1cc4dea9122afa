use hub_config::HubConfig;
use hub_core::PluginId;
use hub_registry::{GitHubClient, PublishSettings, Publisher};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CleanupArgs;
use crate::commands::shared::open_db;
use crate::output::output;

#[derive(Serialize)]
struct CleanupResponse {
    plugin_id: String,
    deleted_branch: Option<String>,
}

/// Reads the publish journal in the local database, so run it where the
/// server runs.
pub async fn handle(
    args: &CleanupArgs,
    flags: &GlobalFlags,
    config: &HubConfig,
) -> anyhow::Result<()> {
    let plugin_id = PluginId::parse(&args.plugin_id)?;
    let github = config.require_github()?;
    let publisher = Publisher::new(
        GitHubClient::from_config(github)?,
        open_db(config).await?,
        PublishSettings::from_config(github, &config.publish),
    );
    let deleted_branch = publisher.cleanup(&plugin_id).await?;
    output(
        &CleanupResponse {
            plugin_id: plugin_id.to_string(),
            deleted_branch,
        },
        flags.format,
    )
}
