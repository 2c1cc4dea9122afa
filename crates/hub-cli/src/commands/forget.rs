use hub_config::HubConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ForgetArgs;
use crate::commands::shared::open_db;
use crate::output::output;

#[derive(Serialize)]
struct ForgetResponse {
    plugin_id: String,
    removed: bool,
}

pub async fn handle(
    args: &ForgetArgs,
    flags: &GlobalFlags,
    config: &HubConfig,
) -> anyhow::Result<()> {
    let removed = open_db(config).await?.delete_record(&args.plugin_id).await?;
    output(
        &ForgetResponse {
            plugin_id: args.plugin_id.clone(),
            removed,
        },
        flags.format,
    )
}
