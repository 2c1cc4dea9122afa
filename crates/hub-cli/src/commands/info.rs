use hub_config::HubConfig;
use hub_core::PluginId;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InfoArgs;
use crate::client::HubClient;
use crate::commands::shared::open_db;
use crate::output::output;

/// Review status when a pull request is known (flag or local record),
/// published details otherwise.
pub async fn handle(args: &InfoArgs, flags: &GlobalFlags, config: &HubConfig) -> anyhow::Result<()> {
    let plugin_id = PluginId::parse(&args.plugin_id)?;
    let pr = match (args.pr, args.published) {
        (Some(pr), _) => Some(pr),
        (None, true) => None,
        (None, false) => open_db(config)
            .await?
            .get_record(plugin_id.as_str())
            .await?
            .map(|record| record.pr_number),
    };
    let info = HubClient::new(&config.client.server_url)
        .plugin_info(plugin_id.as_str(), plugin_id.name(), pr)
        .await?;
    output(&info, flags.format)
}
