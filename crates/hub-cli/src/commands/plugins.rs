use hub_config::HubConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PluginsArgs;
use crate::client::HubClient;
use crate::output::output;
use crate::progress::Progress;

pub async fn handle(
    args: &PluginsArgs,
    flags: &GlobalFlags,
    config: &HubConfig,
) -> anyhow::Result<()> {
    let progress = Progress::spinner("Fetching plugins", flags.quiet);
    let entries = HubClient::new(&config.client.server_url)
        .plugins(args.page)
        .await;
    progress.finish_clear();
    output(&entries?, flags.format)
}
