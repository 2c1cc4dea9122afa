use hub_config::HubConfig;

use crate::cli::GlobalFlags;
use crate::client::HubClient;
use crate::output::output;

pub async fn handle(flags: &GlobalFlags, config: &HubConfig) -> anyhow::Result<()> {
    let channels = HubClient::new(&config.client.server_url).releases().await?;
    output(&channels, flags.format)
}
