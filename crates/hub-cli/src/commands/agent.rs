use hub_agent::{AgentClient, AgentError, proxied_download_url};
use hub_config::HubConfig;
use hub_core::PluginId;
use hub_core::responses::PluginInfo;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AgentCommands;
use crate::client::HubClient;
use crate::output::output;
use crate::progress::Progress;

pub async fn handle(
    action: &AgentCommands,
    flags: &GlobalFlags,
    config: &HubConfig,
) -> anyhow::Result<()> {
    let agent = AgentClient::new(&config.agent);
    match action {
        AgentCommands::List => {
            let plugins = agent.list().await.map_err(with_hint)?;
            output(&plugins, flags.format)
        }
        AgentCommands::Install { plugin_id, url } => {
            let archive = match (plugin_id, url) {
                (_, Some(url)) => url.clone(),
                (Some(plugin_id), None) => published_zip(config, plugin_id).await?,
                (None, None) => anyhow::bail!("pass a plugin id or --url"),
            };
            let download = proxied_download_url(config.public_url(), &archive);
            let progress = Progress::spinner("Installing plugin", flags.quiet);
            let reply = agent.install_url(&download).await;
            progress.finish_clear();
            output(&reply.map_err(with_hint)?, flags.format)
        }
        AgentCommands::Uninstall { name } => {
            let reply = agent.uninstall(name).await.map_err(with_hint)?;
            output(&reply, flags.format)
        }
    }
}

async fn published_zip(config: &HubConfig, plugin_id: &str) -> anyhow::Result<String> {
    let plugin_id = PluginId::parse(plugin_id)?;
    let info = HubClient::new(&config.client.server_url)
        .plugin_info(plugin_id.as_str(), plugin_id.name(), None)
        .await?;
    match info {
        PluginInfo::Published(plugin) => Ok(plugin.zip),
        PluginInfo::Review(_) => anyhow::bail!("plugin {plugin_id} is not published yet"),
    }
}

/// Agent errors, with a pointer to starting the agent when nothing answered.
fn with_hint(error: AgentError) -> anyhow::Error {
    if error.is_unreachable() {
        anyhow::Error::new(error).context("is the local agent running? start it next to your bot")
    } else {
        anyhow::Error::new(error)
    }
}
