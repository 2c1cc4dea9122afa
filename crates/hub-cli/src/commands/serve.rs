use hub_config::HubConfig;

use crate::cli::root_commands::ServeArgs;

pub async fn handle(args: &ServeArgs, config: &HubConfig) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(bind) = &args.bind {
        config.server.bind.clone_from(bind);
    }
    config.require_github()?;
    hub_server::run(&config).await?;
    Ok(())
}
