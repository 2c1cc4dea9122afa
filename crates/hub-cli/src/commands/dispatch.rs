use hub_config::HubConfig;

use crate::cli::{Commands, GlobalFlags};
use crate::commands::{
    agent, cleanup, forget, info, mine, pack, plugins, publish, releases, serve, validate,
};

pub async fn dispatch(
    command: Commands,
    flags: &GlobalFlags,
    config: &HubConfig,
) -> anyhow::Result<()> {
    match command {
        Commands::Validate(args) => validate::handle(&args, flags),
        Commands::Pack(args) => pack::handle(&args, flags),
        Commands::Publish(args) => publish::handle(&args, flags, config).await,
        Commands::Plugins(args) => plugins::handle(&args, flags, config).await,
        Commands::Info(args) => info::handle(&args, flags, config).await,
        Commands::Mine => mine::handle(flags, config).await,
        Commands::Forget(args) => forget::handle(&args, flags, config).await,
        Commands::Releases => releases::handle(flags, config).await,
        Commands::Agent { action } => agent::handle(&action, flags, config).await,
        Commands::Serve(args) => serve::handle(&args, config).await,
        Commands::Cleanup(args) => cleanup::handle(&args, flags, config).await,
    }
}
