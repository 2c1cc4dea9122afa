use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::AgentCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Check plugin source and manifest without packaging.
    Validate(PluginSourceArgs),
    /// Package a plugin into a zip archive and print its checksum.
    Pack(PackArgs),
    /// Package a plugin and propose it to the registry.
    Publish(PublishArgs),
    /// List accepted plugins.
    Plugins(PluginsArgs),
    /// Show details or review status of one plugin.
    Info(InfoArgs),
    /// Plugins you published from this machine, with review status.
    Mine,
    /// Forget a local publish record.
    Forget(ForgetArgs),
    /// Latest bot releases.
    Releases,
    /// Local agent management.
    Agent {
        #[command(subcommand)]
        action: AgentCommands,
    },
    /// Run the Plughub HTTP server.
    Serve(ServeArgs),
    /// Delete the review branch left behind by a failed publish.
    Cleanup(CleanupArgs),
}

#[derive(Clone, Debug, Args)]
pub struct PluginSourceArgs {
    /// Plugin source file.
    #[arg(long)]
    pub source: PathBuf,

    /// Manifest (YAML) file.
    #[arg(long)]
    pub manifest: PathBuf,

    /// Plugin name (defaults to the source file stem).
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct PackArgs {
    #[command(flatten)]
    pub plugin: PluginSourceArgs,

    /// Output path (defaults to `{name}.zip` in the current directory).
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct PublishArgs {
    #[command(flatten)]
    pub plugin: PluginSourceArgs,

    /// Avatar image shown in listings.
    #[arg(long)]
    pub avatar: PathBuf,

    /// Readme text (defaults to the manifest description).
    #[arg(long)]
    pub readme: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct PluginsArgs {
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

#[derive(Clone, Debug, Args)]
pub struct InfoArgs {
    /// Plugin id (`{name}_{uuid}`).
    pub plugin_id: String,

    /// Review pull request number (defaults to the local publish record).
    #[arg(long)]
    pub pr: Option<u64>,

    /// Look up the published plugin even if a local record exists.
    #[arg(long, conflicts_with = "pr")]
    pub published: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ForgetArgs {
    pub plugin_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind`).
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct CleanupArgs {
    pub plugin_id: String,
}
