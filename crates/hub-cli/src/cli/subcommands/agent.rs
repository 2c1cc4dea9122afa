use clap::Subcommand;

/// Local agent commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AgentCommands {
    /// List plugins installed in the local bot.
    List,
    /// Install a registry plugin, or any allow-listed archive URL.
    Install {
        /// Plugin id (`{name}_{uuid}`) of a published plugin.
        #[arg(required_unless_present = "url", conflicts_with = "url")]
        plugin_id: Option<String>,

        /// Archive URL, routed through the server's download proxy.
        #[arg(long)]
        url: Option<String>,
    },
    /// Remove an installed plugin.
    Uninstall {
        /// Plugin name as reported by `phub agent list`.
        name: String,
    },
}
