use anyhow::Context;
use clap::Parser;

mod cli;
mod client;
mod commands;
mod output;
mod progress;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("phub error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let serving = matches!(cli.command, cli::Commands::Serve(_));
    init_tracing(cli.quiet, cli.verbose, serving)?;

    let flags = cli.global_flags();
    let config = hub_config::HubConfig::load_with_dotenv().context("failed to load configuration")?;
    commands::dispatch::dispatch(cli.command, &flags, &config).await
}

fn init_tracing(quiet: bool, verbose: bool, serving: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else if serving {
        "info"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PLUGHUB_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
