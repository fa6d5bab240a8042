mod board;
mod command;
mod config;
mod context;
mod dashboard;
mod error;
mod fetch;
mod filter;
mod normalize;
mod output;
mod page;
mod progress;
mod render;
mod schedule;


use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use command::{render::RenderArgs, search::SearchArgs, watch::WatchArgs, Command};
use config::Config;
use context::Context;

#[derive(Parser, Debug)]
#[command(version, about = "Live stats pages for a PvPGN game server portal")]
struct Cli {
    #[command(flatten)]
    config: Config,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a page once.
    Render(RenderArgs),
    /// Keep a page up to date until interrupted.
    Watch(WatchArgs),
    /// List the searchable entries of a page matching a needle.
    Search(SearchArgs),
}

impl Commands {
    fn as_command(&self) -> &(dyn Command + Send + Sync) {
        match self {
            Commands::Render(args) => args,
            Commands::Watch(args) => args,
            Commands::Search(args) => args,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, file_error) = match Config::load(cli.config.clone()) {
        Ok(config) => (config, None),
        Err(e) => (cli.config, Some(e)),
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(e) = file_error {
        tracing::warn!("ignoring config file: {e:#}");
    }
    tracing::debug!(base_url = config.base_url(), "configuration loaded");

    let mut context = Context::new(config)?;
    cli.command.as_command().run(&mut context).await
}
