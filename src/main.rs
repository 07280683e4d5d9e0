use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use ec_admin::api::ApiClient;
use ec_admin::config;
use ec_admin::console::{self, Command};
use ec_admin::session::SessionStore;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let session = SessionStore::open(&cfg.session.data_dir)?;
    let client = ApiClient::from_config(&cfg, session)?;
    let poll_interval = Duration::from_millis(cfg.notifications.poll_interval_ms);

    console::run(&client, poll_interval, args.command).await
}
