use anyhow::{Context, Result};
use clap::Parser;
use netforge_api::{ApiServer, AppState};
use netforge_core::{init_logging_with_config, Config, LogConfig, TopologyStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "netforge-api")]
#[command(about = "netforge network topology designer - HTTP API", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    config.validate()?;

    init_logging_with_config(LogConfig::try_from(&config.logging)?)?;

    if config.auth.uses_default_secret() {
        warn!("auth.secret_key is the built-in development key; set NETFORGE_AUTH_SECRET_KEY");
    }

    let store = Arc::new(TopologyStore::open(&config.store).context("opening database")?);
    info!(
        database = %config.store.database_path.display(),
        link_policy = %config.topology.link_policy,
        "netforge API starting"
    );

    let state = Arc::new(AppState::from_config(store, &config));
    ApiServer::new(state, &config.server).run().await?;

    Ok(())
}
