use anyhow::Result;
use clap::{Parser, Subcommand};
use netforge_cli::commands;
use netforge_core::model::ProjectId;
use netforge_core::topology::DEFAULT_PAGE_LIMIT;
use netforge_core::{init_logging_with_config, Config, LogConfig, TopologyStore};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "netforge")]
#[command(author, version, about = "netforge database operations", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or upgrade the database schema
    Migrate,

    /// List a user's projects
    Projects {
        #[arg(long)]
        user: String,

        #[arg(long, default_value_t = 0)]
        skip: u32,

        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },

    /// Print a project's topology as JSON
    Export {
        #[arg(long)]
        user: String,

        #[arg(long)]
        project: i64,
    },

    /// Replace a project's topology from a JSON file
    Import {
        #[arg(long)]
        user: String,

        #[arg(long)]
        project: i64,

        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    config.validate()?;

    init_logging_with_config(LogConfig::try_from(&config.logging)?)?;
    debug!(?config, "loaded configuration");

    let store = Arc::new(TopologyStore::open(&config.store)?);
    let mut out = io::stdout().lock();

    match args.command {
        Command::Migrate => commands::migrate(&store, &mut out),
        Command::Projects { user, skip, limit } => {
            commands::list_projects(&store, &user, skip, limit, &mut out)
        }
        Command::Export { user, project } => {
            commands::export_topology(store, &user, ProjectId(project), &mut out)
        }
        Command::Import { user, project, file } => commands::import_topology(
            store,
            config.topology.link_policy,
            &user,
            ProjectId(project),
            &file,
            &mut out,
        ),
    }
}
