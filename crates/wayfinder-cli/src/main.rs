//! Wayfinder CLI - Command line interface for indoor navigation

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod lookup;
mod output;

use commands::{completions, edge, io, node, route};
use config::Config;
use output::OutputFormat;
use wayfinder_router::{RouteConfig, RouteService};
use wayfinder_storage::{StorageBackend, StorageProvider};

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(author, version, about = "Indoor navigation routing over a building graph")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true, env = "WAYFINDER_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Output format: table, json
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Storage backend
    #[arg(long, value_enum, default_value = "redb", global = true)]
    pub backend: Backend,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Redb,
    Sqlite,
}

impl Cli {
    /// Get the data directory path
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.data_dir())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage nodes
    Node(node::NodeArgs),
    /// Manage edges
    Edge(edge::EdgeArgs),
    /// Find the shortest route between two nodes
    Route(route::RouteArgs),
    /// Import a building graph from JSON
    Import(io::ImportArgs),
    /// Export the building graph as JSON
    Export(io::ExportArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with storage backend
pub struct AppContext {
    pub storage: Arc<dyn StorageBackend>,
    pub config: Config,
    pub format: OutputFormat,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let data_dir = cli.data_dir(&config);
        std::fs::create_dir_all(&data_dir)?;

        let storage = open_storage(cli.backend, &data_dir)?;
        storage.initialize().await?;

        let format = cli
            .format
            .as_deref()
            .unwrap_or(config.default_format.as_str())
            .into();

        Ok(Self {
            storage,
            config,
            format,
        })
    }

    /// Route service reading straight from storage
    pub fn router(&self) -> anyhow::Result<RouteService<StorageProvider<dyn StorageBackend>>> {
        let route_config =
            RouteConfig::default().with_meters_per_floor(self.config.meters_per_floor);
        Ok(RouteService::with_config(
            StorageProvider::new(Arc::clone(&self.storage)),
            route_config,
        )?)
    }
}

fn open_storage(backend: Backend, data_dir: &std::path::Path) -> anyhow::Result<Arc<dyn StorageBackend>> {
    match backend {
        #[cfg(feature = "redb")]
        Backend::Redb => {
            let db_path = data_dir.join("wayfinder.redb");
            tracing::debug!("Using database at: {:?}", db_path);
            Ok(Arc::new(wayfinder_storage::RedbStorage::open(&db_path)?))
        }
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => {
            let db_path = data_dir.join("wayfinder.sqlite");
            tracing::debug!("Using database at: {:?}", db_path);
            Ok(Arc::new(wayfinder_storage::SqliteStorage::open(&db_path)?))
        }
        #[allow(unreachable_patterns)]
        _ => anyhow::bail!("Backend not enabled. Rebuild with the matching cargo feature"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting wayfinder CLI");

    match &cli.command {
        Commands::Config(args) => return commands::config::run(args).await,
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let ctx = AppContext::new(&cli, Config::load()).await?;

    match &cli.command {
        Commands::Node(args) => node::run(args, &cli, &ctx).await?,
        Commands::Edge(args) => edge::run(args, &cli, &ctx).await?,
        Commands::Route(args) => route::run(args, &cli, &ctx).await?,
        Commands::Import(args) => io::run_import(args, &cli, &ctx).await?,
        Commands::Export(args) => io::run_export(args, &cli, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    ctx.storage.close().await?;
    Ok(())
}
