//! pkgscope - browse a package registry snapshot from the terminal
//!
//! Every command works on one in-memory dataset. Search state is driven
//! through the same URL query strings a web front end would share, so a
//! `--url` copied from one run restores the exact same page in another.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pkgscope_core::catalog::{Catalogs, Dataset};
use pkgscope_core::config::ExplorerConfig;

mod detail_cli;
mod search_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "pkgscope",
    about = "Search and inspect a package registry snapshot",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    log_json: bool,

    /// Override configuration file path
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Load packages from this JSON file instead of the configured dataset
    #[clap(long, global = true)]
    dataset: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Search the latest-version catalog
    Search(search_cli::SearchArgs),

    /// Show one release on a detail tab
    Show(detail_cli::ShowArgs),

    /// List every release of a package, newest first
    Versions {
        /// Package name
        name: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// List configured catalogs and their sizes
    Catalogs {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// List filter options and per-value counts
    Facets {
        /// Catalog to count (defaults to the configured default index)
        #[clap(long)]
        catalog: Option<String>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Dataset, catalogs and config shared by every command
pub struct Explorer {
    pub config: ExplorerConfig,
    pub dataset: Arc<Dataset>,
    pub catalogs: Arc<Catalogs>,
}

impl Explorer {
    fn load(config_path: Option<PathBuf>, dataset_path: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                ExplorerConfig::load_from_path(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
            }
            None => match ExplorerConfig::default_path() {
                Some(path) => ExplorerConfig::load_from_path(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?,
                None => {
                    debug!("No config directory on this platform, using defaults");
                    ExplorerConfig::default()
                }
            },
        };

        if let Some(path) = dataset_path {
            config.dataset = Some(path);
        }

        let dataset = config.load_dataset().with_context(|| match &config.dataset {
            Some(path) => format!("Failed to load dataset from {}", path.display()),
            None => "Failed to load bundled dataset".to_string(),
        })?;
        let catalogs = config
            .catalogs()
            .context("Invalid catalog configuration")?;

        info!(
            records = dataset.len(),
            names = dataset.name_count(),
            catalogs = catalogs.definitions().len(),
            "Dataset ready"
        );

        Ok(Self {
            config,
            dataset: Arc::new(dataset),
            catalogs: Arc::new(catalogs),
        })
    }
}

fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        // stdout carries command output only
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    let explorer = Explorer::load(cli.config, cli.dataset)?;

    match cli.command {
        Command::Search(args) => search_cli::execute_search(&explorer, args),
        Command::Show(args) => detail_cli::execute_show(&explorer, args),
        Command::Versions { name, json } => detail_cli::execute_versions(&explorer, &name, json),
        Command::Catalogs { json } => search_cli::execute_catalogs(&explorer, json),
        Command::Facets { catalog, json } => {
            let key = catalog.unwrap_or_else(|| explorer.config.default_index.clone());
            search_cli::execute_facets(&explorer, &key, json)
        }
    }
}
