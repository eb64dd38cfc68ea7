//! podmatch — run the PodGrid allocation matcher from the command line.
//!
//! # Usage
//!
//! ```text
//! podmatch init --inventory inventory.redb
//! podmatch seed --inventory rack.json --db inventory.redb
//! podmatch match --db inventory.redb --request node.json
//! podmatch select-pool --db inventory.redb --capacity-gib 100 --protocol NVMeOverFabrics
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pod_core::EngineConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "podmatch",
    about = "PodGrid — composable node allocation matcher",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to podgrid.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a podgrid.toml with every default spelled out
    Init {
        #[arg(short, long, default_value = "podgrid.toml")]
        path: PathBuf,
        /// Inventory database the scaffold points at
        #[arg(long, default_value = "inventory.redb")]
        inventory: PathBuf,
    },
    /// Load a JSON inventory document into a redb database
    Seed {
        /// Inventory document (JSON)
        #[arg(short, long)]
        inventory: PathBuf,
        /// Database file (default: [inventory] path from podgrid.toml)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print the systems able to satisfy a node request
    Match {
        /// Node request (JSON)
        #[arg(short, long)]
        request: PathBuf,
        #[command(flatten)]
        source: commands::InventorySource,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Pick a storage pool for a remote drive
    SelectPool {
        #[arg(long)]
        capacity_gib: f64,
        /// Protocol name, e.g. NVMeOverFabrics or iSCSI
        #[arg(long)]
        protocol: String,
        #[command(flatten)]
        source: commands::InventorySource,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    init_tracing(&config, cli.log_json)?;

    match cli.command {
        Commands::Init { path, inventory } => commands::init(&path, &inventory),
        Commands::Seed { inventory, db } => commands::seed(&config, &inventory, db.as_deref()),
        Commands::Match {
            request,
            source,
            format,
        } => commands::match_request(&config, &source, &request, &format),
        Commands::SelectPool {
            capacity_gib,
            protocol,
            source,
        } => commands::select_pool(&config, &source, capacity_gib, &protocol),
    }
}

fn init_tracing(config: &EngineConfig, json: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.log_filter())
            .with_context(|| format!("invalid log filter {:?}", config.log_filter()))?,
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json || config.log_json() {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}
