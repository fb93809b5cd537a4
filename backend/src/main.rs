//! JKPTG CLI - serve or query the license datasets
//!
//! # Main Command
//!
//! ```bash
//! jkptg serve                          # Start HTTP server (port 8000)
//! ```
//!
//! # Offline Queries (same pipelines as the API, JSON on stdout)
//!
//! ```bash
//! jkptg ships --concession selangor    # /shiplist
//! jkptg licenses --region pahang       # /licenselist
//! jkptg expiring ships                 # /shiplist/expiring
//! jkptg concessions                    # /concessions
//! jkptg regions                        # /regions
//! ```
//!
//! Dataset paths and output switches are global flags with `JKPTG_*`
//! environment fallbacks; a `.env` file is loaded first.

use clap::{Parser, Subcommand, ValueEnum};
use jkptg::{AppConfig, ConfigArgs, LandFilters, QueryService, VesselFilters};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "jkptg")]
#[command(about = "Query API over JKPTG vessel and land license datasets", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "JKPTG_PORT", default_value = "8000")]
        port: u16,
    },

    /// Query vessel licenses
    Ships {
        #[command(flatten)]
        filters: VesselFilters,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Query land licenses
    Licenses {
        #[command(flatten)]
        filters: LandFilters,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Licenses with days remaining, soonest expiry first
    Expiring {
        /// Dataset to list
        #[arg(value_enum)]
        dataset: ExpiringDataset,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List distinct concessions
    Concessions,

    /// List distinct regions
    Regions,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExpiringDataset {
    Ships,
    Licenses,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present) before flags read their env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from(cli.config);

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(port, config).await,
        Commands::Ships { filters, output } => cmd_ships(config, &filters, output.as_deref()).await,
        Commands::Licenses { filters, output } => {
            cmd_licenses(config, &filters, output.as_deref()).await
        }
        Commands::Expiring { dataset, output } => {
            cmd_expiring(config, dataset, output.as_deref()).await
        }
        Commands::Concessions => cmd_concessions(config).await,
        Commands::Regions => cmd_regions(config).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: u16, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    jkptg::server::start_server(port, config).await
}

async fn cmd_ships(
    config: AppConfig,
    filters: &VesselFilters,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = QueryService::new(config).ships(filters).await?;
    eprintln!("🚢 {} vessel licenses", rows.len());
    write_json(&rows, output)
}

async fn cmd_licenses(
    config: AppConfig,
    filters: &LandFilters,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listing = QueryService::new(config).licenses(filters).await?;
    eprintln!("📍 {} land licenses", listing.record_count());
    write_json(&listing, output)
}

async fn cmd_expiring(
    config: AppConfig,
    dataset: ExpiringDataset,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = QueryService::new(config);
    eprintln!("📅 Days remaining as of {}", service.today());

    match dataset {
        ExpiringDataset::Ships => write_json(&service.ships_expiring().await?, output),
        ExpiringDataset::Licenses => write_json(&service.licenses_expiring().await?, output),
    }
}

async fn cmd_concessions(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let values = QueryService::new(config).concessions().await?;
    write_json(&values, None)
}

async fn cmd_regions(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let values = QueryService::new(config).regions().await?;
    write_json(&values, None)
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string_pretty(value)?;
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
