#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the court enrichment pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use court_map_cluster::ClusterMode;
use court_map_database::db;
use court_map_geocoder::provider::FacilitySearchProvider;
use court_map_pipeline::{
    DEFAULT_MAX_CONCURRENT_SEARCHES, EnrichOptions, EnrichStats, ExecutionMode,
    assign_individual_names, build_http_client, enrich, load_courts,
};

/// Default public Photon instance.
const DEFAULT_PHOTON_BASE_URL: &str = "https://photon.komoot.io";

#[derive(Parser)]
#[command(name = "court_map_pipeline", about = "Court facility enrichment pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct EnrichArgs {
    /// Path to the input GeoJSON feature collection of courts
    input: PathBuf,
    /// Maximum number of courts to process (for testing)
    #[arg(long)]
    limit: Option<usize>,
    /// Resolve one search at a time with a courtesy delay instead of
    /// concurrently (use against public API instances)
    #[arg(long)]
    sequential: bool,
    /// Cluster purely by proximity, ignoring sport
    #[arg(long)]
    any_sport: bool,
    /// Clustering radius in kilometers
    #[arg(long, default_value = "0.05")]
    max_distance_km: f64,
    /// Records per persistence batch
    #[arg(long, default_value = "100")]
    batch_size: usize,
    /// Clusters resolved concurrently per chunk
    #[arg(long, default_value = "20")]
    chunk_size: usize,
    /// Delay between searches in sequential mode, in milliseconds
    #[arg(long, default_value = "1000")]
    rate_limit_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich courts from a GeoJSON extract with facility names
    Enrich {
        #[command(flatten)]
        args: EnrichArgs,
    },
    /// Assign "Court N" labels to courts sharing a facility and sport
    AssignNames,
    /// Run enrichment followed by the naming pass
    Run {
        #[command(flatten)]
        args: EnrichArgs,
    },
}

impl EnrichArgs {
    fn to_options(&self) -> EnrichOptions {
        EnrichOptions {
            mode: if self.sequential {
                ExecutionMode::Sequential
            } else {
                ExecutionMode::Concurrent
            },
            cluster_mode: if self.any_sport {
                ClusterMode::Distance
            } else {
                ClusterMode::SportAndDistance
            },
            max_distance_km: self.max_distance_km,
            chunk_size: self.chunk_size,
            batch_size: self.batch_size,
            rate_limit_ms: self.rate_limit_ms,
            limit: self.limit,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let db = db::connect_from_env().await?;

    match cli.command {
        Commands::Enrich { args } => {
            run_enrich(db.as_ref(), &args).await?;
        }
        Commands::AssignNames => {
            assign_individual_names(db.as_ref()).await?;
        }
        Commands::Run { args } => {
            run_enrich(db.as_ref(), &args).await?;

            if let Err(e) = assign_individual_names(db.as_ref()).await {
                log::error!("Naming pass failed (enriched data is persisted): {e}");
                return Err(e);
            }
        }
    }

    Ok(())
}

async fn run_enrich(
    db: &dyn switchy_database::Database,
    args: &EnrichArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var("PHOTON_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_PHOTON_BASE_URL.to_string());

    let client = build_http_client()?;
    let provider = FacilitySearchProvider::new(client, base_url, DEFAULT_MAX_CONCURRENT_SEARCHES);

    let options = args.to_options();
    let stats = EnrichStats::default();

    let courts = load_courts(&args.input, &stats)?;
    enrich(db, &provider, courts, &options, &stats).await
}
