//! Weather Station Ingestion Service - Main Daemon
//!
//! A server-side daemon that periodically:
//! 1. Reads the sensor, GPS and rain gauge files the station loggers write
//! 2. Normalizes them into time-series points
//! 3. Writes every point to InfluxDB (or PostgreSQL)
//!
//! Usage:
//!   cargo run --release                          # Run forever, every poll interval
//!   cargo run --release -- --once                # Single cycle, then exit
//!   cargo run --release -- --once --dry-run      # Print line protocol instead of writing
//!   cargo run --release -- --source gps --once   # Only ingest one configured source
//!
//! Environment:
//!   INFLUX_URL, INFLUX_DATABASE, INFLUX_USERNAME, INFLUX_PASSWORD - store overrides
//!   DATABASE_URL - PostgreSQL connection string (postgres backend)
//!   RUST_LOG     - log filter (default: info)

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use station_ingest::config::{self, DEFAULT_CONFIG_PATH};
use station_ingest::daemon::{log_cycle_summary, Daemon};
use station_ingest::store::{self, PointSink, StdoutSink, StoreWriter};

#[derive(Parser)]
#[command(name = "station_ingest")]
#[command(author, version, about = "Ingest weather station sensor files into a time-series store")]
struct Cli {
    /// Path to the ingest.toml config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Run a single ingestion cycle and exit
    #[arg(long)]
    once: bool,

    /// Print points as line protocol instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Only ingest the configured source with this name
    #[arg(long, value_name = "NAME")]
    source: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("🌦  Weather Station Ingestion Service");
    println!("=====================================\n");

    let mut config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            process::exit(1);
        }
    };

    if let Some(name) = &cli.source {
        if config.source(name).is_none() {
            let known: Vec<_> = config.sources.iter().map(|s| s.name.as_str()).collect();
            eprintln!("❌ Unknown source '{}' (configured: {})", name, known.join(", "));
            process::exit(1);
        }
        config.sources.retain(|s| &s.name == name);
    }

    let sink: Arc<dyn PointSink> = if cli.dry_run {
        Arc::new(StdoutSink)
    } else {
        match store::open_sink(&config.store) {
            Ok(sink) => sink,
            Err(e) => {
                eprintln!("❌ Failed to open store: {}", e);
                process::exit(1);
            }
        }
    };

    let writer = StoreWriter::new(sink, config.store.database.clone());
    let once = cli.once;
    let daemon = Daemon::new(config, writer);

    if let Err(e) = daemon.initialize() {
        error!(error = %e, "store bootstrap failed");
        process::exit(1);
    }

    for source in daemon.sources() {
        info!(
            source = %source.name,
            format = %source.format,
            path = %source.path.display(),
            "configured source"
        );
    }

    if once {
        let results = daemon.run_cycle();
        log_cycle_summary(&results);
        if results.iter().any(|(_, result)| result.is_err()) {
            process::exit(2);
        }
        return;
    }

    println!("🔄 Starting continuous ingestion loop (Ctrl+C to stop)\n");
    if let Err(e) = daemon.run() {
        eprintln!("\n❌ Daemon error: {}", e);
        process::exit(1);
    }
}
