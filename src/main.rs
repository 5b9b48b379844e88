//! ocr-geoparser - place-name extraction from OCR'd video frames
//!
//! Reads an OCR transcript log, clusters on-screen text fragments into
//! candidate location strings and resolves them against a gazetteer into a
//! geo-referenced result table.

mod cluster;
mod config;
mod error;
mod gazetteer;
mod geometry;
mod ocr;
mod pipeline;
mod report;
mod resolve;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::gazetteer::SqliteGazetteer;

/// ocr-geoparser - geo-reference place names found in video frames
#[derive(Parser, Debug)]
#[command(name = "ocr-geoparser")]
#[command(about = "Extracts and geo-references place names from OCR logs of video frames")]
struct Args {
    /// Path to the semicolon-delimited OCR log
    ocr_log: PathBuf,

    /// Directory receiving the CSV and snapshot artifacts
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Video name embedded in the snapshot filename
    #[arg(short, long, default_value = "video")]
    video_name: String,

    /// Gazetteer SQLite database (overrides the configured path)
    #[arg(short, long)]
    gazetteer_db: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("ocr-geoparser starting...");

    let mut config = load_or_default_config(args.config.as_deref());
    if let Some(db_path) = args.gazetteer_db {
        config.gazetteer.db_path = db_path;
    }

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Could not create output directory {:?}", args.output_dir))?;

    let store = SqliteGazetteer::open(config.gazetteer.clone())
        .with_context(|| format!("Could not open gazetteer {:?}", config.gazetteer.db_path))?;

    let table = pipeline::run(
        &args.ocr_log,
        &args.output_dir,
        &args.video_name,
        store,
        &config,
    )?;

    info!("Run finished with {} result rows", table.len());

    Ok(())
}

/// Load configuration from file or fall back to defaults
fn load_or_default_config(explicit: Option<&Path>) -> AppConfig {
    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => config::default_config_path().ok(),
    };
    if let Some(config_path) = config_path {
        if config_path.exists() {
            match config::load_config(&config_path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", config_path);
                    return config;
                }
                Err(e) => warn!("Ignoring unreadable config {:?}: {}", config_path, e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}
