pub mod commands;
pub mod data;
pub mod engine;
pub mod errors;
pub mod models;
pub mod utils;

use std::path::PathBuf;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::models::config::ScanConfig;

/// Load the run configuration: the JSON file at `path`, or defaults.
fn load_config(path: Option<PathBuf>) -> anyhow::Result<ScanConfig> {
    match path {
        Some(path) => {
            let config = ScanConfig::from_file(&path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(ScanConfig::default()),
    }
}

pub fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting board sentiment scan");

    let config = load_config(config_path)?;

    let report = commands::run_scan(&config).map_err(|e| {
        error!(code = e.code(), "Scan failed: {}", e);
        e
    })?;

    let top = report
        .summary
        .top_tickers
        .iter()
        .map(|t| format!("{}={}", t.ticker, t.count))
        .collect::<Vec<_>>()
        .join(" ");
    info!(
        "Scan complete: {} records, {} distinct tickers, top: {}",
        report.summary.total_records,
        report.summary.ticker_universe.len(),
        top
    );
    Ok(())
}
