use std::path::Path;

use crate::errors::AppError;
use crate::models::record::{Record, DATASET_COLUMNS};
use crate::models::result::{DashboardSummary, TickerCount};

/// Write the enriched dataset to a CSV file.
///
/// `Tickers` is written as a JSON array string, `Sentiment` with 4 decimals.
pub fn write_dataset_csv(records: &[Record], path: &Path) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::FileWrite(format!("Cannot create CSV: {}", e)))?;

    wtr.write_record(DATASET_COLUMNS)
        .map_err(|e| AppError::FileWrite(e.to_string()))?;

    for r in records {
        wtr.write_record([
            &r.thread_id.to_string(),
            &r.thread_title,
            &r.thread_creation_time,
            &r.post_id.to_string(),
            &r.post_content,
            &serde_json::to_string(&r.tickers)?,
            &format!("{:.4}", r.sentiment),
        ])
        .map_err(|e| AppError::FileWrite(e.to_string()))?;
    }

    wtr.flush().map_err(|e| AppError::FileWrite(e.to_string()))?;
    Ok(())
}

/// Write the full ticker ranking as a two-column CSV.
pub fn write_ticker_counts_csv(counts: &[TickerCount], path: &Path) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::FileWrite(format!("Cannot create CSV: {}", e)))?;

    wtr.write_record(["Ticker", "Count"])
        .map_err(|e| AppError::FileWrite(e.to_string()))?;

    for c in counts {
        wtr.write_record([c.ticker.as_str(), c.count.to_string().as_str()])
            .map_err(|e| AppError::FileWrite(e.to_string()))?;
    }

    wtr.flush().map_err(|e| AppError::FileWrite(e.to_string()))?;
    Ok(())
}

/// Write the dashboard summary as pretty JSON.
pub fn write_summary_json(summary: &DashboardSummary, path: &Path) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)
        .map_err(|e| AppError::FileWrite(format!("Cannot write {}: {}", path.display(), e)))?;
    Ok(())
}
