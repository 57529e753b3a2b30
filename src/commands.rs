use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use polars::prelude::{AnyValue, DataFrame, PolarsResult};
use serde_json::Value;
use tracing::{info, warn};

use crate::data::board::{BoardSource, ChanClient};
use crate::engine::aggregator;
use crate::engine::assembler::{assemble, dataset_to_dataframe};
use crate::engine::sentiment::SentimentScorer;
use crate::errors::AppError;
use crate::models::config::ScanConfig;
use crate::models::record::Dataset;
use crate::models::result::{CollectionStats, DashboardSummary};
use crate::utils::export;

/// Rows of the table view embedded in the summary.
pub const PREVIEW_ROWS: usize = 20;

/// Paths written by a scan, plus the summary itself.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub dataset_path: PathBuf,
    pub tickers_path: PathBuf,
    pub summary_path: PathBuf,
    pub summary: DashboardSummary,
}

// ── Scan Commands ──

/// Scan the configured board over the network and export the results.
pub fn run_scan(config: &ScanConfig) -> Result<ScanReport, AppError> {
    config.validate()?;
    let client = ChanClient::new(&config.api_base_url, config.request_timeout())?;
    scan_with_source(&client, config, Utc::now())
}

/// Collect, enrich, aggregate and export using any board source.
///
/// Nothing is written unless collection completes.
pub fn scan_with_source<S: BoardSource + ?Sized>(
    source: &S,
    config: &ScanConfig,
    now: DateTime<Utc>,
) -> Result<ScanReport, AppError> {
    info!(
        "Scanning /{}/: lookback={}d, cap={}, delay={}ms",
        config.board, config.lookback_days, config.max_records, config.request_delay_ms
    );

    let inert = config.stopword_set().inert_entries().join(", ");
    if !inert.is_empty() {
        warn!("Stopwords that can never match a ticker: {}", inert);
    }

    // 1. Collect and enrich
    let scorer = SentimentScorer::new().with_entries(config.sentiment_lexicon.clone());
    let (dataset, stats) = assemble(source, config, &scorer, now)?;

    // 2. Materialize the table once
    let df = dataset_to_dataframe(&dataset)?;
    let preview = preview_rows(&df.head(Some(PREVIEW_ROWS)))?;

    // 3. Aggregate
    let summary = summarize(&dataset, config, stats, preview, now);

    // 4. Export
    let out_dir = PathBuf::from(&config.output_dir);
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| AppError::FileWrite(format!("{}: {}", out_dir.display(), e)))?;
    let dataset_path = out_dir.join("dataset.csv");
    let tickers_path = out_dir.join("ticker_counts.csv");
    let summary_path = out_dir.join("summary.json");

    export::write_dataset_csv(dataset.records(), &dataset_path)?;
    export::write_ticker_counts_csv(&summary.ticker_counts, &tickers_path)?;
    export::write_summary_json(&summary, &summary_path)?;
    info!(
        "Wrote {}, {} and {}",
        dataset_path.display(),
        tickers_path.display(),
        summary_path.display()
    );

    Ok(ScanReport {
        dataset_path,
        tickers_path,
        summary_path,
        summary,
    })
}

/// Derive every presentation view from the enriched dataset.
pub fn summarize(
    dataset: &Dataset,
    config: &ScanConfig,
    collection: CollectionStats,
    preview: Vec<Value>,
    now: DateTime<Utc>,
) -> DashboardSummary {
    let records = dataset.records();
    let ticker_counts = aggregator::ticker_counts(records);
    let ticker_universe = aggregator::ticker_universe(records);

    let focus = config.focus_ticker.as_deref().map(|ticker| {
        if !ticker_universe.iter().any(|t| t == ticker) {
            warn!("Focus ticker {} was not mentioned in any post", ticker);
        }
        aggregator::ticker_sentiment(records, ticker)
    });

    DashboardSummary {
        board: config.board.clone(),
        generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        total_records: records.len(),
        top_tickers: aggregator::top_tickers(records, config.top_n),
        ticker_counts,
        sentiment_histogram: aggregator::sentiment_histogram(records, config.histogram_bins),
        ticker_universe,
        word_frequencies: aggregator::word_frequencies(
            records,
            &config.cloud_stopword_set(),
            config.word_cloud_max_words,
        ),
        focus,
        collection,
        preview,
    }
}

// ── Helpers ──

/// One JSON object per table row, keyed by column name.
fn preview_rows(df: &DataFrame) -> Result<Vec<Value>, AppError> {
    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let row = df
            .get_columns()
            .iter()
            .map(|col| Ok((col.name().to_string(), cell_to_json(&col.get(i)?))))
            .collect::<PolarsResult<serde_json::Map<String, Value>>>()?;
        rows.push(Value::Object(row));
    }
    Ok(rows)
}

/// Cell values the dataset table holds: ids, text, scores and ticker lists.
fn cell_to_json(cell: &AnyValue) -> Value {
    match cell {
        AnyValue::UInt64(n) => Value::from(*n),
        AnyValue::Float64(f) => Value::from(*f),
        AnyValue::String(s) => Value::from(*s),
        AnyValue::List(items) => items
            .str()
            .map(|ca| ca.into_iter().map(|t| Value::from(t.unwrap_or_default())).collect())
            .unwrap_or_else(|_| Value::Array(Vec::new())),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::data::fake::FakeBoard;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn board() -> FakeBoard {
        FakeBoard::new()
            .thread(
                1,
                now(),
                Duration::hours(5),
                &["BTC is mooning, IMO THE SEC will act", "BTC and ETH, great news!"],
            )
            .thread(2, now(), Duration::days(10), &["OLD thread about XRP"])
            .thread(3, now(), Duration::hours(1), &["ETH is a terrible scam", "pic related"])
    }

    fn config(out: &std::path::Path) -> ScanConfig {
        ScanConfig {
            request_delay_ms: 0,
            focus_ticker: Some("ETH".to_string()),
            output_dir: out.to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_scan_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let report = scan_with_source(&board(), &config(dir.path()), now()).unwrap();
        assert!(report.dataset_path.exists());
        assert!(report.tickers_path.exists());
        assert!(report.summary_path.exists());

        let s = &report.summary;
        assert_eq!(s.total_records, 4);
        assert_eq!(s.collection.threads_skipped, 1);
        assert_eq!(s.top_tickers[0].ticker, "BTC");
        assert_eq!(s.top_tickers[0].count, 2);
        assert_eq!(s.ticker_universe, vec!["BTC", "IMO", "SEC", "ETH"]);
        assert!(!s.ticker_universe.contains(&"XRP".to_string()));
        assert_eq!(s.sentiment_histogram.len(), 20);
        assert_eq!(s.sentiment_histogram.iter().map(|b| b.count).sum::<usize>(), 4);
        assert_eq!(s.generated_at, "2024-06-15T12:00:00Z");

        let focus = s.focus.as_ref().unwrap();
        assert_eq!(focus.ticker, "ETH");
        assert_eq!(focus.points.len(), 2);
        assert!(focus.points[1].sentiment < 0.0);
    }

    #[test]
    fn test_preview_rows_match_table_layout() {
        let dir = tempfile::tempdir().unwrap();
        let report = scan_with_source(&board(), &config(dir.path()), now()).unwrap();
        let preview = &report.summary.preview;
        assert_eq!(preview.len(), 4);
        assert_eq!(preview[0]["Thread ID"], 1);
        assert_eq!(preview[0]["Thread Creation Time"], "15/06/2024");
        assert_eq!(preview[0]["Tickers"], serde_json::json!(["BTC", "IMO", "SEC"]));
        assert_eq!(preview[3]["Post Content"], "pic related");
        assert_eq!(preview[3]["Tickers"], serde_json::json!([]));
    }

    #[test]
    fn test_word_cloud_drops_common_english() {
        let dir = tempfile::tempdir().unwrap();
        let report = scan_with_source(&board(), &config(dir.path()), now()).unwrap();
        let words: Vec<&str> = report
            .summary
            .word_frequencies
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(words[0], "btc");
        assert!(words.contains(&"mooning"));
        assert!(!words.contains(&"the"));
        assert!(!words.contains(&"is"));
        assert!(!words.contains(&"and"));
    }

    #[test]
    fn test_lexicon_overrides_reach_scores() {
        let dir = tempfile::tempdir().unwrap();
        let board = FakeBoard::new().thread(1, now(), Duration::hours(1), &["BTC lambo soon"]);
        let plain = scan_with_source(&board, &config(dir.path()), now()).unwrap();
        assert_eq!(plain.summary.preview[0]["Sentiment"], 0.0);

        let mut cfg = config(dir.path());
        cfg.sentiment_lexicon.insert("lambo".to_string(), 0.8);
        let tuned = scan_with_source(&board, &cfg, now()).unwrap();
        assert_eq!(tuned.summary.preview[0]["Sentiment"], 0.8);
    }

    #[test]
    fn test_failed_scan_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let board = board().failing(3);
        let err = scan_with_source(&board, &config(&out), now()).unwrap_err();
        assert_eq!(err.code(), "BOARD_STATUS");
        assert!(!out.exists());
    }

    #[test]
    fn test_empty_board() {
        let dir = tempfile::tempdir().unwrap();
        let report = scan_with_source(&FakeBoard::new(), &config(dir.path()), now()).unwrap();
        assert_eq!(report.summary.total_records, 0);
        assert!(report.summary.sentiment_histogram.is_empty());
        assert!(report.summary.ticker_counts.is_empty());
        assert!(report.summary.focus.as_ref().unwrap().points.is_empty());
    }

    #[test]
    fn test_run_scan_rejects_invalid_config() {
        let cfg = ScanConfig {
            board: "b i z".to_string(),
            ..Default::default()
        };
        assert!(matches!(run_scan(&cfg), Err(AppError::InvalidConfig(_))));
    }
}
