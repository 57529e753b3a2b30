use chrono::{DateTime, Utc};
use polars::prelude::*;
use tracing::info;

use crate::data::board::BoardSource;
use crate::errors::AppError;
use crate::models::config::{ScanConfig, StopwordSet};
use crate::models::record::{Dataset, Record, DATASET_COLUMNS};
use crate::models::result::CollectionStats;

use super::collector::collect_recent;
use super::sentiment::SentimentScorer;
use super::tickers::extract_tickers;

/// Fill `tickers` and `sentiment` of every record from its post content.
/// Records are kept in order, including those with no tickers.
pub fn enrich(dataset: &mut Dataset, stopwords: &StopwordSet, scorer: &SentimentScorer) {
    for record in dataset.records_mut() {
        enrich_record(record, stopwords, scorer);
    }
}

fn enrich_record(record: &mut Record, stopwords: &StopwordSet, scorer: &SentimentScorer) {
    record.tickers = extract_tickers(&record.post_content, stopwords);
    record.sentiment = scorer.score(&record.post_content);
}

/// Collect recent posts from `source` and enrich them.
pub fn assemble<S: BoardSource + ?Sized>(
    source: &S,
    config: &ScanConfig,
    scorer: &SentimentScorer,
    now: DateTime<Utc>,
) -> Result<(Dataset, CollectionStats), AppError> {
    let stopwords = config.stopword_set();
    let (mut dataset, stats) = collect_recent(source, config, now)?;
    enrich(&mut dataset, &stopwords, scorer);

    let with_tickers = dataset.records().iter().filter(|r| !r.tickers.is_empty()).count();
    info!(
        "Assembled {} records ({} mention at least one ticker)",
        dataset.len(),
        with_tickers
    );
    Ok((dataset, stats))
}

/// Materialize the dataset as a table with the output column layout.
pub fn dataset_to_dataframe(dataset: &Dataset) -> Result<DataFrame, AppError> {
    let records = dataset.records();
    let [thread_id, thread_title, creation_time, post_id, post_content, tickers, sentiment] =
        DATASET_COLUMNS;

    let ticker_column = if records.is_empty() {
        Series::new_empty(tickers.into(), &DataType::List(Box::new(DataType::String)))
    } else {
        let lists: Vec<Series> = records
            .iter()
            .map(|r| Series::new(PlSmallStr::EMPTY, r.tickers.as_slice()))
            .collect();
        Series::new(tickers.into(), lists)
    };

    let columns: Vec<Column> = vec![
        Series::new(
            thread_id.into(),
            records.iter().map(|r| r.thread_id).collect::<Vec<u64>>(),
        )
        .into(),
        Series::new(
            thread_title.into(),
            records.iter().map(|r| r.thread_title.as_str()).collect::<Vec<&str>>(),
        )
        .into(),
        Series::new(
            creation_time.into(),
            records.iter().map(|r| r.thread_creation_time.as_str()).collect::<Vec<&str>>(),
        )
        .into(),
        Series::new(post_id.into(), records.iter().map(|r| r.post_id).collect::<Vec<u64>>()).into(),
        Series::new(
            post_content.into(),
            records.iter().map(|r| r.post_content.as_str()).collect::<Vec<&str>>(),
        )
        .into(),
        ticker_column.into(),
        Series::new(
            sentiment.into(),
            records.iter().map(|r| r.sentiment).collect::<Vec<f64>>(),
        )
        .into(),
    ];

    Ok(DataFrame::new(columns)?)
}
