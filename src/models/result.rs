use serde::{Deserialize, Serialize};

/// Mention count for one ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerCount {
    pub ticker: String,
    pub count: usize,
}

/// One bar of the sentiment histogram. `upper` is exclusive except on the last bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// A post mentioning a ticker, with its sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub post_id: u64,
    pub sentiment: f64,
}

/// Sentiment table for one selected ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSentiment {
    pub ticker: String,
    pub points: Vec<SentimentPoint>,
}

/// Word weight fed to a word-cloud renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

/// Counters gathered while walking the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub threads_listed: usize,
    /// Threads created at or before the lookback cutoff
    pub threads_skipped: usize,
    /// Threads whose posts were fetched
    pub threads_visited: usize,
    pub pauses: usize,
    pub records: usize,
    pub cap_reached: bool,
}

/// Everything the presentation layer needs, derived from the enriched dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub board: String,
    pub generated_at: String,
    pub total_records: usize,
    pub top_tickers: Vec<TickerCount>,
    pub ticker_counts: Vec<TickerCount>,
    pub sentiment_histogram: Vec<HistogramBin>,
    pub ticker_universe: Vec<String>,
    pub word_frequencies: Vec<WordFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<TickerSentiment>,
    pub collection: CollectionStats,
    /// First rows of the table view, one JSON object per row
    pub preview: Vec<serde_json::Value>,
}
