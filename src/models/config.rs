use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Common short uppercase words that are never reported as tickers.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "I", "THE", "AND", "OF", "TO", "IN", "THAT", "FUCK", "IS", "IT", "FOR", "AS", "WAS", "WITH",
    "BE", "BY", "ON", "NOT", "HE", "THIS", "BUT", "ARE", "OR", "HIS", "AN", "THEY", "WHICH", "AT",
    "ALL", "FROM", "WE", "HAS", "NO", "WERE", "SO", "IF", "OUT", "UP", "A",
];

/// Common English words left out of the word-cloud feed.
pub const DEFAULT_CLOUD_STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "but", "by", "can", "could", "did", "do", "does",
    "doing", "don't", "for", "from", "get", "had", "has", "have", "he", "her", "here", "him",
    "his", "how", "i", "if", "in", "into", "is", "it", "it's", "its", "just", "like", "me", "more",
    "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other",
    "our", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "them", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// Run configuration for a board scan. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Board short name (e.g. "biz")
    pub board: String,
    /// Threads created at or before `now - lookback_days` are skipped
    pub lookback_days: u32,
    /// Hard ceiling on collected records
    pub max_records: usize,
    /// Pause after each qualifying thread
    pub request_delay_ms: u64,
    /// Excluded ticker candidates (case-sensitive)
    pub stopwords: Vec<String>,
    /// Root of the read-only board JSON API
    pub api_base_url: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
    /// Size of the top-ticker slice in the summary
    pub top_n: usize,
    /// Number of sentiment histogram bins
    pub histogram_bins: usize,
    /// Words kept in the word-cloud frequency feed
    pub word_cloud_max_words: usize,
    /// Words dropped from the word-cloud feed (case-insensitive)
    pub cloud_stopwords: Vec<String>,
    /// Extra or overriding sentiment lexicon entries, word to polarity
    pub sentiment_lexicon: BTreeMap<String, f64>,
    /// Ticker whose sentiment table is included in the summary
    pub focus_ticker: Option<String>,
    /// Directory receiving the dataset CSV and summary JSON
    pub output_dir: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            board: "biz".to_string(),
            lookback_days: 7,
            max_records: 500,
            request_delay_ms: 1000,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            api_base_url: "https://a.4cdn.org".to_string(),
            request_timeout_secs: None,
            top_n: 15,
            histogram_bins: 20,
            word_cloud_max_words: 200,
            cloud_stopwords: DEFAULT_CLOUD_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            sentiment_lexicon: BTreeMap::new(),
            focus_ticker: None,
            output_dir: "output".to_string(),
        }
    }
}

impl ScanConfig {
    /// Load a JSON config file. Missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::FileRead(format!("{}: {}", path.display(), e)))?;
        let config: ScanConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.board.is_empty() {
            return Err(AppError::InvalidConfig("board name is empty".into()));
        }
        if !self.board.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::InvalidConfig(format!(
                "board name must be alphanumeric: {}",
                self.board
            )));
        }
        if self.histogram_bins == 0 {
            return Err(AppError::InvalidConfig("histogram_bins must be at least 1".into()));
        }
        if self.top_n == 0 {
            return Err(AppError::InvalidConfig("top_n must be at least 1".into()));
        }
        Ok(())
    }

    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.lookback_days))
    }

    pub fn request_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }

    pub fn stopword_set(&self) -> StopwordSet {
        StopwordSet::new(self.stopwords.iter().cloned())
    }

    pub fn cloud_stopword_set(&self) -> StopwordSet {
        StopwordSet::new(self.cloud_stopwords.iter().cloned())
    }
}

/// Case-sensitive set of words excluded from ticker candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Entries that can never match a ticker candidate (not 2-4 uppercase ASCII letters).
    /// Sorted for stable log output.
    pub fn inert_entries(&self) -> Vec<&str> {
        let mut inert: Vec<&str> = self
            .iter()
            .filter(|w| {
                !((2..=4).contains(&w.len()) && w.bytes().all(|b| b.is_ascii_uppercase()))
            })
            .collect();
        inert.sort_unstable();
        inert
    }
}
