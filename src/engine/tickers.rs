use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::config::StopwordSet;

/// Runs of 2-4 uppercase ASCII letters standing alone as a word.
static TICKER_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,4}\b").expect("Invalid ticker regex"));

/// All ticker-shaped words in `text`, in source order, duplicates kept.
pub fn ticker_candidates(text: &str) -> Vec<&str> {
    TICKER_CANDIDATE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Extract tickers from free text, dropping stopwords.
pub fn extract_tickers(text: &str, stopwords: &StopwordSet) -> Vec<String> {
    ticker_candidates(text)
        .into_iter()
        .filter(|word| !stopwords.contains(word))
        .map(str::to_string)
        .collect()
}
