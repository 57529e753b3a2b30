use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::config::StopwordSet;
use crate::models::record::Record;
use crate::models::result::{
    HistogramBin, SentimentPoint, TickerCount, TickerSentiment, WordFrequency,
};

static CLOUD_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w[\w']+").expect("Invalid word regex"));

/// Count occurrences of `keys` and rank by count descending.
/// Ties keep first-appearance order.
fn rank_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // Stable sort keeps first-appearance order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Mentions per ticker across all records, most mentioned first.
pub fn ticker_counts(records: &[Record]) -> Vec<TickerCount> {
    let all = records.iter().flat_map(|r| r.tickers.iter().map(String::as_str));
    rank_counts(all)
        .into_iter()
        .map(|(ticker, count)| TickerCount {
            ticker: ticker.to_string(),
            count,
        })
        .collect()
}

/// The `n` most mentioned tickers.
pub fn top_tickers(records: &[Record], n: usize) -> Vec<TickerCount> {
    let mut counts = ticker_counts(records);
    counts.truncate(n);
    counts
}

/// Equal-width histogram of record sentiment over the observed range.
///
/// The last bin includes the maximum. A zero-width range is widened to
/// `[v - 0.5, v + 0.5]`. No records or zero bins yield no bins.
pub fn sentiment_histogram(records: &[Record], bins: usize) -> Vec<HistogramBin> {
    if records.is_empty() || bins == 0 {
        return Vec::new();
    }
    let values: Vec<f64> = records.iter().map(|r| r.sentiment).collect();
    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// Distinct tickers in first-appearance order. Records without tickers contribute nothing.
pub fn ticker_universe(records: &[Record]) -> Vec<String> {
    let universe: IndexSet<&str> = records
        .iter()
        .flat_map(|r| r.tickers.iter().map(String::as_str))
        .filter(|t| !t.is_empty())
        .collect();
    universe.into_iter().map(str::to_string).collect()
}

/// Records whose ticker list contains `ticker`.
pub fn filter_by_ticker<'a>(records: &'a [Record], ticker: &str) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| r.tickers.iter().any(|t| t == ticker))
        .collect()
}

/// Sentiment table for `ticker`.
pub fn ticker_sentiment(records: &[Record], ticker: &str) -> TickerSentiment {
    TickerSentiment {
        ticker: ticker.to_string(),
        points: filter_by_ticker(records, ticker)
            .into_iter()
            .map(|r| SentimentPoint {
                post_id: r.post_id,
                sentiment: r.sentiment,
            })
            .collect(),
    }
}

/// All post contents joined with a single space.
pub fn corpus_text(records: &[Record]) -> String {
    records
        .iter()
        .map(|r| r.post_content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word weights for a word-cloud renderer.
///
/// Words are lowercased with a trailing `'s` removed; `stopwords` (the cloud
/// list, not the ticker list) are compared case-insensitively. Most frequent
/// first, at most `max_words`.
pub fn word_frequencies(
    records: &[Record],
    stopwords: &StopwordSet,
    max_words: usize,
) -> Vec<WordFrequency> {
    let excluded: Vec<String> = stopwords.iter().map(str::to_lowercase).collect();
    let text = corpus_text(records).to_lowercase();
    let words = CLOUD_WORD.find_iter(&text).filter_map(|m| {
        let word = m.as_str();
        let word = word.strip_suffix("'s").unwrap_or(word);
        if word.chars().count() < 2 || excluded.iter().any(|s| s == word) {
            None
        } else {
            Some(word)
        }
    });
    rank_counts(words)
        .into_iter()
        .take(max_words)
        .map(|(word, count)| WordFrequency {
            word: word.to_string(),
            count,
        })
        .collect()
}
