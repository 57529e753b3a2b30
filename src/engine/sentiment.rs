//! Lexicon-based polarity scoring.
//!
//! Each known word carries a polarity in [-1, 1]. A preceding intensifier scales
//! it, a negation within the two previous words flips and halves it. The text
//! score is the mean over matched words, clamped to [-1, 1]. Text with no
//! matched words scores 0.0.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?").expect("Invalid word regex"));

static DEFAULT_SCORER: Lazy<SentimentScorer> = Lazy::new(SentimentScorer::new);

/// Score `text` with the default lexicon.
pub fn score(text: &str) -> f64 {
    DEFAULT_SCORER.score(text)
}

/// Polarity scorer backed by a word lexicon.
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    polarity: HashMap<String, f64>,
    intensifiers: HashMap<&'static str, f64>,
    negations: &'static [&'static str],
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self {
            polarity: Self::build_polarity_lexicon()
                .iter()
                .map(|(w, p)| (w.to_string(), *p))
                .collect(),
            intensifiers: Self::build_intensifiers(),
            negations: NEGATIONS,
        }
    }

    /// Add or override lexicon entries. Polarities are clamped to [-1, 1].
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        for (word, p) in entries {
            self.polarity
                .insert(word.into().to_lowercase(), p.clamp(-1.0, 1.0));
        }
        self
    }

    /// Polarity of `text` in [-1.0, 1.0]; higher is more positive.
    pub fn score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let words: Vec<&str> = WORD.find_iter(&lower).map(|m| m.as_str()).collect();

        let mut total = 0.0;
        let mut matched = 0usize;
        for (i, word) in words.iter().enumerate() {
            let Some(&base) = self.polarity.get(*word) else {
                continue;
            };
            let mut p = base;
            if i > 0 {
                if let Some(&factor) = self.intensifiers.get(words[i - 1]) {
                    p *= factor;
                }
            }
            let window = &words[i.saturating_sub(2)..i];
            if window.iter().any(|w| self.negations.iter().any(|n| n == w)) {
                p *= -0.5;
            }
            total += p.clamp(-1.0, 1.0);
            matched += 1;
        }

        if matched == 0 {
            return 0.0;
        }
        (total / matched as f64).clamp(-1.0, 1.0)
    }

    fn build_polarity_lexicon() -> &'static [(&'static str, f64)] {
        &[
            // General positive
            ("good", 0.7), ("great", 0.8), ("best", 1.0), ("better", 0.5),
            ("excellent", 1.0), ("amazing", 0.6), ("awesome", 1.0), ("love", 0.5),
            ("loved", 0.7), ("like", 0.2), ("nice", 0.6), ("happy", 0.8),
            ("glad", 0.5), ("wonderful", 1.0), ("fantastic", 0.4), ("perfect", 1.0),
            ("beautiful", 0.85), ("fine", 0.4), ("cool", 0.35), ("fun", 0.3),
            ("win", 0.8), ("winning", 0.5), ("won", 0.5), ("success", 0.3),
            ("successful", 0.75), ("strong", 0.43), ("safe", 0.5), ("solid", 0.2),
            ("smart", 0.21), ("easy", 0.43), ("free", 0.4), ("rich", 0.38),
            ("interesting", 0.5), ("positive", 0.23), ("profitable", 0.5), ("profit", 0.3),
            ("gain", 0.3), ("gains", 0.3), ("up", 0.1), ("rising", 0.3),
            // Market slang, positive
            ("bullish", 0.6), ("moon", 0.5), ("mooning", 0.6), ("pump", 0.3),
            ("pumping", 0.4), ("rally", 0.4), ("breakout", 0.4), ("undervalued", 0.4),
            ("wagmi", 0.5), ("hodl", 0.2), ("ath", 0.5),
            // General negative
            ("bad", -0.7), ("worse", -0.4), ("worst", -1.0), ("terrible", -1.0),
            ("awful", -1.0), ("horrible", -1.0), ("disastrous", -0.7), ("disaster", -0.8),
            ("hate", -0.8), ("hated", -0.9), ("poor", -0.4), ("sad", -0.5),
            ("angry", -0.5), ("stupid", -0.8), ("dumb", -0.38), ("wrong", -0.5),
            ("fail", -0.5), ("failed", -0.5), ("failure", -0.32), ("loss", -0.3),
            ("losses", -0.3), ("lose", -0.4), ("losing", -0.4), ("lost", -0.3),
            ("weak", -0.38), ("risky", -0.3), ("dangerous", -0.6), ("fake", -0.5),
            ("broke", -0.4), ("dead", -0.2), ("down", -0.16), ("falling", -0.3),
            ("negative", -0.3), ("overvalued", -0.4), ("crash", -0.6), ("crashing", -0.6),
            // Market slang, negative
            ("bearish", -0.6), ("dump", -0.4), ("dumping", -0.5), ("rug", -0.6),
            ("rugged", -0.7), ("scam", -0.8), ("ponzi", -0.7), ("fud", -0.3),
            ("rekt", -0.7), ("ngmi", -0.5), ("bagholder", -0.4), ("bagholding", -0.4),
        ]
    }

    fn build_intensifiers() -> HashMap<&'static str, f64> {
        [
            ("very", 1.3), ("really", 1.3), ("extremely", 1.5), ("super", 1.3),
            ("so", 1.2), ("incredibly", 1.5), ("totally", 1.3), ("absolutely", 1.5),
            ("completely", 1.4), ("highly", 1.3), ("most", 1.2), ("quite", 1.1),
        ]
        .into_iter()
        .collect()
    }
}

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "neither", "nor", "without", "dont", "don't", "doesn't",
    "isn't", "aren't", "wasn't", "weren't", "won't", "can't", "cannot", "couldn't", "shouldn't",
    "wouldn't", "didn't", "ain't",
];

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}
