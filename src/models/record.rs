use serde::{Deserialize, Serialize};

use crate::errors::AppError;

use super::thread::{Post, Thread};

/// Date format of the `Thread Creation Time` column (DD/MM/YYYY).
pub const CREATION_TIME_FORMAT: &str = "%d/%m/%Y";

/// Column names of the output table, in order.
pub const DATASET_COLUMNS: [&str; 7] = [
    "Thread ID",
    "Thread Title",
    "Thread Creation Time",
    "Post ID",
    "Post Content",
    "Tickers",
    "Sentiment",
];

/// One row of the output dataset: a post joined with its thread.
///
/// `tickers` and `sentiment` stay empty/zero until the assembler enriches the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub thread_id: u64,
    pub thread_title: String,
    pub thread_creation_time: String,
    pub post_id: u64,
    pub post_content: String,
    pub tickers: Vec<String>,
    pub sentiment: f64,
}

impl Record {
    /// Build a not-yet-enriched record from a thread and one of its posts.
    pub fn raw(thread: &Thread, post: &Post) -> Self {
        Record {
            thread_id: thread.id,
            thread_title: thread.title.clone(),
            thread_creation_time: thread.created_at.format(CREATION_TIME_FORMAT).to_string(),
            post_id: post.id,
            post_content: post.content.clone(),
            tickers: Vec::new(),
            sentiment: 0.0,
        }
    }
}

/// Ordered, capped collection of records in discovery order.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    cap: usize,
}

impl Dataset {
    pub fn new(cap: usize) -> Self {
        Dataset {
            records: Vec::with_capacity(cap.min(1024)),
            cap,
        }
    }

    /// Append a record. The cap is a hard ceiling.
    pub fn push(&mut self, record: Record) -> Result<(), AppError> {
        if self.is_full() {
            return Err(AppError::CapExceeded { limit: self.cap });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }
}
