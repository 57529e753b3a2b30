use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A thread observed on the board listing. Identified by its opening post number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: u64,
    /// Subject line of the opening post, empty when the thread has none.
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A single post inside a thread. The opening post comes first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    /// Plain text with board markup removed.
    pub content: String,
    pub thread_id: u64,
}
