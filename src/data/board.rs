use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::models::thread::{Post, Thread};

use super::markup::clean_comment;

/// Read access to a topic board.
pub trait BoardSource {
    /// All threads on the board, in the board's listing order.
    fn list_threads(&self, board: &str) -> Result<Vec<Thread>, AppError>;

    /// Every post of `thread`, opening post first.
    fn fetch_posts(&self, board: &str, thread: &Thread) -> Result<Vec<Post>, AppError>;
}

/// Blocking client for the read-only board JSON API.
///
/// Listing: `GET {base}/{board}/catalog.json`
/// Thread:  `GET {base}/{board}/thread/{no}.json`
pub struct ChanClient {
    client: Client,
    base_url: String,
}

impl ChanClient {
    /// Build a client. `timeout = None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("board-sentiment/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn catalog_url(&self, board: &str) -> String {
        format!("{}/{}/catalog.json", self.base_url, board)
    }

    pub fn thread_url(&self, board: &str, thread_id: u64) -> String {
        format!("{}/{}/thread/{}.json", self.base_url, board, thread_id)
    }

    fn get_body(&self, url: &str) -> Result<String, AppError> {
        debug!("GET {}", url);
        let resp = self.client.get(url).send()?;
        check_status(resp.status(), url)?;
        Ok(resp.text()?)
    }
}

/// Any non-2xx answer is fatal for the run.
fn check_status(status: StatusCode, url: &str) -> Result<(), AppError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(AppError::BoardStatus {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

impl BoardSource for ChanClient {
    fn list_threads(&self, board: &str) -> Result<Vec<Thread>, AppError> {
        parse_catalog(&self.get_body(&self.catalog_url(board))?)
    }

    fn fetch_posts(&self, board: &str, thread: &Thread) -> Result<Vec<Post>, AppError> {
        parse_thread(&self.get_body(&self.thread_url(board, thread.id))?, thread.id)
    }
}

// ── Wire format ──

#[derive(Debug, Deserialize)]
struct CatalogPage {
    threads: Vec<ApiPost>,
}

#[derive(Debug, Deserialize)]
struct ThreadPayload {
    posts: Vec<ApiPost>,
}

#[derive(Debug, Deserialize)]
struct ApiPost {
    no: u64,
    #[serde(default)]
    time: Option<i64>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    com: Option<String>,
}

/// Threads of a catalog payload (array of pages), page order then entry order.
fn parse_catalog(json: &str) -> Result<Vec<Thread>, AppError> {
    let pages: Vec<CatalogPage> = serde_json::from_str(json)
        .map_err(|e| AppError::BoardPayload(format!("catalog: {}", e)))?;
    threads_from_catalog(pages)
}

/// Posts of a thread payload, in post order.
fn parse_thread(json: &str, thread_id: u64) -> Result<Vec<Post>, AppError> {
    let payload: ThreadPayload = serde_json::from_str(json)
        .map_err(|e| AppError::BoardPayload(format!("thread {}: {}", thread_id, e)))?;
    Ok(posts_from_thread(payload, thread_id))
}

fn threads_from_catalog(pages: Vec<CatalogPage>) -> Result<Vec<Thread>, AppError> {
    pages
        .into_iter()
        .flat_map(|page| page.threads)
        .map(|op| {
            let time = op.time.ok_or_else(|| {
                AppError::BoardPayload(format!("thread {} has no creation time", op.no))
            })?;
            let created_at = DateTime::<Utc>::from_timestamp(time, 0).ok_or_else(|| {
                AppError::BoardPayload(format!("thread {} has invalid time {}", op.no, time))
            })?;
            Ok(Thread {
                id: op.no,
                title: op.sub.as_deref().map(clean_comment).unwrap_or_default(),
                created_at,
            })
        })
        .collect()
}

/// Posts without a comment body (image-only) get empty content.
fn posts_from_thread(payload: ThreadPayload, thread_id: u64) -> Vec<Post> {
    payload
        .posts
        .into_iter()
        .map(|p| Post {
            id: p.no,
            content: p.com.as_deref().map(clean_comment).unwrap_or_default(),
            thread_id,
        })
        .collect()
}
