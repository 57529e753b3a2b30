use std::cell::RefCell;

use chrono::{DateTime, Duration, Utc};

use crate::errors::AppError;
use crate::models::thread::{Post, Thread};

use super::board::BoardSource;

/// In-memory board that records every request it serves.
#[derive(Default)]
pub struct FakeBoard {
    threads: Vec<(Thread, Vec<String>)>,
    fail_thread: Option<u64>,
    pub listings: RefCell<usize>,
    pub fetched: RefCell<Vec<u64>>,
}

impl FakeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a thread created `age` before `now` holding one post per text.
    pub fn thread(mut self, id: u64, now: DateTime<Utc>, age: Duration, posts: &[&str]) -> Self {
        let thread = Thread {
            id,
            title: format!("thread {}", id),
            created_at: now - age,
        };
        self.threads
            .push((thread, posts.iter().map(|s| s.to_string()).collect()));
        self
    }

    /// Add a recent thread with `count` generated posts.
    pub fn busy_thread(self, id: u64, now: DateTime<Utc>, count: usize) -> Self {
        let texts: Vec<String> = (0..count).map(|i| format!("post {} of {}", i, id)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.thread(id, now, Duration::hours(1), &refs)
    }

    /// Make fetching this thread's posts fail.
    pub fn failing(mut self, id: u64) -> Self {
        self.fail_thread = Some(id);
        self
    }
}

impl BoardSource for FakeBoard {
    fn list_threads(&self, _board: &str) -> Result<Vec<Thread>, AppError> {
        *self.listings.borrow_mut() += 1;
        Ok(self.threads.iter().map(|(t, _)| t.clone()).collect())
    }

    fn fetch_posts(&self, _board: &str, thread: &Thread) -> Result<Vec<Post>, AppError> {
        self.fetched.borrow_mut().push(thread.id);
        if self.fail_thread == Some(thread.id) {
            return Err(AppError::BoardStatus {
                status: 503,
                url: format!("fake/thread/{}.json", thread.id),
            });
        }
        let (_, texts) = self
            .threads
            .iter()
            .find(|(t, _)| t.id == thread.id)
            .ok_or_else(|| AppError::BoardStatus {
                status: 404,
                url: format!("fake/thread/{}.json", thread.id),
            })?;
        Ok(texts
            .iter()
            .enumerate()
            .map(|(i, text)| Post {
                id: thread.id * 1000 + i as u64,
                content: text.clone(),
                thread_id: thread.id,
            })
            .collect())
    }
}
