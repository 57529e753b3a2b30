use std::iter::FusedIterator;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::data::board::BoardSource;
use crate::errors::AppError;
use crate::models::config::ScanConfig;
use crate::models::record::{Dataset, Record};
use crate::models::result::CollectionStats;
use crate::models::thread::{Post, Thread};

/// Bounded walk over the (thread, post) pairs of recent threads.
///
/// Threads are listed on the first pull. A thread's posts are fetched only when
/// the walk reaches it, and nothing is fetched once `cap` records have been
/// yielded. After each qualifying thread is drained the walk pauses for `delay`,
/// unless the cap was reached. The walk ends for good after an error.
pub struct RecentPosts<'a, S: BoardSource + ?Sized> {
    source: &'a S,
    board: &'a str,
    cutoff: DateTime<Utc>,
    cap: usize,
    delay: Duration,
    threads: Option<std::vec::IntoIter<Thread>>,
    current: Option<(Thread, std::vec::IntoIter<Post>)>,
    stats: CollectionStats,
    done: bool,
}

impl<'a, S: BoardSource + ?Sized> RecentPosts<'a, S> {
    /// Walk threads created strictly after `cutoff`.
    pub fn new(
        source: &'a S,
        board: &'a str,
        cutoff: DateTime<Utc>,
        cap: usize,
        delay: Duration,
    ) -> Self {
        Self {
            source,
            board,
            cutoff,
            cap,
            delay,
            threads: None,
            current: None,
            stats: CollectionStats::default(),
            done: false,
        }
    }

    pub fn into_stats(self) -> CollectionStats {
        self.stats
    }

    fn fail(&mut self, err: AppError) -> Option<Result<Record, AppError>> {
        self.done = true;
        Some(Err(err))
    }

    fn pause(&mut self) {
        self.stats.pauses += 1;
        debug!("Pausing {:?} before next thread", self.delay);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }

    /// Next thread from the listing that passes the time filter.
    fn next_qualifying_thread(&mut self) -> Result<Option<Thread>, AppError> {
        if self.threads.is_none() {
            let listed = self.source.list_threads(self.board)?;
            info!("Board /{}/ lists {} threads", self.board, listed.len());
            self.stats.threads_listed = listed.len();
            self.threads = Some(listed.into_iter());
        }
        let Some(threads) = self.threads.as_mut() else {
            return Ok(None);
        };
        for thread in threads.by_ref() {
            if thread.created_at > self.cutoff {
                return Ok(Some(thread));
            }
            self.stats.threads_skipped += 1;
            debug!("Skipping thread {} created {}", thread.id, thread.created_at);
        }
        Ok(None)
    }
}

impl<S: BoardSource + ?Sized> Iterator for RecentPosts<'_, S> {
    type Item = Result<Record, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if self.stats.records >= self.cap {
                info!("Record cap of {} reached, stopping collection", self.cap);
                self.stats.cap_reached = true;
                self.done = true;
                return None;
            }

            if let Some((thread, posts)) = self.current.as_mut() {
                if let Some(post) = posts.next() {
                    self.stats.records += 1;
                    return Some(Ok(Record::raw(thread, &post)));
                }
            }
            if self.current.take().is_some() {
                self.pause();
                continue;
            }

            let thread = match self.next_qualifying_thread() {
                Ok(Some(thread)) => thread,
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => return self.fail(e),
            };
            let posts = match self.source.fetch_posts(self.board, &thread) {
                Ok(posts) => posts,
                Err(e) => return self.fail(e),
            };
            self.stats.threads_visited += 1;
            if posts.is_empty() {
                warn!("Thread {} returned no posts", thread.id);
            } else {
                debug!("Thread {}: {} posts", thread.id, posts.len());
            }
            self.current = Some((thread, posts.into_iter()));
        }
    }
}

impl<S: BoardSource + ?Sized> FusedIterator for RecentPosts<'_, S> {}

/// Collect raw records of recent threads into a capped dataset.
///
/// Any fetch failure aborts the run; no partial dataset is returned.
pub fn collect_recent<S: BoardSource + ?Sized>(
    source: &S,
    config: &ScanConfig,
    now: DateTime<Utc>,
) -> Result<(Dataset, CollectionStats), AppError> {
    let cutoff = now - config.lookback();
    let mut walk = RecentPosts::new(
        source,
        &config.board,
        cutoff,
        config.max_records,
        config.request_delay(),
    );
    let mut dataset = Dataset::new(config.max_records);
    for record in walk.by_ref() {
        dataset.push(record?)?;
    }
    let stats = walk.into_stats();
    info!(
        "Collected {} records from {} threads ({} skipped as older than {})",
        stats.records, stats.threads_visited, stats.threads_skipped, cutoff
    );
    Ok((dataset, stats))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as Age, TimeZone};

    use super::*;
    use crate::data::fake::FakeBoard;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn test_config(cap: usize) -> ScanConfig {
        ScanConfig {
            max_records: cap,
            request_delay_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_discovery_order() {
        let board = FakeBoard::new()
            .thread(1, now(), Age::hours(2), &["a", "b"])
            .thread(2, now(), Age::hours(1), &["c"])
            .thread(3, now(), Age::days(1), &["d", "e"]);
        let (ds, stats) = collect_recent(&board, &test_config(500), now()).unwrap();
        let contents: Vec<&str> = ds.records().iter().map(|r| r.post_content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c", "d", "e"]);
        let threads: Vec<u64> = ds.records().iter().map(|r| r.thread_id).collect();
        assert_eq!(threads, vec![1, 1, 2, 3, 3]);
        assert_eq!(stats.threads_visited, 3);
        assert_eq!(stats.records, 5);
        assert!(!stats.cap_reached);
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let board = FakeBoard::new()
            .thread(1, now(), Age::days(7), &["exactly at cutoff"])
            .thread(2, now(), Age::days(7) - Age::seconds(1), &["just inside"])
            .thread(3, now(), Age::days(30), &["old"]);
        let (ds, stats) = collect_recent(&board, &test_config(500), now()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].post_content, "just inside");
        assert_eq!(stats.threads_skipped, 2);
        // Skipped threads never have their posts fetched
        assert_eq!(*board.fetched.borrow(), vec![2]);
    }

    #[test]
    fn test_cap_mid_thread_stops_everything() {
        let board = FakeBoard::new()
            .busy_thread(1, now(), 300)
            .busy_thread(2, now(), 300)
            .busy_thread(3, now(), 10);
        let (ds, stats) = collect_recent(&board, &test_config(500), now()).unwrap();
        assert_eq!(ds.len(), 500);
        assert!(stats.cap_reached);
        // Thread 3 is never visited
        assert_eq!(*board.fetched.borrow(), vec![1, 2]);
        let last = ds.records().last().unwrap();
        assert_eq!(last.thread_id, 2);
        assert_eq!(last.post_content, "post 199 of 2");
        // Pause after thread 1 only; none once the cap is hit
        assert_eq!(stats.pauses, 1);
    }

    #[test]
    fn test_single_thread_over_cap() {
        let board = FakeBoard::new()
            .busy_thread(1, now(), 501)
            .busy_thread(2, now(), 5);
        let (ds, _) = collect_recent(&board, &test_config(500), now()).unwrap();
        assert_eq!(ds.len(), 500);
        assert!(ds.records().iter().all(|r| r.post_content != "post 500 of 1"));
        assert_eq!(*board.fetched.borrow(), vec![1]);
    }

    #[test]
    fn test_cap_on_thread_boundary() {
        let board = FakeBoard::new()
            .busy_thread(1, now(), 3)
            .busy_thread(2, now(), 2)
            .busy_thread(3, now(), 2);
        let (ds, stats) = collect_recent(&board, &test_config(5), now()).unwrap();
        assert_eq!(ds.len(), 5);
        assert_eq!(*board.fetched.borrow(), vec![1, 2]);
        assert_eq!(stats.pauses, 1);
        assert!(stats.cap_reached);
    }

    #[test]
    fn test_zero_cap_issues_no_requests() {
        let board = FakeBoard::new().busy_thread(1, now(), 3);
        let (ds, _) = collect_recent(&board, &test_config(0), now()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(*board.listings.borrow(), 0);
        assert!(board.fetched.borrow().is_empty());
    }

    #[test]
    fn test_one_pause_per_qualifying_thread() {
        let board = FakeBoard::new()
            .thread(1, now(), Age::hours(1), &["a", "b", "c"])
            .thread(2, now(), Age::days(9), &["old"])
            .thread(3, now(), Age::hours(1), &["d"])
            .thread(4, now(), Age::hours(1), &[]);
        let (ds, stats) = collect_recent(&board, &test_config(500), now()).unwrap();
        assert_eq!(ds.len(), 4);
        assert_eq!(stats.threads_visited, 3);
        assert_eq!(stats.pauses, 3);
        assert_eq!(stats.threads_listed, 4);
    }

    #[test]
    fn test_delay_is_applied() {
        let board = FakeBoard::new()
            .busy_thread(1, now(), 1)
            .busy_thread(2, now(), 1);
        let config = ScanConfig {
            request_delay_ms: 20,
            ..Default::default()
        };
        let started = std::time::Instant::now();
        let (_, stats) = collect_recent(&board, &config, now()).unwrap();
        assert_eq!(stats.pauses, 2);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_fetch_failure_is_fatal() {
        let board = FakeBoard::new()
            .busy_thread(1, now(), 2)
            .busy_thread(2, now(), 2)
            .busy_thread(3, now(), 2)
            .failing(2);
        let err = collect_recent(&board, &test_config(500), now()).unwrap_err();
        assert!(matches!(err, AppError::BoardStatus { status: 503, .. }));
        assert_eq!(*board.fetched.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_iterator_is_fused_after_error() {
        let board = FakeBoard::new().busy_thread(1, now(), 2).failing(1);
        let mut walk = RecentPosts::new(&board, "biz", now() - Age::days(7), 10, Duration::ZERO);
        assert!(matches!(walk.next(), Some(Err(_))));
        assert!(walk.next().is_none());
        assert!(walk.next().is_none());
        assert_eq!(board.fetched.borrow().len(), 1);
    }

    #[test]
    fn test_lazy_fetch() {
        let board = FakeBoard::new()
            .busy_thread(1, now(), 2)
            .busy_thread(2, now(), 2);
        let mut walk = RecentPosts::new(&board, "biz", now() - Age::days(7), 10, Duration::ZERO);
        assert!(walk.next().is_some());
        assert_eq!(*board.fetched.borrow(), vec![1]);
        assert_eq!(walk.into_stats().records, 1);
    }
}
