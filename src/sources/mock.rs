//! Mock photo source for testing purposes.

use async_trait::async_trait;
use http::StatusCode;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::client::ApiError;
use crate::models::{Photo, SearchResult};
use crate::sources::PhotosDataSource;

/// One call made against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub query: String,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug)]
struct Scripted {
    outcome: Result<SearchResult, ApiError>,
    delay: Duration,
}

/// A mock source that replays scripted outcomes in order.
///
/// When the script runs dry every call fails with a 404 server error.
#[derive(Debug, Default)]
pub struct MockPhotosDataSource {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<SearchCall>>,
}

impl MockPhotosDataSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful page.
    pub fn push_result(&self, result: SearchResult) {
        self.push(Ok(result), Duration::ZERO);
    }

    /// Queue a failure.
    pub fn push_error(&self, error: ApiError) {
        self.push(Err(error), Duration::ZERO);
    }

    /// Queue an outcome that is only returned after `delay`.
    pub fn push_delayed(&self, outcome: Result<SearchResult, ApiError>, delay: Duration) {
        self.push(outcome, delay);
    }

    fn push(&self, outcome: Result<SearchResult, ApiError>, delay: Duration) {
        lock(&self.script).push_back(Scripted { outcome, delay });
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<SearchCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

// A panicking test must not poison the script for the rest of the run
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl PhotosDataSource for MockPhotosDataSource {
    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(
        &self,
        query: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<SearchResult, ApiError> {
        lock(&self.calls).push(SearchCall {
            query: query.to_string(),
            page,
            per_page,
        });

        let next = lock(&self.script).pop_front();
        match next {
            Some(scripted) => {
                if !scripted.delay.is_zero() {
                    tokio::time::sleep(scripted.delay).await;
                }
                scripted.outcome
            }
            None => Err(ApiError::Server(StatusCode::NOT_FOUND)),
        }
    }
}

/// Helper function to build a page of mock photos with ids `first_id..first_id + count`.
pub fn make_page(total_count: usize, first_id: u64, count: usize) -> SearchResult {
    let photos = (first_id..first_id + count as u64)
        .map(|id| {
            Photo::from_urls(
                id,
                &format!("https://images.example.com/{}/tiny.jpeg", id),
                &format!("https://images.example.com/{}/original.jpeg", id),
            )
        })
        .collect();

    SearchResult::new(total_count, photos)
}
