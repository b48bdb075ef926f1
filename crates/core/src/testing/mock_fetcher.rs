//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fetcher::{FetchError, Fetcher};

/// Mock implementation of the Fetcher trait.
///
/// Writes `<prefix>.webm` for every link and records the links it was asked
/// for. Also tracks how many fetches run at the same time, which makes it the
/// natural place to observe the worker pool's concurrency ceiling.
#[derive(Debug, Clone)]
pub struct MockFetcher {
    /// Links fetched, in call order.
    links: Arc<RwLock<Vec<String>>>,
    /// Links that report an unavailable source, with the diagnostic.
    unavailable: Arc<RwLock<HashMap<String, String>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
    /// Simulated download duration.
    delay: Arc<RwLock<Duration>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self {
            links: Arc::new(RwLock::new(Vec::new())),
            unavailable: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all fetched links.
    pub async fn fetched_links(&self) -> Vec<String> {
        self.links.read().await.clone()
    }

    /// Make `link` fail as a retrieval error with `diagnostic`.
    pub async fn set_unavailable(&self, link: impl Into<String>, diagnostic: impl Into<String>) {
        self.unavailable
            .write()
            .await
            .insert(link.into(), diagnostic.into());
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated download duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Highest number of fetches observed running at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight count when a fetch ends.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, link: &str, output_prefix: &Path) -> Result<PathBuf, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.links.write().await.push(link.to_string());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(diagnostic) = self.unavailable.read().await.get(link) {
            return Err(FetchError::source_unavailable(diagnostic.clone()));
        }

        let path = PathBuf::from(format!("{}.webm", output_prefix.display()));
        tokio::fs::write(&path, b"mock source").await?;
        Ok(path)
    }

    async fn validate(&self) -> Result<(), FetchError> {
        Ok(())
    }
}
