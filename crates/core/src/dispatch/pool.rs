//! Bounded worker pool for row jobs.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::error;

use crate::metrics;
use crate::processor::JobOutcome;

use super::types::DispatchError;

/// Snapshot of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Pool name.
    pub name: String,
    /// Number of running jobs.
    pub active_jobs: usize,
    /// Maximum concurrent jobs.
    pub max_concurrent: usize,
    /// Callers currently waiting for a slot.
    pub queued_jobs: usize,
    /// Jobs finished since startup.
    pub total_processed: u64,
    /// Jobs that did not complete since startup (errored, unrecorded or panicked).
    pub total_failed: u64,
}

/// Tracks statistics for the pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_processed: AtomicU64,
    total_failed: AtomicU64,
}

impl PoolStats {
    fn to_status(&self, name: &str, max_concurrent: usize) -> PoolStatus {
        PoolStatus {
            name: name.to_string(),
            active_jobs: self.active.load(Ordering::Relaxed) as usize,
            max_concurrent,
            queued_jobs: self.queued.load(Ordering::Relaxed) as usize,
            total_processed: self.total_processed.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// A reserved pool slot. Dropping it without spawning frees the slot.
#[derive(Debug)]
pub struct Slot {
    permit: OwnedSemaphorePermit,
}

/// Decrements the active count when a job task ends, including by panic.
struct ActiveGuard {
    stats: Arc<PoolStats>,
    finished: bool,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.stats.active.fetch_sub(1, Ordering::Relaxed);
        metrics::ACTIVE_JOBS.dec();
        if !self.finished {
            error!("Job task ended without an outcome");
            self.stats.total_processed.fetch_add(1, Ordering::Relaxed);
            self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Runs jobs as independent tasks, at most `capacity` at a time.
///
/// Callers [`reserve`](Self::reserve) a slot first, do whatever must happen
/// before the job starts (the claim write), then [`spawn`](Self::spawn) the
/// job into that slot.
pub struct WorkerPool {
    name: String,
    capacity: usize,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
}

impl WorkerPool {
    /// Creates a pool with `capacity` slots (at least one).
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: name.into(),
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
            stats: Arc::new(PoolStats::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of running jobs.
    pub fn active(&self) -> usize {
        self.stats.active.load(Ordering::Relaxed) as usize
    }

    /// Returns the current pool status.
    pub fn status(&self) -> PoolStatus {
        self.stats.to_status(&self.name, self.capacity)
    }

    /// Waits for a free slot.
    pub async fn reserve(&self) -> Result<Slot, DispatchError> {
        self.stats.queued.fetch_add(1, Ordering::Relaxed);
        let permit = Arc::clone(&self.semaphore).acquire_owned().await;
        self.stats.queued.fetch_sub(1, Ordering::Relaxed);

        let permit = permit.map_err(|_| DispatchError::PoolClosed)?;
        Ok(Slot { permit })
    }

    /// Starts `job` in the reserved slot. The slot is released when the job
    /// finishes.
    pub fn spawn<Fut>(&self, slot: Slot, job: Fut)
    where
        Fut: Future<Output = JobOutcome> + Send + 'static,
    {
        self.stats.active.fetch_add(1, Ordering::Relaxed);
        metrics::ACTIVE_JOBS.inc();

        let stats = Arc::clone(&self.stats);
        tokio::spawn(async move {
            let _permit = slot.permit;
            let mut guard = ActiveGuard {
                stats: Arc::clone(&stats),
                finished: false,
            };

            let outcome = job.await;

            stats.total_processed.fetch_add(1, Ordering::Relaxed);
            if !outcome.is_success() {
                stats.total_failed.fetch_add(1, Ordering::Relaxed);
            }
            guard.finished = true;
        });
    }

    /// Waits until every running job has finished.
    pub async fn drain(&self) {
        // Every running job holds a permit; owning all of them means none is left
        if let Ok(all) = self.semaphore.acquire_many(self.capacity as u32).await {
            drop(all);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn complete() -> JobOutcome {
        JobOutcome::Complete {
            reference: "ref".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pool_counts_outcomes() {
        let pool = WorkerPool::new("jobs", 2);

        let slot = pool.reserve().await.unwrap();
        pool.spawn(slot, async { complete() });
        let slot = pool.reserve().await.unwrap();
        pool.spawn(slot, async {
            JobOutcome::Errored {
                retrieval: false,
                message: "Internal error fetch: boom".to_string(),
            }
        });

        pool.drain().await;
        let status = pool.status();
        assert_eq!(status.name, "jobs");
        assert_eq!(status.active_jobs, 0);
        assert_eq!(status.max_concurrent, 2);
        assert_eq!(status.total_processed, 2);
        assert_eq!(status.total_failed, 1);
    }

    #[tokio::test]
    async fn test_unused_slot_is_released() {
        let pool = WorkerPool::new("jobs", 1);
        let slot = pool.reserve().await.unwrap();
        drop(slot);

        // Would hang if the slot leaked
        let slot = tokio::time::timeout(Duration::from_secs(1), pool.reserve())
            .await
            .unwrap()
            .unwrap();
        drop(slot);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reserve_waits_for_free_slot() {
        let pool = WorkerPool::new("jobs", 1);
        let slot = pool.reserve().await.unwrap();
        pool.spawn(slot, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            complete()
        });

        assert!(
            tokio::time::timeout(Duration::from_secs(1), pool.reserve())
                .await
                .is_err()
        );
        assert_eq!(pool.active(), 1);

        let slot = pool.reserve().await.unwrap();
        drop(slot);
        assert_eq!(pool.status().total_processed, 1);
    }

    fn should_panic() -> bool {
        true
    }

    #[tokio::test]
    async fn test_panicking_job_frees_slot() {
        let pool = WorkerPool::new("jobs", 1);
        let slot = pool.reserve().await.unwrap();
        pool.spawn(slot, async {
            if should_panic() {
                panic!("job exploded");
            }
            complete()
        });

        pool.drain().await;
        let status = pool.status();
        assert_eq!(status.active_jobs, 0);
        assert_eq!(status.total_failed, 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(WorkerPool::new("jobs", 0).capacity(), 1);
    }
}
