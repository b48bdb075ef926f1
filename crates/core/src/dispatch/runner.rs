//! Outer control loop: connection ownership, cycle pacing and reconnects.

use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::converter::Converter;
use crate::fetcher::Fetcher;
use crate::metrics;
use crate::processor::PipelineProcessor;
use crate::publisher::Publisher;
use crate::source::{SharedSheet, SheetSource};

use super::backoff::{sleep_with_cancellation, Backoff};
use super::config::DispatchConfig;
use super::dispatcher::{ClaimToken, Dispatcher};
use super::pool::{PoolStatus, WorkerPool};
use super::types::RunSummary;

/// Owns the data source connection and drives scan/dispatch cycles.
///
/// Opening the connection and every cycle are retried with exponential
/// backoff; the delay resets only after a cycle completes. Restart flags that
/// only apply once (`restart_in_progress`, `restart_all`) are dropped after
/// the first successful cycle of the process.
pub struct JobRunner<F: Fetcher, C: Converter, P: Publisher> {
    config: DispatchConfig,
    source: Arc<dyn SheetSource>,
    dispatcher: Dispatcher<F, C, P>,
    cancel: CancellationToken,
    metrics_textfile: Option<PathBuf>,
}

impl<F, C, P> JobRunner<F, C, P>
where
    F: Fetcher + 'static,
    C: Converter + 'static,
    P: Publisher + 'static,
{
    pub fn new(
        config: DispatchConfig,
        source: Arc<dyn SheetSource>,
        processor: Arc<PipelineProcessor<F, C, P>>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let pool = Arc::new(WorkerPool::new("jobs", config.max_concurrent_jobs));
        let claim_token = config.claim_column.as_ref().map(|column| ClaimToken {
            column: column.clone(),
            worker_id: config.worker_id.clone(),
        });
        let dispatcher = Dispatcher::new(processor, pool, cancel.clone())
            .with_no_update_state(config.no_update_state)
            .with_claim_token(claim_token);

        Self {
            config,
            source,
            dispatcher,
            cancel,
            metrics_textfile: None,
        }
    }

    /// Writes Prometheus text exposition to `path` after every cycle.
    pub fn with_metrics_textfile(mut self, path: Option<PathBuf>) -> Self {
        self.metrics_textfile = path;
        self
    }

    /// Requests shutdown: no new cycles or claims; `run` returns once the
    /// running jobs have finished.
    pub fn shutdown(&self) {
        info!("Shutdown requested");
        self.cancel.cancel();
    }

    /// Token cancelled by [`shutdown`](Self::shutdown).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.dispatcher.pool().status()
    }

    /// Runs until shutdown (or one successful cycle with `run_once`), then
    /// waits for running jobs.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut policy = self.config.restart_policy();
        let mut backoff = Backoff::new(self.config.backoff_base(), self.config.backoff_max());

        info!(
            "Starting job runner on {} ({} slots, scanning every {}s)",
            self.source.name(),
            self.dispatcher.pool().capacity(),
            self.config.scan_interval_secs
        );

        'connection: while !self.cancel.is_cancelled() {
            let sheet = match self.source.open().await {
                Ok(sheet) => SharedSheet::new(sheet),
                Err(e) => {
                    summary.connection_failures += 1;
                    metrics::CONNECTION_FAILURES.inc();
                    let delay = backoff.next_delay();
                    error!("Failed to open {}: {}, retrying in {:?}", self.source.name(), e, delay);
                    if !sleep_with_cancellation(delay, &self.cancel).await {
                        break;
                    }
                    continue;
                }
            };
            debug!("Opened {}", self.source.name());

            loop {
                match self.dispatcher.dispatch(&sheet, policy).await {
                    Ok(cycle) => {
                        backoff.reset();
                        summary.cycles += 1;
                        summary.jobs_launched += cycle.launched as u64;
                        metrics::SCAN_CYCLES.with_label_values(&["ok"]).inc();
                        self.export_metrics().await;

                        // restart in progress / restart all on the first cycle only
                        policy = policy.narrowed();

                        if self.config.run_once || cycle.stopped {
                            break 'connection;
                        }
                        if !sleep_with_cancellation(self.config.scan_interval(), &self.cancel).await
                        {
                            break 'connection;
                        }
                    }
                    Err(e) if e.is_connection() => {
                        summary.connection_failures += 1;
                        metrics::CONNECTION_FAILURES.inc();
                        metrics::SCAN_CYCLES
                            .with_label_values(&["connection_error"])
                            .inc();
                        let delay = backoff.next_delay();
                        error!("Main loop failure: {}, reconnecting in {:?}", e, delay);
                        if !sleep_with_cancellation(delay, &self.cancel).await {
                            break 'connection;
                        }
                        continue 'connection;
                    }
                    Err(e) => {
                        // Not a data source problem; reconnecting would not help
                        error!("Dispatch stopped: {}", e);
                        break 'connection;
                    }
                }
            }
        }

        let active = self.dispatcher.pool().active();
        if active > 0 {
            info!("Waiting for {} jobs", active);
        }
        self.dispatcher.pool().drain().await;
        self.export_metrics().await;

        info!(
            "Job runner stopped after {} cycles, {} jobs",
            summary.cycles, summary.jobs_launched
        );
        summary
    }

    async fn export_metrics(&self) {
        if let Some(path) = &self.metrics_textfile {
            if let Err(e) = metrics::write_textfile(path).await {
                warn!("Failed to write metrics to {:?}: {}", path, e);
            }
        }
    }
}
