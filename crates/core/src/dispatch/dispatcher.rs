//! Claims eligible rows and launches their jobs.

use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::converter::Converter;
use crate::fetcher::Fetcher;
use crate::metrics;
use crate::processor::PipelineProcessor;
use crate::publisher::Publisher;
use crate::source::{Row, RowId, RowState, SharedSheet};

use super::pool::{Slot, WorkerPool};
use super::scanner::{scan, RestartPolicy};
use super::types::{DispatchError, DispatchSummary};

/// Where and how a claim is recorded besides the state column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimToken {
    pub column: String,
    pub worker_id: String,
}

impl ClaimToken {
    /// `"<worker_id> <RFC3339 timestamp>"`.
    pub fn value(&self) -> String {
        format!(
            "{} {}",
            self.worker_id,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

type RowSet = Arc<Mutex<HashSet<RowId>>>;

fn lock_rows(rows: &RowSet) -> MutexGuard<'_, HashSet<RowId>> {
    rows.lock().unwrap_or_else(|e| e.into_inner())
}

/// Keeps a row marked as running until its job future is dropped.
struct InFlight {
    rows: RowSet,
    row_id: RowId,
}

impl InFlight {
    fn enter(rows: &RowSet, row_id: RowId) -> Self {
        lock_rows(rows).insert(row_id);
        Self {
            rows: Arc::clone(rows),
            row_id,
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock_rows(&self.rows).remove(&self.row_id);
    }
}

/// Runs one scan and starts a job for each eligible row.
///
/// Rows whose job from an earlier cycle is still running are never offered
/// again, whatever the restart policy says.
pub struct Dispatcher<F: Fetcher, C: Converter, P: Publisher> {
    processor: Arc<PipelineProcessor<F, C, P>>,
    pool: Arc<WorkerPool>,
    in_flight: RowSet,
    no_update_state: bool,
    claim_token: Option<ClaimToken>,
    cancel: CancellationToken,
}

impl<F, C, P> Dispatcher<F, C, P>
where
    F: Fetcher + 'static,
    C: Converter + 'static,
    P: Publisher + 'static,
{
    pub fn new(
        processor: Arc<PipelineProcessor<F, C, P>>,
        pool: Arc<WorkerPool>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            processor,
            pool,
            in_flight: RowSet::default(),
            no_update_state: false,
            claim_token: None,
            cancel,
        }
    }

    /// Skips every state column write (claims and final states).
    pub fn with_no_update_state(mut self, enabled: bool) -> Self {
        self.no_update_state = enabled;
        self
    }

    /// Also records claim tokens.
    pub fn with_claim_token(mut self, token: Option<ClaimToken>) -> Self {
        self.claim_token = token;
        self
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Whether a job launched by this dispatcher is still running for the row.
    pub fn is_running(&self, row_id: RowId) -> bool {
        lock_rows(&self.in_flight).contains(&row_id)
    }

    /// Scans once and launches a job for every eligible row, in sheet order.
    ///
    /// Waits for a free slot before each claim. A data source failure aborts
    /// the cycle; jobs already launched keep running.
    pub async fn dispatch(
        &self,
        sheet: &SharedSheet,
        policy: RestartPolicy,
    ) -> Result<DispatchSummary, DispatchError> {
        let rows: Vec<Row> = scan(sheet, self.processor.columns(), &policy)
            .await?
            .into_iter()
            .filter(|row| {
                let running = self.is_running(row.id);
                if running {
                    debug!("Job {} is still running, skipping", row.id);
                }
                !running
            })
            .collect();
        let mut summary = DispatchSummary {
            eligible: rows.len(),
            ..Default::default()
        };

        for row in rows {
            if self.cancel.is_cancelled() {
                summary.stopped = true;
                break;
            }

            debug!("Trying to start job {}", row.id);
            let slot = tokio::select! {
                _ = self.cancel.cancelled() => {
                    summary.stopped = true;
                    break;
                }
                slot = self.pool.reserve() => slot?,
            };

            self.claim(sheet, &row).await?;
            self.launch(slot, sheet, row);
            summary.launched += 1;
        }

        if summary.launched > 0 {
            info!(
                "Started {} of {} eligible jobs",
                summary.launched, summary.eligible
            );
        }
        Ok(summary)
    }

    async fn claim(&self, sheet: &SharedSheet, row: &Row) -> Result<(), DispatchError> {
        if self.no_update_state {
            return Ok(());
        }

        let columns = self.processor.columns();
        // An unrecognised state cell is only offered under restart_all and is
        // claimed like any other
        if let Some(current) = row.state(columns) {
            current.transition(RowState::InProgress)?;
        }
        sheet
            .write_state(columns, row.id, RowState::InProgress)
            .await?;

        if let Some(token) = &self.claim_token {
            sheet
                .write_cell(row.id, &token.column, &token.value())
                .await?;
        }

        metrics::ROWS_CLAIMED.inc();
        Ok(())
    }

    fn launch(&self, slot: Slot, sheet: &SharedSheet, row: Row) {
        let processor = Arc::clone(&self.processor);
        let sheet = sheet.clone();
        let no_update_state = self.no_update_state;
        let row_id = row.id;
        let in_flight = InFlight::enter(&self.in_flight, row_id);

        self.pool.spawn(slot, async move {
            let _in_flight = in_flight;
            processor.process(&sheet, row, no_update_state).await
        });
        debug!("Started job {}", row_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_token_value() {
        let token = ClaimToken {
            column: "Claimed By".to_string(),
            worker_id: "cutter-a".to_string(),
        };
        let value = token.value();
        let (worker, timestamp) = value.split_once(' ').unwrap();
        assert_eq!(worker, "cutter-a");
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}
