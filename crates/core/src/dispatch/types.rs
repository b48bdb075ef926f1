//! Types for the dispatch module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::{InvalidTransition, RowId, SourceError};

/// Errors raised by the dispatch layer.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The data source failed during a scan or a claim.
    #[error("Connection error: {0}")]
    Connection(#[from] SourceError),

    /// A claim would break the row state machine.
    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    /// The worker pool no longer hands out slots.
    #[error("Worker pool is closed")]
    PoolClosed,

    /// A manual run named a row that does not exist.
    #[error("Row not found: {0}")]
    UnknownRow(RowId),

    /// A manual override named a field the row does not have.
    #[error("bad override: {0:?}")]
    BadOverride(String),

    /// A manual override was not of the form `field=value`.
    #[error("malformed override {0:?}, expected field=value")]
    MalformedOverride(String),
}

impl DispatchError {
    /// Whether the outer loop should reconnect and retry.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// What one dispatch cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Rows the scan found eligible.
    pub eligible: usize,
    /// Jobs started.
    pub launched: usize,
    /// The cycle stopped early because shutdown was requested.
    pub stopped: bool,
}

/// What a [`JobRunner::run`](super::JobRunner::run) call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Successful scan/dispatch cycles.
    pub cycles: u64,
    /// Jobs started over all cycles.
    pub jobs_launched: u64,
    /// Failed connection attempts and aborted cycles.
    pub connection_failures: u64,
}
