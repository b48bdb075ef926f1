//! Dispatch configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::scanner::RestartPolicy;

/// Configuration for the scan/dispatch loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum jobs running at once.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Pause between scan/dispatch cycles (seconds).
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    /// Re-run rows left In Progress, on the first cycle only.
    #[serde(default)]
    pub restart_in_progress: bool,

    /// Re-run Errored rows on every cycle.
    #[serde(default)]
    pub restart_errors: bool,

    /// Re-run every ready row, on the first cycle only.
    #[serde(default)]
    pub restart_all: bool,

    /// Never write the state column (neither claims nor final states).
    #[serde(default)]
    pub no_update_state: bool,

    /// Stop after one successful cycle and wait for its jobs.
    #[serde(default)]
    pub run_once: bool,

    /// First reconnect delay (seconds).
    #[serde(default = "default_backoff_base")]
    pub backoff_base_secs: u64,

    /// Reconnect delay cap (seconds).
    #[serde(default = "default_backoff_max")]
    pub backoff_max_secs: u64,

    /// Column receiving `"<worker_id> <timestamp>"` on each claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_column: Option<String>,

    /// Identifies this process in claim tokens.
    #[serde(default = "default_worker_id")]
    pub worker_id: String,
}

fn default_max_concurrent_jobs() -> usize {
    8
}

fn default_scan_interval() -> u64 {
    10
}

fn default_backoff_base() -> u64 {
    1
}

fn default_backoff_max() -> u64 {
    60
}

fn default_worker_id() -> String {
    format!("sheetcut-{}", std::process::id())
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            scan_interval_secs: default_scan_interval(),
            restart_in_progress: false,
            restart_errors: false,
            restart_all: false,
            no_update_state: false,
            run_once: false,
            backoff_base_secs: default_backoff_base(),
            backoff_max_secs: default_backoff_max(),
            claim_column: None,
            worker_id: default_worker_id(),
        }
    }
}

impl DispatchConfig {
    /// Restart policy for the first cycle.
    pub fn restart_policy(&self) -> RestartPolicy {
        RestartPolicy {
            restart_in_progress: self.restart_in_progress,
            restart_errors: self.restart_errors,
            restart_all: self.restart_all,
        }
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs(self.backoff_base_secs)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_secs(self.backoff_max_secs)
    }

    /// Sets the concurrency ceiling.
    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max;
        self
    }

    /// Sets the scan interval in seconds.
    pub fn with_scan_interval(mut self, secs: u64) -> Self {
        self.scan_interval_secs = secs;
        self
    }

    /// Sets the restart flags.
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_in_progress = policy.restart_in_progress;
        self.restart_errors = policy.restart_errors;
        self.restart_all = policy.restart_all;
        self
    }

    /// Enables single-cycle mode.
    pub fn with_run_once(mut self, enabled: bool) -> Self {
        self.run_once = enabled;
        self
    }

    /// Disables state column writes.
    pub fn with_no_update_state(mut self, enabled: bool) -> Self {
        self.no_update_state = enabled;
        self
    }

    /// Sets the reconnect backoff bounds in seconds.
    pub fn with_backoff(mut self, base_secs: u64, max_secs: u64) -> Self {
        self.backoff_base_secs = base_secs;
        self.backoff_max_secs = max_secs;
        self
    }

    /// Enables claim tokens in `column`.
    pub fn with_claim_column(mut self, column: impl Into<String>) -> Self {
        self.claim_column = Some(column.into());
        self
    }
}
