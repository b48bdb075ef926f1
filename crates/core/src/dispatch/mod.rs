//! Dispatch module: the scan/claim/launch loop.
//!
//! - [`scan`] reads the sheet and filters rows by [`RestartPolicy`]
//! - [`Dispatcher`] claims each eligible row and starts its job in a
//!   [`WorkerPool`] slot
//! - [`JobRunner`] owns the connection, paces cycles and reconnects with
//!   [`Backoff`] after data source failures
//! - [`run_manual`] processes one row outside the loop
//!
//! # Example
//!
//! ```ignore
//! let runner = JobRunner::new(config.dispatch.clone(), source, Arc::new(processor));
//! let token = runner.shutdown_token();
//! tokio::spawn(async move {
//!     shutdown_signal().await;
//!     token.cancel();
//! });
//! let summary = runner.run().await;
//! ```

mod backoff;
mod config;
mod dispatcher;
mod manual;
mod pool;
mod runner;
mod scanner;
mod types;

pub use backoff::{sleep_with_cancellation, Backoff};
pub use config::DispatchConfig;
pub use dispatcher::{ClaimToken, Dispatcher};
pub use manual::{parse_override, run_manual};
pub use pool::{PoolStatus, Slot, WorkerPool};
pub use runner::JobRunner;
pub use scanner::{is_eligible, scan, RestartPolicy};
pub use types::{DispatchError, DispatchSummary, RunSummary};
