use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tokio::signal;
use tracing::info;

use sheetcut_core::JobRunner;

use super::{build_pipeline, build_source, load};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// On the first scan, also pick up rows left "In Progress"
    #[arg(long)]
    pub restart_in_progress: bool,
    /// Pick up "Errored" rows on every scan
    #[arg(long)]
    pub restart_errors: bool,
    /// On the first scan, pick up every ready row whatever its state
    #[arg(long)]
    pub restart_all: bool,
    /// Never write the state column
    #[arg(long)]
    pub no_update_state: bool,
    /// Exit after one successful scan, once its jobs have finished
    #[arg(long)]
    pub once: bool,
    /// Seconds between scans
    #[arg(long)]
    pub interval: Option<u64>,
    /// Maximum concurrent jobs
    #[arg(long)]
    pub max_jobs: Option<usize>,
}

/// Execute the `run` command: poll the sheet until interrupted.
pub async fn execute(config_path: &Path, args: RunArgs) -> Result<()> {
    let mut config = load(config_path)?;

    // Flags can only switch behaviour on; the file stays the baseline
    let dispatch = &mut config.dispatch;
    dispatch.restart_in_progress |= args.restart_in_progress;
    dispatch.restart_errors |= args.restart_errors;
    dispatch.restart_all |= args.restart_all;
    dispatch.no_update_state |= args.no_update_state;
    dispatch.run_once |= args.once;
    if let Some(interval) = args.interval {
        dispatch.scan_interval_secs = interval;
    }
    if let Some(max_jobs) = args.max_jobs {
        anyhow::ensure!(max_jobs > 0, "--max-jobs must be at least 1");
        dispatch.max_concurrent_jobs = max_jobs;
    }

    let source = build_source(&config);
    let pipeline = Arc::new(build_pipeline(&config));
    let runner = JobRunner::new(config.dispatch.clone(), source, pipeline)
        .with_metrics_textfile(config.metrics.textfile.clone());

    let shutdown = runner.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Signal received, finishing running jobs");
        shutdown.cancel();
    });

    let summary = runner.run().await;
    info!(
        "Done: {} cycles, {} jobs, {} connection failures",
        summary.cycles, summary.jobs_launched, summary.connection_failures
    );
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
