//! Error types for the publisher module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing a file.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The file to publish does not exist.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Transfer tool binary not found.
    #[error("Transfer tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The transfer tool exited unsuccessfully.
    #[error("Transfer failed with exit code {exit_code:?}")]
    TransferFailed {
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    /// The transfer did not finish in time.
    #[error("Transfer timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Failed to copy into the publish directory.
    #[error("Failed to copy file from {source} to {destination}")]
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// The publisher is not usable with its current configuration.
    #[error("Publisher misconfigured: {reason}")]
    Misconfigured { reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Creates a copy failed error.
    pub fn copy_failed(source: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::CopyFailed {
            source,
            destination,
            error,
        }
    }

    /// Creates a misconfiguration error.
    pub fn misconfigured(reason: impl Into<String>) -> Self {
        Self::Misconfigured {
            reason: reason.into(),
        }
    }
}
