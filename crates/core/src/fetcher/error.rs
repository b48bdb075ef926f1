//! Error types for the fetcher module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching source media.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The tool ran and reported that the source could not be retrieved
    /// (unavailable, private, invalid link, ...).
    #[error("Source could not be retrieved: {message}")]
    SourceUnavailable { message: String },

    /// Download tool binary not found.
    #[error("Download tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The tool failed in a way that does not identify a bad source.
    #[error("Download tool failed with exit code {exit_code:?}")]
    ToolFailed {
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    /// The tool did not finish in time.
    #[error("Download timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The tool succeeded but no output file appeared.
    #[error("No output file matching {prefix}")]
    NoOutput { prefix: PathBuf },

    /// The tool produced more than one candidate output file.
    #[error("Expected one output file for {prefix}, found {count}")]
    AmbiguousOutput { prefix: PathBuf, count: usize },

    /// I/O error while running the tool or inspecting its output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Creates a source-unavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
        }
    }

    /// Whether the tool cleanly reported a bad or unavailable source.
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}
