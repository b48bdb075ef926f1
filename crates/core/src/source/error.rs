//! Error types for the source module.

use thiserror::Error;

use super::types::RowId;

/// Errors raised while talking to the tabular data source.
///
/// Every variant is treated as a connection-level failure by the dispatcher:
/// the current scan/dispatch cycle is abandoned and the connection reopened.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The data source could not be opened.
    #[error("Failed to open data source: {0}")]
    Open(String),

    /// The configured table/worksheet does not exist.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// A write named a column that is not part of the sheet.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A write targeted a row that does not exist.
    #[error("Row not found: {0}")]
    RowNotFound(RowId),

    /// The backend reported an error for a read or a write.
    #[error("Database error: {0}")]
    Database(String),

    /// The connection is unusable (dropped, closed, injected failure).
    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for SourceError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}
