//! Lock-serialized access to an open sheet.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use super::error::SourceError;
use super::traits::Sheet;
use super::types::{ColumnMap, Row, RowId, RowState};

/// A sheet connection shared by the scanner, the dispatcher and every job.
///
/// The lock is held for one read or one cell write at a time, never across a
/// job or an external tool invocation.
#[derive(Clone)]
pub struct SharedSheet {
    inner: Arc<Mutex<Box<dyn Sheet>>>,
}

impl SharedSheet {
    /// Wraps an open connection.
    pub fn new(sheet: Box<dyn Sheet>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sheet)),
        }
    }

    /// Reads every row under the lock.
    pub async fn read_all_rows(&self) -> Result<Vec<Row>, SourceError> {
        let mut sheet = self.inner.lock().await;
        sheet.read_all_rows().await
    }

    /// Writes a single cell under the lock.
    pub async fn write_cell(
        &self,
        row_id: RowId,
        column: &str,
        value: &str,
    ) -> Result<(), SourceError> {
        debug!("Updating cell ({}, {:?}) = {:?}", row_id, column, value);
        let mut sheet = self.inner.lock().await;
        sheet.write_cell(row_id, column, value).await
    }

    /// Writes `state` to the row's state column.
    pub async fn write_state(
        &self,
        columns: &ColumnMap,
        row_id: RowId,
        state: RowState,
    ) -> Result<(), SourceError> {
        self.write_cell(row_id, &columns.state, state.as_cell()).await
    }
}

impl std::fmt::Debug for SharedSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSheet").finish_non_exhaustive()
    }
}
