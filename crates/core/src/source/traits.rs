//! Trait definitions for the source module.

use async_trait::async_trait;

use super::error::SourceError;
use super::types::{Row, RowId};

/// An open connection to a sheet.
///
/// Implementations are not required to be safe for concurrent use; callers
/// go through [`SharedSheet`](super::SharedSheet), which holds a lock for the
/// duration of exactly one call.
#[async_trait]
pub trait Sheet: Send {
    /// Reads every data row, in sheet order.
    ///
    /// Row ids are 1-based positions in that order.
    async fn read_all_rows(&mut self) -> Result<Vec<Row>, SourceError>;

    /// Sets the cell at (`row_id`, `column`) to `value`.
    async fn write_cell(
        &mut self,
        row_id: RowId,
        column: &str,
        value: &str,
    ) -> Result<(), SourceError>;
}

/// Something that can open connections to a sheet.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Returns the name of this source implementation.
    fn name(&self) -> &str;

    /// Opens a fresh connection.
    async fn open(&self) -> Result<Box<dyn Sheet>, SourceError>;
}
