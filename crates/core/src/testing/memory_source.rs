//! In-memory sheet for testing.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::source::{ColumnMap, Row, RowId, RowState, SharedSheet, Sheet, SheetSource, SourceError};

/// A recorded cell write for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub row_id: RowId,
    pub column: String,
    pub value: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Row>,
    columns: BTreeSet<String>,
    writes: Vec<RecordedWrite>,
    opens: usize,
    fail_opens: usize,
    fail_reads: usize,
    fail_writes: usize,
    pass_writes: usize,
}

/// Mock data source holding its rows in memory.
///
/// Every connection it opens shares the same rows, so writes made by one job
/// are visible to the next scan. Failures can be injected for the next N
/// opens, reads or writes; they surface as [`SourceError::Unavailable`], the
/// same as a dropped connection.
///
/// # Example
///
/// ```rust,ignore
/// use sheetcut_core::testing::{fixtures, MemorySource};
///
/// let source = MemorySource::new(vec![fixtures::ready_row(1)]);
/// source.fail_opens(2);
///
/// // run the dispatcher...
///
/// assert_eq!(source.open_count(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySource {
    /// Creates a source holding `rows`. Row ids are taken as given.
    ///
    /// The sheet's columns are every column named by any row.
    pub fn new(rows: Vec<Row>) -> Self {
        let columns = rows
            .iter()
            .flat_map(|r| r.fields.keys().cloned())
            .collect();
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                rows,
                columns,
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide the rows from the assertions
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Opens a connection directly, bypassing injected open failures.
    pub fn shared_sheet(&self) -> SharedSheet {
        SharedSheet::new(Box::new(MemorySheet {
            state: self.state.clone(),
        }))
    }

    /// Adds an (empty) column to the sheet.
    pub fn add_column(&self, column: impl Into<String>) {
        self.lock().columns.insert(column.into());
    }

    /// Fails the next `n` opens.
    pub fn fail_opens(&self, n: usize) {
        self.lock().fail_opens = n;
    }

    /// Fails the next `n` full-sheet reads.
    pub fn fail_reads(&self, n: usize) {
        self.lock().fail_reads = n;
    }

    /// Fails the next `n` cell writes.
    pub fn fail_writes(&self, n: usize) {
        self.fail_writes_after(0, n);
    }

    /// Lets `skip` cell writes through, then fails the following `n`.
    pub fn fail_writes_after(&self, skip: usize, n: usize) {
        let mut state = self.lock();
        state.pass_writes = skip;
        state.fail_writes = n;
    }

    /// Number of open attempts, failed ones included.
    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    /// Current rows.
    pub fn rows(&self) -> Vec<Row> {
        self.lock().rows.clone()
    }

    /// Current contents of one row.
    pub fn row(&self, row_id: RowId) -> Option<Row> {
        self.lock().rows.iter().find(|r| r.id == row_id).cloned()
    }

    /// Current value of one cell (`""` when unset).
    pub fn cell(&self, row_id: RowId, column: &str) -> String {
        self.row(row_id)
            .map(|r| r.get(column).to_string())
            .unwrap_or_default()
    }

    /// Sets a cell without recording it as a write.
    pub fn set_cell(&self, row_id: RowId, column: &str, value: &str) {
        let mut state = self.lock();
        state.columns.insert(column.to_string());
        if let Some(row) = state.rows.iter_mut().find(|r| r.id == row_id) {
            row.fields.insert(column.to_string(), value.to_string());
        }
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.lock().writes.clone()
    }

    /// Values written to one cell, in order.
    pub fn writes_to(&self, row_id: RowId, column: &str) -> Vec<String> {
        self.lock()
            .writes
            .iter()
            .filter(|w| w.row_id == row_id && w.column == column)
            .map(|w| w.value.clone())
            .collect()
    }

    /// State writes that broke the row state machine, as `(row, from, to)`.
    ///
    /// The starting state of each row is whatever its first state write
    /// moved away from, so rows seeded mid-lifecycle are judged correctly.
    pub fn invalid_transitions(&self, columns: &ColumnMap, initial: &[Row]) -> Vec<(RowId, String, String)> {
        let state = self.lock();
        let mut invalid = Vec::new();
        for seed in initial {
            let mut current = seed.get(&columns.state).to_string();
            for write in state
                .writes
                .iter()
                .filter(|w| w.row_id == seed.id && w.column == columns.state)
            {
                let allowed = match (RowState::from_cell(&current), RowState::from_cell(&write.value)) {
                    (Some(from), Some(to)) => from.can_transition_to(to),
                    // Unknown text may only be replaced by a claim
                    (None, Some(to)) => to == RowState::InProgress,
                    (_, None) => false,
                };
                if !allowed {
                    invalid.push((seed.id, current.clone(), write.value.clone()));
                }
                current = write.value.clone();
            }
        }
        invalid
    }
}

#[async_trait]
impl SheetSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn open(&self) -> Result<Box<dyn Sheet>, SourceError> {
        let mut state = self.lock();
        state.opens += 1;
        if state.fail_opens > 0 {
            state.fail_opens -= 1;
            return Err(SourceError::Unavailable("injected open failure".to_string()));
        }
        Ok(Box::new(MemorySheet {
            state: self.state.clone(),
        }))
    }
}

/// Connection handed out by [`MemorySource`].
#[derive(Debug)]
pub struct MemorySheet {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySheet {
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Sheet for MemorySheet {
    async fn read_all_rows(&mut self) -> Result<Vec<Row>, SourceError> {
        let mut state = self.lock();
        if state.fail_reads > 0 {
            state.fail_reads -= 1;
            return Err(SourceError::Unavailable("injected read failure".to_string()));
        }
        Ok(state.rows.clone())
    }

    async fn write_cell(
        &mut self,
        row_id: RowId,
        column: &str,
        value: &str,
    ) -> Result<(), SourceError> {
        let mut state = self.lock();
        if state.pass_writes > 0 {
            state.pass_writes -= 1;
        } else if state.fail_writes > 0 {
            state.fail_writes -= 1;
            return Err(SourceError::Unavailable("injected write failure".to_string()));
        }
        if !state.columns.contains(column) {
            return Err(SourceError::UnknownColumn(column.to_string()));
        }
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or(SourceError::RowNotFound(row_id))?;
        row.fields.insert(column.to_string(), value.to_string());
        state.writes.push(RecordedWrite {
            row_id,
            column: column.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_writes_are_shared_between_connections() {
        let source = MemorySource::new(vec![fixtures::ready_row(1)]);
        let first = source.shared_sheet();
        let second = SharedSheet::new(source.open().await.unwrap());

        first.write_cell(1, "Song", "Changed").await.unwrap();

        let rows = second.read_all_rows().await.unwrap();
        assert_eq!(rows[0].get("Song"), "Changed");
        assert_eq!(source.writes_to(1, "Song"), vec!["Changed"]);
    }

    #[tokio::test]
    async fn test_write_rejects_unknown_row_and_column() {
        let source = MemorySource::new(vec![fixtures::ready_row(1)]);
        let sheet = source.shared_sheet();

        let err = sheet.write_cell(9, "Song", "x").await.unwrap_err();
        assert!(matches!(err, SourceError::RowNotFound(9)));
        let err = sheet.write_cell(1, "Nope", "x").await.unwrap_err();
        assert!(matches!(err, SourceError::UnknownColumn(_)));
        assert!(source.writes().is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed() {
        let source = MemorySource::new(vec![fixtures::ready_row(1)]);
        source.fail_opens(1);
        source.fail_writes(1);

        assert!(source.open().await.is_err());
        let sheet = SharedSheet::new(source.open().await.unwrap());
        assert_eq!(source.open_count(), 2);

        assert!(matches!(
            sheet.write_cell(1, "Song", "x").await,
            Err(SourceError::Unavailable(_))
        ));
        sheet.write_cell(1, "Song", "x").await.unwrap();
    }

    #[test]
    fn test_invalid_transitions() {
        let columns = ColumnMap::default();
        let seed = vec![fixtures::ready_row(1)];
        let source = MemorySource::new(seed.clone());
        {
            let mut state = source.lock();
            for value in ["In Progress", "Complete", "Errored"] {
                state.writes.push(RecordedWrite {
                    row_id: 1,
                    column: columns.state.clone(),
                    value: value.to_string(),
                });
            }
        }

        assert_eq!(
            source.invalid_transitions(&columns, &seed),
            vec![(1, "Complete".to_string(), "Errored".to_string())]
        );
    }
}
