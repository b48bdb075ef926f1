//! Testing utilities and mock implementations.
//!
//! This module provides an in-memory data source and mock implementations
//! of the fetch, transcode and publish traits, so the whole dispatcher can be
//! exercised without external tools or a real sheet.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetcut_core::testing::{fixtures, MemorySource, MockConverter, MockFetcher, MockPublisher};
//!
//! let source = MemorySource::new(vec![fixtures::ready_row(1), fixtures::ready_row(2)]);
//! let fetcher = MockFetcher::new();
//! fetcher.set_unavailable("https://example.com/2", "Video unavailable").await;
//!
//! // Build a PipelineProcessor from the mocks...
//! ```

mod memory_source;
mod mock_converter;
mod mock_fetcher;
mod mock_publisher;

pub use memory_source::{MemorySheet, MemorySource, RecordedWrite};
pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_fetcher::MockFetcher;
pub use mock_publisher::{MockPublisher, RecordedPublish};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::source::{ColumnMap, Row, RowId};

    /// Link used by [`ready_row`] for row `id`.
    pub fn link_for(id: RowId) -> String {
        format!("https://example.com/watch?v={}", id)
    }

    /// Create a row with every default column present.
    ///
    /// Timing, fade and output cells start empty.
    pub fn sheet_row(id: RowId, ready: &str, state: &str, link: &str, title: &str) -> Row {
        let columns = ColumnMap::default();
        let mut fields: std::collections::BTreeMap<String, String> = columns
            .all()
            .into_iter()
            .map(|c| (c.to_string(), String::new()))
            .collect();
        fields.insert(columns.ready.clone(), ready.to_string());
        fields.insert(columns.state.clone(), state.to_string());
        fields.insert(columns.source_link.clone(), link.to_string());
        fields.insert(columns.title.clone(), title.to_string());
        fields.insert(columns.artist.clone(), "Test Artist".to_string());
        Row::new(id, fields)
    }

    /// Create a ready, never-processed row.
    pub fn ready_row(id: RowId) -> Row {
        sheet_row(id, "Ready", "", &link_for(id), &format!("Song {}", id))
    }

    /// Create a ready row with `column` set to `value`.
    pub fn ready_row_with(id: RowId, column: &str, value: &str) -> Row {
        let mut row = ready_row(id);
        row.fields.insert(column.to_string(), value.to_string());
        row
    }
}
