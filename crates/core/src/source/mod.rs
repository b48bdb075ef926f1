//! Tabular data source access.
//!
//! A data source is anything that can hand out rows of named string cells and
//! accept single-cell writes back. The dispatcher treats it as one shared,
//! non-thread-safe resource:
//! - [`SheetSource`] opens a connection ([`Sheet`])
//! - [`SharedSheet`] serializes every read and write through one lock
//! - [`SqliteSource`] is the bundled backend, one table per sheet

mod error;
mod shared;
mod sqlite;
mod traits;
mod types;

pub use error::SourceError;
pub use shared::SharedSheet;
pub use sqlite::{SqliteSheet, SqliteSource};
pub use traits::{Sheet, SheetSource};
pub use types::{ColumnMap, InvalidTransition, Row, RowId, RowState};
