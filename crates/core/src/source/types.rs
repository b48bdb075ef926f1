//! Types for the source module.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 1-based position of a row within the sheet.
pub type RowId = u32;

/// One data row: its id plus every named cell the source returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Row id (position in scan order, starting at 1).
    pub id: RowId,
    /// Cell values keyed by column name.
    pub fields: BTreeMap<String, String>,
}

impl Row {
    /// Creates a row from an id and its cells.
    pub fn new(id: RowId, fields: BTreeMap<String, String>) -> Self {
        Self { id, fields }
    }

    /// Returns the cell value for `column`, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// Whether the row has a cell named `column`.
    pub fn has_field(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Replaces the value of an existing cell.
    ///
    /// Returns `false` (and leaves the row untouched) if the column is absent.
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(column) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    /// Whether the external ready gate is open for this row.
    pub fn is_ready(&self, columns: &ColumnMap) -> bool {
        self.get(&columns.ready) == columns.ready_value
    }

    /// Parses the processing state cell.
    ///
    /// `None` means the cell holds text this runner does not recognise.
    pub fn state(&self, columns: &ColumnMap) -> Option<RowState> {
        RowState::from_cell(self.get(&columns.state))
    }
}

/// Processing state of a row, as stored in the state column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    /// Never picked up (empty cell or "Not Yet").
    NotStarted,
    /// Claimed by a runner; a job is (or was) running.
    InProgress,
    /// Finished successfully.
    Complete,
    /// Finished with an error.
    Errored,
}

/// Rejected state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid row state transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RowState,
    pub to: RowState,
}

impl RowState {
    /// Parses a state cell. Surrounding whitespace is ignored.
    pub fn from_cell(cell: &str) -> Option<Self> {
        match cell.trim() {
            "" | "Not Yet" => Some(Self::NotStarted),
            "In Progress" => Some(Self::InProgress),
            "Complete" => Some(Self::Complete),
            "Errored" => Some(Self::Errored),
            _ => None,
        }
    }

    /// The text written to the state column for this state.
    pub fn as_cell(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Yet",
            Self::InProgress => "In Progress",
            Self::Complete => "Complete",
            Self::Errored => "Errored",
        }
    }

    /// Whether this is a final state of a job run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Errored)
    }

    /// Transition table.
    ///
    /// Entering `InProgress` is a claim and is allowed from every state
    /// (restart policies decide which rows are offered); terminal states are
    /// only reachable from `InProgress`; nothing goes back to `NotStarted`.
    pub fn can_transition_to(&self, next: RowState) -> bool {
        use RowState::*;
        match (self, next) {
            (_, InProgress) => true,
            (InProgress, Complete) | (InProgress, Errored) => true,
            (_, Complete) | (_, Errored) | (_, NotStarted) => false,
        }
    }

    /// Validates a transition, returning the new state.
    pub fn transition(self, next: RowState) -> Result<RowState, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition { from: self, to: next })
        }
    }
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cell())
    }
}

/// Names of the sheet columns the runner reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    /// External gate column.
    #[serde(default = "default_ready")]
    pub ready: String,

    /// Value of the gate column that marks a row as ready.
    #[serde(default = "default_ready_value")]
    pub ready_value: String,

    /// Processing state column.
    #[serde(default = "default_state")]
    pub state: String,

    /// Source link handed to the fetcher.
    #[serde(default = "default_source_link")]
    pub source_link: String,

    #[serde(default = "default_start")]
    pub start: String,

    #[serde(default = "default_end")]
    pub end: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_artist")]
    pub artist: String,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_fade_in")]
    pub fade_in: String,

    #[serde(default = "default_fade_out")]
    pub fade_out: String,

    /// Column receiving the published reference.
    #[serde(default = "default_result_link")]
    pub result_link: String,

    /// Column receiving the error message of a failed job.
    #[serde(default = "default_error")]
    pub error: String,
}

fn default_ready() -> String {
    "Ready for VST".to_string()
}

fn default_ready_value() -> String {
    "Ready".to_string()
}

fn default_state() -> String {
    "Processed by VST".to_string()
}

fn default_source_link() -> String {
    "YouTube Link".to_string()
}

fn default_start() -> String {
    "Start Time".to_string()
}

fn default_end() -> String {
    "End Time".to_string()
}

fn default_title() -> String {
    "Song".to_string()
}

fn default_artist() -> String {
    "Artist".to_string()
}

fn default_category() -> String {
    "Category".to_string()
}

fn default_fade_in() -> String {
    "Fade In?".to_string()
}

fn default_fade_out() -> String {
    "Fade Out?".to_string()
}

fn default_result_link() -> String {
    "Processed Link".to_string()
}

fn default_error() -> String {
    "Error".to_string()
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            ready: default_ready(),
            ready_value: default_ready_value(),
            state: default_state(),
            source_link: default_source_link(),
            start: default_start(),
            end: default_end(),
            title: default_title(),
            artist: default_artist(),
            category: default_category(),
            fade_in: default_fade_in(),
            fade_out: default_fade_out(),
            result_link: default_result_link(),
            error: default_error(),
        }
    }
}

impl ColumnMap {
    /// Every column name, in sheet header order used by the bundled fixtures.
    pub fn all(&self) -> Vec<&str> {
        vec![
            self.ready.as_str(),
            self.state.as_str(),
            self.source_link.as_str(),
            self.start.as_str(),
            self.end.as_str(),
            self.title.as_str(),
            self.artist.as_str(),
            self.category.as_str(),
            self.fade_in.as_str(),
            self.fade_out.as_str(),
            self.result_link.as_str(),
            self.error.as_str(),
        ]
    }
}
