//! Types for the processor module.

use serde::{Deserialize, Serialize};

use crate::converter::{CutParams, EmbeddedMetadata};
use crate::source::{ColumnMap, Row, RowId};

use super::error::{JobError, JobErrorKind};
use super::timecode::parse_time;

/// Everything a job needs from its row, parsed up front.
#[derive(Debug, Clone, PartialEq)]
pub struct CutRequest {
    pub row_id: RowId,
    /// Link handed to the fetcher.
    pub link: String,
    pub params: CutParams,
    pub metadata: EmbeddedMetadata,
}

impl CutRequest {
    /// Reads and parses the row's cells.
    pub fn from_row(row: &Row, columns: &ColumnMap) -> Result<Self, JobError> {
        let link = row.get(&columns.source_link).trim();
        if link.is_empty() {
            return Err(JobError::MissingLink {
                column: columns.source_link.clone(),
            });
        }

        let time = |column: &String| {
            parse_time(row.get(column)).map_err(|e| JobError::timecode(column.as_str(), e))
        };

        Ok(Self {
            row_id: row.id,
            link: link.to_string(),
            params: CutParams {
                start: time(&columns.start)?,
                end: time(&columns.end)?,
                fade_in: time(&columns.fade_in)?,
                fade_out: time(&columns.fade_out)?,
            },
            metadata: EmbeddedMetadata {
                title: row.get(&columns.title).to_string(),
                artist: row.get(&columns.artist).to_string(),
                genre: row.get(&columns.category).to_string(),
            },
        })
    }

    /// Name the cut is published under, extension included.
    pub fn publish_name(&self, extension: &str) -> String {
        publish_name(self.row_id, &self.metadata.title, extension)
    }
}

/// Builds `<row id>-<sanitized title>.<extension>`.
///
/// The title is lowercased, spaces become `_` and anything outside ASCII
/// letters, digits, `.`, `_` and `-` is dropped. An empty title is published
/// as `no-title`.
pub fn publish_name(row_id: RowId, title: &str, extension: &str) -> String {
    let base = if title.is_empty() { "no-title" } else { title };
    let sanitized: String = base
        .replace(' ', "_")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        format!("{}-{}", row_id, sanitized)
    } else {
        format!("{}-{}.{}", row_id, sanitized, extension)
    }
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum JobOutcome {
    /// Published and recorded.
    Complete { reference: String },
    /// Failed; the message was recorded on the row.
    Errored { retrieval: bool, message: String },
    /// Writing the outcome to the data source failed; the row keeps its
    /// claimed state.
    Unrecorded { reason: String },
}

impl JobOutcome {
    pub(crate) fn errored(kind: JobErrorKind, message: String) -> Self {
        Self::Errored {
            retrieval: kind == JobErrorKind::Retrieval,
            message,
        }
    }

    /// Whether the job completed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Complete { .. } => "complete",
            Self::Errored { retrieval: true, .. } => JobErrorKind::Retrieval.as_str(),
            Self::Errored { .. } => JobErrorKind::Internal.as_str(),
            Self::Unrecorded { .. } => "unrecorded",
        }
    }
}
