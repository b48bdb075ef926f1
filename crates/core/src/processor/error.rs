//! Error classification for row jobs.

use thiserror::Error;

use crate::converter::ConverterError;
use crate::fetcher::FetchError;
use crate::publisher::PublishError;

use super::timecode::TimecodeError;

/// How a job failure is reported on its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobErrorKind {
    /// The source could not be retrieved; the row's link is probably bad.
    Retrieval,
    /// Anything else went wrong while processing the row.
    Internal,
}

impl JobErrorKind {
    /// Label used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieval => "retrieval_error",
            Self::Internal => "internal_error",
        }
    }
}

/// A failure of one row's pipeline.
#[derive(Debug, Error)]
pub enum JobError {
    /// The download tool cleanly reported that the source is unavailable.
    #[error("{diagnostic}")]
    Retrieval { diagnostic: String },

    /// The row has no source link.
    #[error("row has no value in column {column:?}")]
    MissingLink { column: String },

    #[error(transparent)]
    Fetch(FetchError),

    #[error(transparent)]
    Transcode(#[from] ConverterError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    /// A time cell could not be parsed.
    #[error("column {column:?}: {source}")]
    Timecode {
        column: String,
        #[source]
        source: TimecodeError,
    },

    /// The job workspace could not be created.
    #[error("failed to create job workspace: {0}")]
    Workspace(#[source] std::io::Error),
}

impl From<FetchError> for JobError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::SourceUnavailable { message } => Self::Retrieval {
                diagnostic: message,
            },
            other => Self::Fetch(other),
        }
    }
}

impl JobError {
    /// Creates a timecode error for `column`.
    pub fn timecode(column: impl Into<String>, source: TimecodeError) -> Self {
        Self::Timecode {
            column: column.into(),
            source,
        }
    }

    /// Retrieval or internal.
    pub fn kind(&self) -> JobErrorKind {
        match self {
            Self::Retrieval { .. } => JobErrorKind::Retrieval,
            _ => JobErrorKind::Internal,
        }
    }

    /// Pipeline step the error belongs to.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Retrieval { .. } | Self::MissingLink { .. } | Self::Fetch(_) => "fetch",
            Self::Transcode(_) => "transcode",
            Self::Publish(_) => "publish",
            Self::Timecode { .. } => "timecode",
            Self::Workspace(_) => "workspace",
        }
    }

    /// The message written to the row's error column.
    ///
    /// Tool stderr is never included beyond the retrieval diagnostic.
    pub fn row_message(&self) -> String {
        match self {
            Self::Retrieval { diagnostic } => format!("Download error: {}", diagnostic),
            other => format!("Internal error {}: {}", other.category(), other),
        }
    }
}
