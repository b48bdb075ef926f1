//! Processor module: the per-row job pipeline.
//!
//! [`PipelineProcessor`] runs one claimed row through four steps:
//! - Acquire: download the row's source link into a fresh [`JobWorkspace`]
//! - Transform: cut, fade and tag the download
//! - Publish: hand the cut to the publisher under a name derived from the row
//! - Record: write the reference (or a classified error) and the final state
//!
//! Failures never escape `process`; they end up on the row as
//! `Download error: ...` or `Internal error <category>: ...`.
//!
//! # Example
//!
//! ```ignore
//! use sheetcut_core::processor::{PipelineProcessor, ProcessorConfig};
//! use sheetcut_core::converter::FfmpegConverter;
//! use sheetcut_core::fetcher::YtDlpFetcher;
//! use sheetcut_core::publisher::{DirectoryConfig, DirectoryPublisher};
//!
//! let processor = PipelineProcessor::new(
//!     ProcessorConfig::default(),
//!     ColumnMap::default(),
//!     YtDlpFetcher::with_defaults(),
//!     FfmpegConverter::with_defaults(),
//!     DirectoryPublisher::new(DirectoryConfig::new("/srv/www/cuts".into())),
//! );
//!
//! let outcome = processor.process(&sheet, row, false).await;
//! ```

mod config;
mod error;
mod pipeline;
mod timecode;
mod types;
mod workspace;

pub use config::ProcessorConfig;
pub use error::{JobError, JobErrorKind};
pub use pipeline::PipelineProcessor;
pub use timecode::{parse_time, TimecodeError};
pub use types::{publish_name, CutRequest, JobOutcome};
pub use workspace::JobWorkspace;
