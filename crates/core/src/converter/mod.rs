//! Converter module for cutting and transcoding audio.
//!
//! This module provides the `Converter` trait and an FFmpeg implementation that
//! trims a source file, applies fades and embeds descriptive metadata.
//!
//! # Example
//!
//! ```ignore
//! use sheetcut_core::converter::{Converter, ConversionJob, CutParams, EmbeddedMetadata, FfmpegConverter};
//!
//! let converter = FfmpegConverter::with_defaults();
//! converter.validate().await?;
//!
//! let job = ConversionJob {
//!     job_id: "row-12".to_string(),
//!     input_path: PathBuf::from("/tmp/job/source.webm"),
//!     output_path: PathBuf::from("/tmp/job/cut.mp3"),
//!     params: CutParams {
//!         start: Some(12.0),
//!         end: Some(95.5),
//!         fade_in: None,
//!         fade_out: Some(3.0),
//!     },
//!     metadata: EmbeddedMetadata {
//!         title: "Song Title".to_string(),
//!         ..Default::default()
//!     },
//! };
//!
//! let result = converter.convert(job).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use traits::Converter;
pub use types::{
    ConversionJob, ConversionResult, CutParams, EmbeddedMetadata, FadeFilter, FadeKind, MediaInfo,
    TrimPlan,
};
