//! Fetcher module for acquiring source media.
//!
//! The fetcher turns a source link (usually a video page URL) into exactly one
//! local file. [`YtDlpFetcher`] shells out to `yt-dlp` (or a compatible
//! `youtube-dl` binary) and lets the tool pick the file extension.

mod config;
mod error;
mod traits;
mod ytdlp;

pub use config::FetcherConfig;
pub use error::FetchError;
pub use traits::Fetcher;
pub use ytdlp::YtDlpFetcher;
