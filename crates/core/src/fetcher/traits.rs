//! Trait definitions for the fetcher module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::FetchError;

/// Something that can download a source link to a local file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Downloads `link`, writing exactly one file named `<output_prefix>.<ext>`.
    ///
    /// Returns the path of that file.
    async fn fetch(&self, link: &str, output_prefix: &Path) -> Result<PathBuf, FetchError>;

    /// Validates that the fetcher is properly configured and ready.
    async fn validate(&self) -> Result<(), FetchError>;
}
