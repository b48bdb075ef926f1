//! Trait definitions for the publisher module.

use async_trait::async_trait;
use std::path::Path;

use super::error::PublishError;

/// Something that can make a local file publicly reachable.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Returns the name of this publisher implementation.
    fn name(&self) -> &str;

    /// Publishes `path` under `name` (extension included) and returns the
    /// public reference.
    async fn publish(&self, path: &Path, name: &str) -> Result<String, PublishError>;

    /// Validates that the publisher is properly configured and ready.
    async fn validate(&self) -> Result<(), PublishError>;
}

#[async_trait]
impl Publisher for Box<dyn Publisher> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn publish(&self, path: &Path, name: &str) -> Result<String, PublishError> {
        (**self).publish(path, name).await
    }

    async fn validate(&self) -> Result<(), PublishError> {
        (**self).validate().await
    }
}
