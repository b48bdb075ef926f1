//! Mock publisher for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::publisher::{PublishError, Publisher};

/// A recorded publish for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPublish {
    /// File that was published.
    pub path: PathBuf,
    /// Name it was published under.
    pub name: String,
}

/// Mock implementation of the Publisher trait.
///
/// Returns `mock://published/<name>` and records every call.
#[derive(Debug, Clone)]
pub struct MockPublisher {
    published: Arc<RwLock<Vec<RecordedPublish>>>,
    /// If set, the next publish will fail with this error.
    next_error: Arc<RwLock<Option<PublishError>>>,
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPublisher {
    /// Base of returned references.
    pub const BASE_URL: &'static str = "mock://published";

    /// Create a new mock publisher.
    pub fn new() -> Self {
        Self {
            published: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded publishes.
    pub async fn recorded_publishes(&self) -> Vec<RecordedPublish> {
        self.published.read().await.clone()
    }

    /// Configure the next publish to fail with the given error.
    pub async fn set_next_error(&self, error: PublishError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn publish(&self, path: &Path, name: &str) -> Result<String, PublishError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if !path.exists() {
            return Err(PublishError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        self.published.write().await.push(RecordedPublish {
            path: path.to_path_buf(),
            name: name.to_string(),
        });
        Ok(format!("{}/{}", Self::BASE_URL, name))
    }

    async fn validate(&self) -> Result<(), PublishError> {
        Ok(())
    }
}
