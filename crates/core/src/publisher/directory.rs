//! Local directory publisher implementation.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use super::config::DirectoryConfig;
use super::error::PublishError;
use super::join_reference;
use super::traits::Publisher;

/// Publisher that copies files into a local directory.
///
/// The copy goes to a hidden temporary name first and is renamed into place,
/// so readers of the directory never observe a partial file.
pub struct DirectoryPublisher {
    config: DirectoryConfig,
}

impl DirectoryPublisher {
    /// Creates a new directory publisher with the given configuration.
    pub fn new(config: DirectoryConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Publisher for DirectoryPublisher {
    fn name(&self) -> &str {
        "directory"
    }

    async fn publish(&self, path: &Path, name: &str) -> Result<String, PublishError> {
        if !path.exists() {
            return Err(PublishError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        fs::create_dir_all(&self.config.path).await?;

        let destination = self.config.path.join(name);
        let staging = self.config.path.join(format!(".{}.partial", name));

        if let Err(e) = fs::copy(path, &staging).await {
            let _ = fs::remove_file(&staging).await;
            return Err(PublishError::copy_failed(path.to_path_buf(), destination, e));
        }
        if let Err(e) = fs::rename(&staging, &destination).await {
            let _ = fs::remove_file(&staging).await;
            return Err(PublishError::copy_failed(path.to_path_buf(), destination, e));
        }

        Ok(match &self.config.public_url {
            Some(url) => join_reference(url, name),
            None => destination.to_string_lossy().to_string(),
        })
    }

    async fn validate(&self) -> Result<(), PublishError> {
        if self.config.path.as_os_str().is_empty() {
            return Err(PublishError::misconfigured("publish directory is not set"));
        }
        fs::create_dir_all(&self.config.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_publish_copies_and_returns_url() {
        let source_dir = TempDir::new().unwrap();
        let publish_dir = TempDir::new().unwrap();
        let file = source_dir.path().join("cut.mp3");
        std::fs::write(&file, b"audio").unwrap();

        let publisher = DirectoryPublisher::new(
            DirectoryConfig::new(publish_dir.path().join("cuts"))
                .with_public_url("https://example.com/cuts/"),
        );

        let url = publisher.publish(&file, "3-song.mp3").await.unwrap();
        assert_eq!(url, "https://example.com/cuts/3-song.mp3");

        let published = publish_dir.path().join("cuts").join("3-song.mp3");
        assert_eq!(std::fs::read(&published).unwrap(), b"audio");
        // Source stays; the job workspace owns it
        assert!(file.exists());
        // No staging leftovers
        assert_eq!(
            std::fs::read_dir(publish_dir.path().join("cuts")).unwrap().count(),
            1
        );
    }

    #[tokio::test]
    async fn test_publish_without_url_returns_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cut.mp3");
        std::fs::write(&file, b"audio").unwrap();

        let publisher = DirectoryPublisher::new(DirectoryConfig::new(dir.path().join("out")));
        let reference = publisher.publish(&file, "a.mp3").await.unwrap();
        assert_eq!(
            reference,
            dir.path().join("out").join("a.mp3").to_string_lossy()
        );
    }

    #[tokio::test]
    async fn test_publish_missing_source() {
        let dir = TempDir::new().unwrap();
        let publisher = DirectoryPublisher::new(DirectoryConfig::new(dir.path().to_path_buf()));
        let err = publisher
            .publish(&dir.path().join("missing.mp3"), "a.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::SourceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_validate_unset_directory() {
        let publisher = DirectoryPublisher::new(DirectoryConfig::default());
        assert!(matches!(
            publisher.validate().await.unwrap_err(),
            PublishError::Misconfigured { .. }
        ));
    }
}
