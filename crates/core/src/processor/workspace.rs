//! Per-job scratch directories.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// A uniquely named directory under the temp dir holding every temporary
/// artifact of one job.
///
/// Jobs call [`remove`](Self::remove) when they are done. If the guard is
/// dropped without it (cancellation, unwinding) the directory is removed
/// synchronously in `Drop`.
#[derive(Debug)]
pub struct JobWorkspace {
    path: PathBuf,
    removed: bool,
}

impl JobWorkspace {
    /// Creates `<temp_dir>/<uuid>`, creating `temp_dir` if needed.
    pub async fn create(temp_dir: &Path) -> std::io::Result<Self> {
        let path = temp_dir.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&path).await?;
        debug!("Created job workspace {:?}", path);
        Ok(Self {
            path,
            removed: false,
        })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path for `name` inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Removes the directory without blocking the runtime.
    pub async fn remove(mut self) {
        self.removed = true;
        let result = tokio::fs::remove_dir_all(&self.path).await;
        self.log_removal(result);
    }

    fn log_removal(&self, result: std::io::Result<()>) {
        match result {
            Ok(()) => debug!("Removed job workspace {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove job workspace {:?}: {}", self.path, e),
        }
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if !self.removed {
            let result = std::fs::remove_dir_all(&self.path);
            self.log_removal(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_workspace_removed_on_drop() {
        let temp = TempDir::new().unwrap();
        let workspace = JobWorkspace::create(&temp.path().join("jobs")).await.unwrap();
        let path = workspace.path().to_path_buf();
        std::fs::write(workspace.file("source.webm"), b"x").unwrap();
        assert!(path.exists());

        drop(workspace);
        assert!(!path.exists());
        assert!(temp.path().join("jobs").exists());
    }

    #[tokio::test]
    async fn test_workspace_remove_deletes_directory() {
        let temp = TempDir::new().unwrap();
        let workspace = JobWorkspace::create(temp.path()).await.unwrap();
        let path = workspace.path().to_path_buf();
        std::fs::create_dir(workspace.file("frames")).unwrap();
        std::fs::write(workspace.file("frames/0001.png"), b"x").unwrap();

        workspace.remove().await;
        assert!(!path.exists());
        assert!(temp.path().exists());
    }

    #[tokio::test]
    async fn test_workspace_remove_tolerates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let workspace = JobWorkspace::create(temp.path()).await.unwrap();
        std::fs::remove_dir_all(workspace.path()).unwrap();

        // Already gone; neither remove nor the drop after it fails
        workspace.remove().await;
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_workspaces_are_unique() {
        let temp = TempDir::new().unwrap();
        let a = JobWorkspace::create(temp.path()).await.unwrap();
        let b = JobWorkspace::create(temp.path()).await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn test_workspace_removed_on_panic() {
        let temp = TempDir::new().unwrap();
        let workspace = JobWorkspace::create(temp.path()).await.unwrap();
        let path = workspace.path().to_path_buf();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = workspace;
            panic!("job panicked");
        }));
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
