//! scp-based publisher implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::ScpConfig;
use super::error::PublishError;
use super::join_reference;
use super::traits::Publisher;

/// Publisher that copies files to a remote host with `scp`.
pub struct ScpPublisher {
    config: ScpConfig,
}

impl ScpPublisher {
    /// Creates a new scp publisher with the given configuration.
    pub fn new(config: ScpConfig) -> Self {
        Self { config }
    }

    /// Builds scp arguments for one transfer.
    fn build_args(&self, path: &Path, name: &str) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(identity) = &self.config.identity {
            args.extend(["-i".to_string(), identity.to_string_lossy().to_string()]);
        }
        args.extend(self.config.extra_args.iter().cloned());
        args.push(path.to_string_lossy().to_string());
        args.push(join_reference(&self.config.remote, name));
        args
    }
}

#[async_trait]
impl Publisher for ScpPublisher {
    fn name(&self) -> &str {
        "scp"
    }

    async fn publish(&self, path: &Path, name: &str) -> Result<String, PublishError> {
        if !path.exists() {
            return Err(PublishError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let args = self.build_args(path, name);
        debug!("Running {:?} {:?}", self.config.scp_path, args);

        let child = Command::new(&self.config.scp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PublishError::ToolNotFound {
                        path: self.config.scp_path.clone(),
                    }
                } else {
                    PublishError::Io(e)
                }
            })?;

        let output = timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| PublishError::Timeout {
            timeout_secs: self.config.timeout_secs,
        })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PublishError::TransferFailed {
                exit_code: output.status.code(),
                stderr: if stderr.is_empty() { None } else { Some(stderr) },
            });
        }

        Ok(join_reference(&self.config.public_url, name))
    }

    async fn validate(&self) -> Result<(), PublishError> {
        if self.config.remote.is_empty() {
            return Err(PublishError::misconfigured("scp remote is not set"));
        }
        if self.config.public_url.is_empty() {
            return Err(PublishError::misconfigured("scp public_url is not set"));
        }
        if let Some(identity) = &self.config.identity {
            if !identity.exists() {
                return Err(PublishError::misconfigured(format!(
                    "identity file {} does not exist",
                    identity.display()
                )));
            }
        }

        // scp has no --version; running it bare prints usage and exits non-zero
        match Command::new(&self.config.scp_path).output().await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PublishError::ToolNotFound {
                path: self.config.scp_path.clone(),
            }),
            Err(e) => Err(PublishError::Io(e)),
        }
    }
}
