//! Configuration for the publisher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which publisher backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherBackend {
    #[default]
    Scp,
    Directory,
}

/// Publisher configuration; only the sub-table of the selected backend is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default)]
    pub backend: PublisherBackend,

    #[serde(default)]
    pub scp: ScpConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Configuration for the scp publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScpConfig {
    /// Path to the scp binary.
    #[serde(default = "default_scp_path")]
    pub scp_path: PathBuf,

    /// Identity file passed with `-i`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<PathBuf>,

    /// Remote destination directory, e.g. `host:public_html/cuts`.
    #[serde(default)]
    pub remote: String,

    /// Public URL prefix of `remote`.
    #[serde(default)]
    pub public_url: String,

    /// Timeout for a single transfer in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Additional arguments placed before the source file.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_scp_path() -> PathBuf {
    PathBuf::from("scp")
}

fn default_timeout() -> u64 {
    600 // 10 minutes
}

impl Default for ScpConfig {
    fn default() -> Self {
        Self {
            scp_path: default_scp_path(),
            identity: None,
            remote: String::new(),
            public_url: String::new(),
            timeout_secs: default_timeout(),
            extra_args: Vec::new(),
        }
    }
}

impl ScpConfig {
    /// Creates a config for a remote directory and its public URL.
    pub fn new(remote: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            public_url: public_url.into(),
            ..Default::default()
        }
    }

    /// Sets the identity file.
    pub fn with_identity(mut self, identity: PathBuf) -> Self {
        self.identity = Some(identity);
        self
    }
}

/// Configuration for the directory publisher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory receiving published files.
    #[serde(default)]
    pub path: PathBuf,

    /// Public URL prefix of `path`; the file path itself is returned when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

impl DirectoryConfig {
    /// Creates a config for the given directory.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            public_url: None,
        }
    }

    /// Sets the public URL prefix.
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(url.into());
        self
    }
}
