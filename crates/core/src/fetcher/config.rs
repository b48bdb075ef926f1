//! Configuration for the fetcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp based fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Path to the download tool binary.
    #[serde(default = "default_program")]
    pub program: PathBuf,

    /// Timeout for a single download in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Exit codes meaning "the source could not be retrieved".
    #[serde(default = "default_retrieval_exit_codes")]
    pub retrieval_exit_codes: Vec<i32>,

    /// Additional arguments placed before the link.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_program() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

fn default_retrieval_exit_codes() -> Vec<i32> {
    vec![1]
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout_secs: default_timeout(),
            retrieval_exit_codes: default_retrieval_exit_codes(),
            extra_args: Vec::new(),
        }
    }
}

impl FetcherConfig {
    /// Sets the download tool binary.
    pub fn with_program(mut self, program: PathBuf) -> Self {
        self.program = program;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetcherConfig::default();
        assert_eq!(config.program, PathBuf::from("yt-dlp"));
        assert_eq!(config.timeout_secs, 1800);
        assert_eq!(config.retrieval_exit_codes, vec![1]);
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            program = "youtube-dl"
            extra_args = ["-f", "bestaudio"]
        "#;
        let config: FetcherConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.program, PathBuf::from("youtube-dl"));
        assert_eq!(config.extra_args, vec!["-f", "bestaudio"]);
        assert_eq!(config.timeout_secs, 1800);
    }
}
