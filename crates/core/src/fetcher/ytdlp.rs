//! yt-dlp based fetcher implementation.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::FetcherConfig;
use super::error::FetchError;
use super::traits::Fetcher;

static ERROR_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^ERROR:\s*(.+)$").unwrap());

/// Fetcher that shells out to yt-dlp.
pub struct YtDlpFetcher {
    config: FetcherConfig,
}

impl YtDlpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FetcherConfig::default())
    }

    /// Builds the tool arguments for one download.
    ///
    /// The link comes last, after `--`, so a cell starting with a dash is
    /// never read as an option.
    fn build_args(&self, link: &str, output_prefix: &Path) -> Vec<String> {
        let mut args = self.config.extra_args.clone();
        args.extend([
            "-o".to_string(),
            format!("{}.%(ext)s", output_prefix.to_string_lossy()),
            "--".to_string(),
            link.to_string(),
        ]);
        args
    }

    /// Extracts the user-facing part of the tool's stderr.
    ///
    /// yt-dlp prefixes fatal messages with `ERROR:`; everything else is
    /// progress noise. Falls back to the whole (trimmed) stderr.
    fn diagnostic(stderr: &str) -> String {
        let lines: Vec<&str> = ERROR_LINE
            .captures_iter(stderr)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
            .collect();
        if lines.is_empty() {
            stderr.trim().to_string()
        } else {
            lines.join("\n")
        }
    }

    /// Finds the single `<prefix>.*` file the tool produced.
    async fn find_output(output_prefix: &Path) -> Result<PathBuf, FetchError> {
        let dir = output_prefix
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let stem = output_prefix
            .file_name()
            .map(|n| format!("{}.", n.to_string_lossy()))
            .unwrap_or_default();

        let mut matches = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&stem) && !name.ends_with(".part") {
                matches.push(entry.path());
            }
        }

        match matches.len() {
            0 => Err(FetchError::NoOutput {
                prefix: output_prefix.to_path_buf(),
            }),
            1 => Ok(matches.remove(0)),
            count => Err(FetchError::AmbiguousOutput {
                prefix: output_prefix.to_path_buf(),
                count,
            }),
        }
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, link: &str, output_prefix: &Path) -> Result<PathBuf, FetchError> {
        let args = self.build_args(link, output_prefix);
        debug!("Running {:?} {:?}", self.config.program, args);

        let child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::ToolNotFound {
                        path: self.config.program.clone(),
                    }
                } else {
                    FetchError::Io(e)
                }
            })?;

        let output = timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| FetchError::Timeout {
            timeout_secs: self.config.timeout_secs,
        })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            let exit_code = output.status.code();
            if exit_code.is_some_and(|c| self.config.retrieval_exit_codes.contains(&c)) {
                return Err(FetchError::source_unavailable(Self::diagnostic(&stderr)));
            }
            return Err(FetchError::ToolFailed {
                exit_code,
                stderr: if stderr.is_empty() { None } else { Some(stderr) },
            });
        }

        Self::find_output(output_prefix).await
    }

    async fn validate(&self) -> Result<(), FetchError> {
        let result = Command::new(&self.config.program)
            .arg("--version")
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::ToolNotFound {
                path: self.config.program.clone(),
            }),
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}
