use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::converter::ConverterConfig;
use crate::dispatch::DispatchConfig;
use crate::fetcher::FetcherConfig;
use crate::processor::ProcessorConfig;
use crate::publisher::PublisherConfig;
use crate::source::ColumnMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data source (required).
    pub source: SourceConfig,

    #[serde(default)]
    pub columns: ColumnMap,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub processor: ProcessorConfig,

    #[serde(default)]
    pub fetcher: FetcherConfig,

    #[serde(default)]
    pub converter: ConverterConfig,

    #[serde(default)]
    pub publisher: PublisherConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// SQLite file and table holding the sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: PathBuf,

    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "sheet".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Textfile-collector output path; metrics are not exported when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textfile: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::PublisherBackend;

    #[test]
    fn test_minimal_config() {
        let toml = r#"
            [source]
            path = "cuts.db"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.source.path, PathBuf::from("cuts.db"));
        assert_eq!(config.source.table, "sheet");
        assert_eq!(config.columns, ColumnMap::default());
        assert_eq!(config.dispatch.max_concurrent_jobs, 8);
        assert_eq!(config.converter.output_extension, "mp3");
        assert_eq!(config.publisher.backend, PublisherBackend::Scp);
        assert!(config.metrics.textfile.is_none());
    }

    #[test]
    fn test_missing_source_fails() {
        let toml = r#"
            [dispatch]
            run_once = true
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}
