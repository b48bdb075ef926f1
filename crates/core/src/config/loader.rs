use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides; nested keys are separated by `__`,
/// e.g. `SHEETCUT_DISPATCH__MAX_CONCURRENT_JOBS=4`.
pub const ENV_PREFIX: &str = "SHEETCUT_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[source]
path = "/var/lib/sheetcut/cuts.db"
table = "rdp"

[dispatch]
max_concurrent_jobs = 4
restart_in_progress = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.source.table, "rdp");
        assert_eq!(config.dispatch.max_concurrent_jobs, 4);
        assert!(config.dispatch.restart_in_progress);
    }

    #[test]
    fn test_load_config_from_str_missing_source() {
        let toml = r#"
[dispatch]
max_concurrent_jobs = 4
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/sheetcut.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[source]
path = "cuts.db"

[columns]
ready_value = "Yes"

[publisher]
backend = "directory"

[publisher.directory]
path = "/srv/www/cuts"
public_url = "https://example.com/cuts"

[metrics]
textfile = "/var/lib/node_exporter/sheetcut.prom"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.columns.ready_value, "Yes");
        assert_eq!(config.publisher.directory.path, PathBuf::from("/srv/www/cuts"));
        assert_eq!(
            config.metrics.textfile,
            Some(PathBuf::from("/var/lib/node_exporter/sheetcut.prom"))
        );
    }
}
