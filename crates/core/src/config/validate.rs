use std::collections::HashSet;

use super::{types::Config, ConfigError};
use crate::publisher::PublisherBackend;

/// Validate configuration
/// Currently validates:
/// - Source path and table are set
/// - Column names are non-empty and distinct (claim column included)
/// - Concurrency and backoff bounds are usable
/// - The selected publisher backend has its destination set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.source.path.as_os_str().is_empty() {
        return invalid("source.path cannot be empty");
    }
    if config.source.table.is_empty() {
        return invalid("source.table cannot be empty");
    }

    // Columns
    let mut seen = HashSet::new();
    let claim_column = config.dispatch.claim_column.as_deref();
    for column in config.columns.all().into_iter().chain(claim_column) {
        if column.is_empty() {
            return invalid("column names cannot be empty");
        }
        if !seen.insert(column) {
            return invalid(&format!("column {:?} is used twice", column));
        }
    }
    if config.columns.ready_value.is_empty() {
        return invalid("columns.ready_value cannot be empty");
    }

    // Dispatch
    let dispatch = &config.dispatch;
    if dispatch.max_concurrent_jobs == 0 {
        return invalid("dispatch.max_concurrent_jobs cannot be 0");
    }
    if dispatch.backoff_max_secs == 0 {
        return invalid("dispatch.backoff_max_secs cannot be 0");
    }
    if dispatch.backoff_base_secs > dispatch.backoff_max_secs {
        return invalid("dispatch.backoff_base_secs cannot exceed dispatch.backoff_max_secs");
    }
    if dispatch.claim_column.is_some() && dispatch.worker_id.is_empty() {
        return invalid("dispatch.worker_id cannot be empty when claim_column is set");
    }

    // Converter
    if config.converter.output_extension.trim_start_matches('.').is_empty() {
        return invalid("converter.output_extension cannot be empty");
    }

    // Publisher
    match config.publisher.backend {
        PublisherBackend::Scp => {
            if config.publisher.scp.remote.is_empty() {
                return invalid("publisher.scp.remote cannot be empty");
            }
            if config.publisher.scp.public_url.is_empty() {
                return invalid("publisher.scp.public_url cannot be empty");
            }
        }
        PublisherBackend::Directory => {
            if config.publisher.directory.path.as_os_str().is_empty() {
                return invalid("publisher.directory.path cannot be empty");
            }
        }
    }

    Ok(())
}

fn invalid(message: &str) -> Result<(), ConfigError> {
    Err(ConfigError::ValidationError(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid() -> Config {
        load_config_from_str(
            r#"
[source]
path = "cuts.db"

[publisher.scp]
remote = "host:public_html/cuts"
public_url = "http://example.com/cuts"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_validate_zero_jobs_fails() {
        let mut config = valid();
        config.dispatch.max_concurrent_jobs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_backoff_bounds() {
        let mut config = valid();
        config.dispatch.backoff_base_secs = 120;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_duplicate_columns() {
        let mut config = valid();
        config.columns.error = config.columns.state.clone();
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.dispatch.claim_column = Some(config.columns.state.clone());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_publisher_destination() {
        let mut config = valid();
        config.publisher.scp.remote.clear();
        assert!(validate_config(&config).is_err());

        config.publisher.backend = PublisherBackend::Directory;
        assert!(validate_config(&config).is_err());

        config.publisher.directory.path = "/srv/www/cuts".into();
        assert!(validate_config(&config).is_ok());
    }
}
