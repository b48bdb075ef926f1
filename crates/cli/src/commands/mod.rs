pub mod check;
pub mod manual;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use sheetcut_core::{
    build_publisher, load_config, validate_config, Config, FfmpegConverter, PipelineProcessor,
    Publisher, SheetSource, SqliteSource, YtDlpFetcher,
};

/// Pipeline wired to the real external tools.
pub type Pipeline = PipelineProcessor<YtDlpFetcher, FfmpegConverter, Box<dyn Publisher>>;

/// Loads and validates the configuration file.
pub fn load(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

pub fn build_source(config: &Config) -> Arc<dyn SheetSource> {
    info!(
        "Using sheet {:?} in {:?}",
        config.source.table, config.source.path
    );
    Arc::new(SqliteSource::new(
        config.source.path.clone(),
        config.source.table.clone(),
    ))
}

pub fn build_pipeline(config: &Config) -> Pipeline {
    let publisher = build_publisher(&config.publisher);
    info!("Publishing with {}", publisher.name());

    PipelineProcessor::new(
        config.processor.clone(),
        config.columns.clone(),
        YtDlpFetcher::new(config.fetcher.clone()),
        FfmpegConverter::new(config.converter.clone()),
        publisher,
    )
    .with_output_extension(config.converter.output_extension.clone())
}
