pub mod config;
pub mod converter;
pub mod dispatch;
pub mod fetcher;
pub mod metrics;
pub mod processor;
pub mod publisher;
pub mod source;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, MetricsConfig,
    SourceConfig,
};
pub use converter::{Converter, ConverterConfig, ConverterError, FfmpegConverter};
pub use dispatch::{
    DispatchConfig, DispatchError, Dispatcher, JobRunner, RestartPolicy, RunSummary, WorkerPool,
};
pub use fetcher::{FetchError, Fetcher, FetcherConfig, YtDlpFetcher};
pub use processor::{JobError, JobOutcome, PipelineProcessor, ProcessorConfig};
pub use publisher::{build_publisher, PublishError, Publisher, PublisherConfig};
pub use source::{
    ColumnMap, Row, RowId, RowState, SharedSheet, Sheet, SheetSource, SourceError, SqliteSource,
};
