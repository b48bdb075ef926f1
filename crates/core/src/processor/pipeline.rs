//! Pipeline processor implementation.

use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::converter::{ConversionJob, Converter};
use crate::fetcher::Fetcher;
use crate::metrics;
use crate::publisher::Publisher;
use crate::source::{ColumnMap, Row, RowId, RowState, SharedSheet, SourceError};

use super::config::ProcessorConfig;
use super::error::{JobError, JobErrorKind};
use super::types::{CutRequest, JobOutcome};
use super::workspace::JobWorkspace;

/// Runs one row through Acquire → Transform → Publish → Record.
///
/// `process` never fails: step errors are classified and written to the
/// row, and a failure to write the outcome is logged and reported as
/// [`JobOutcome::Unrecorded`].
pub struct PipelineProcessor<F: Fetcher, C: Converter, P: Publisher> {
    config: ProcessorConfig,
    columns: ColumnMap,
    output_extension: String,
    fetcher: F,
    converter: C,
    publisher: P,
}

impl<F: Fetcher, C: Converter, P: Publisher> PipelineProcessor<F, C, P> {
    /// Creates a new pipeline processor.
    pub fn new(
        config: ProcessorConfig,
        columns: ColumnMap,
        fetcher: F,
        converter: C,
        publisher: P,
    ) -> Self {
        Self {
            config,
            columns,
            output_extension: "mp3".to_string(),
            fetcher,
            converter,
            publisher,
        }
    }

    /// Sets the extension of produced files (and so the output format).
    pub fn with_output_extension(mut self, extension: impl Into<String>) -> Self {
        self.output_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Column names used for reads and writes.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Validates every collaborator.
    pub async fn validate(&self) -> Result<(), JobError> {
        self.fetcher.validate().await?;
        self.converter.validate().await?;
        self.publisher.validate().await?;
        Ok(())
    }

    /// Processes one claimed row and records the outcome on it.
    ///
    /// With `no_update_state` the state column is left alone; the result
    /// link and error columns are still written.
    pub async fn process(&self, sheet: &SharedSheet, row: Row, no_update_state: bool) -> JobOutcome {
        let span = info_span!("job", row_id = row.id);
        self.process_row(sheet, row, no_update_state)
            .instrument(span)
            .await
    }

    async fn process_row(&self, sheet: &SharedSheet, row: Row, no_update_state: bool) -> JobOutcome {
        let start = Instant::now();
        info!(
            "Processing row {} ({:?})",
            row.id,
            row.get(&self.columns.title)
        );
        debug!("Row values: {:?}", row.fields);

        let outcome = match self.run_steps(&row).await {
            Ok(reference) => {
                info!("Processed row {} successfully: {}", row.id, reference);
                match self
                    .record_success(sheet, row.id, &reference, no_update_state)
                    .await
                {
                    Ok(()) => JobOutcome::Complete { reference },
                    Err(e) => self.unrecorded(row.id, e),
                }
            }
            Err(e) => {
                match e.kind() {
                    JobErrorKind::Retrieval => warn!("Row {} could not be downloaded: {}", row.id, e),
                    JobErrorKind::Internal => error!("Error while processing row {}: {}", row.id, e),
                }
                let message = e.row_message();
                match self
                    .record_failure(sheet, row.id, &message, no_update_state)
                    .await
                {
                    Ok(()) => JobOutcome::errored(e.kind(), message),
                    Err(e) => self.unrecorded(row.id, e),
                }
            }
        };

        metrics::JOBS_FINISHED
            .with_label_values(&[outcome.label()])
            .inc();
        metrics::JOB_DURATION.observe(start.elapsed().as_secs_f64());

        outcome
    }

    /// Acquire, Transform and Publish. The workspace directory is removed
    /// before this returns, whether the steps succeeded or not; a cancelled or
    /// panicking job leaves it to the workspace's drop.
    async fn run_steps(&self, row: &Row) -> Result<String, JobError> {
        let request = CutRequest::from_row(row, &self.columns)?;

        let workspace = JobWorkspace::create(&self.config.temp_dir)
            .await
            .map_err(JobError::Workspace)?;
        debug!("Using workspace {:?}", workspace.path());

        let result = self.run_in_workspace(request, &workspace).await;
        workspace.remove().await;
        result
    }

    async fn run_in_workspace(
        &self,
        request: CutRequest,
        workspace: &JobWorkspace,
    ) -> Result<String, JobError> {
        debug!("Downloading {}", request.link);
        let source = self
            .fetcher
            .fetch(&request.link, &workspace.file("source"))
            .await?;

        let output = workspace.file(&format!("cut.{}", self.output_extension));
        debug!("Converting {:?} -> {:?}", source, output);
        let result = self
            .converter
            .convert(ConversionJob {
                job_id: format!("row-{}", request.row_id),
                input_path: source,
                output_path: output,
                params: request.params,
                metadata: request.metadata.clone(),
            })
            .await?;
        debug!(
            "Converted {} bytes in {} ms",
            result.output_size_bytes, result.duration_ms
        );

        let name = request.publish_name(&self.output_extension);
        debug!("Publishing {:?} as {}", result.output_path, name);
        let reference = self.publisher.publish(&result.output_path, &name).await?;

        Ok(reference)
    }

    async fn record_success(
        &self,
        sheet: &SharedSheet,
        row_id: RowId,
        reference: &str,
        no_update_state: bool,
    ) -> Result<(), SourceError> {
        sheet
            .write_cell(row_id, &self.columns.result_link, reference)
            .await?;
        if !no_update_state {
            sheet
                .write_state(&self.columns, row_id, RowState::Complete)
                .await?;
        }
        Ok(())
    }

    async fn record_failure(
        &self,
        sheet: &SharedSheet,
        row_id: RowId,
        message: &str,
        no_update_state: bool,
    ) -> Result<(), SourceError> {
        sheet
            .write_cell(row_id, &self.columns.error, message)
            .await?;
        if !no_update_state {
            sheet
                .write_state(&self.columns, row_id, RowState::Errored)
                .await?;
        }
        Ok(())
    }

    fn unrecorded(&self, row_id: RowId, e: SourceError) -> JobOutcome {
        error!("Failed to record outcome of row {}: {}", row_id, e);
        JobOutcome::Unrecorded {
            reason: e.to_string(),
        }
    }
}

