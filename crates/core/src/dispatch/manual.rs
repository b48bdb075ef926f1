//! One-off processing of a single row.

use tracing::info;

use crate::converter::Converter;
use crate::fetcher::Fetcher;
use crate::processor::{JobOutcome, PipelineProcessor};
use crate::publisher::Publisher;
use crate::source::{RowId, SharedSheet, SheetSource};

use super::types::DispatchError;

/// Parses a `field=value` override. Only the first `=` splits.
pub fn parse_override(arg: &str) -> Result<(String, String), DispatchError> {
    match arg.split_once('=') {
        Some((field, value)) => Ok((field.to_string(), value.to_string())),
        None => Err(DispatchError::MalformedOverride(arg.to_string())),
    }
}

/// Runs the pipeline for row `row_id` with some cells replaced.
///
/// The row is processed regardless of its ready and state cells, and the
/// state column is never written. Every override must name a cell the row
/// already has.
pub async fn run_manual<F, C, P>(
    source: &dyn SheetSource,
    processor: &PipelineProcessor<F, C, P>,
    row_id: RowId,
    overrides: &[(String, String)],
) -> Result<JobOutcome, DispatchError>
where
    F: Fetcher,
    C: Converter,
    P: Publisher,
{
    let sheet = SharedSheet::new(source.open().await?);
    let mut row = sheet
        .read_all_rows()
        .await?
        .into_iter()
        .find(|row| row.id == row_id)
        .ok_or(DispatchError::UnknownRow(row_id))?;

    for (field, value) in overrides {
        if !row.set(field, value.as_str()) {
            return Err(DispatchError::BadOverride(field.clone()));
        }
    }

    info!("Manually processing row {}", row_id);
    Ok(processor.process(&sheet, row, true).await)
}
