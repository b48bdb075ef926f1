use std::path::Path;

use anyhow::{Context, Result};

use sheetcut_core::dispatch::{parse_override, run_manual};
use sheetcut_core::processor::JobOutcome;

use super::{build_pipeline, build_source, load};

/// Execute the `manual` command: process one row now, without touching its
/// state cell.
pub async fn execute(config_path: &Path, row_id: u32, overrides: &[String]) -> Result<()> {
    let config = load(config_path)?;

    let overrides = overrides
        .iter()
        .map(|arg| parse_override(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let source = build_source(&config);
    let pipeline = build_pipeline(&config);

    let outcome = run_manual(source.as_ref(), &pipeline, row_id, &overrides)
        .await
        .with_context(|| format!("Failed to process row {}", row_id))?;

    match outcome {
        JobOutcome::Complete { reference } => {
            println!("{}", reference);
            Ok(())
        }
        JobOutcome::Errored { message, .. } => anyhow::bail!("Row {} failed: {}", row_id, message),
        JobOutcome::Unrecorded { reason } => {
            anyhow::bail!("Row {} ran but its result was not recorded: {}", row_id, reason)
        }
    }
}
