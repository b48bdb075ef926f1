use std::path::Path;

use anyhow::Result;

use sheetcut_core::{
    Converter, Fetcher, FfmpegConverter, Publisher, SharedSheet, SheetSource, YtDlpFetcher,
};

use super::{build_source, load};

/// Execute the `check` command: validate the configuration, every external
/// tool and the data source.
pub async fn execute(config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    println!("Configuration:     OK");

    let mut ok = true;

    let fetcher = YtDlpFetcher::new(config.fetcher.clone());
    ok &= report("Fetcher", fetcher.validate().await);

    let converter = FfmpegConverter::new(config.converter.clone());
    ok &= report("Converter", converter.validate().await);

    let publisher = sheetcut_core::build_publisher(&config.publisher);
    ok &= report(
        &format!("Publisher ({})", publisher.name()),
        publisher.validate().await,
    );

    let source = build_source(&config);
    let rows = match source.open().await {
        Ok(sheet) => SharedSheet::new(sheet)
            .read_all_rows()
            .await
            .map(|rows| rows.len()),
        Err(e) => Err(e),
    };
    if let Ok(count) = &rows {
        println!("Sheet rows:        {}", count);
    }
    ok &= report("Data source", rows);

    if ok {
        println!("\nAll checks passed.");
        Ok(())
    } else {
        anyhow::bail!("One or more checks failed")
    }
}

fn report<T, E: std::fmt::Display>(label: &str, result: Result<T, E>) -> bool {
    let label = format!("{}:", label);
    match result {
        Ok(_) => {
            println!("{:18} OK", label);
            true
        }
        Err(e) => {
            println!("{:18} FAILED ({})", label, e);
            false
        }
    }
}
