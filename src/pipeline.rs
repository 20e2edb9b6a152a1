use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::century::CenturyScraper;
use crate::config::Config;
use crate::dataset::build_url_list;
use crate::export::{export_report, export_results};
use crate::requester::Transport;

#[derive(Debug)]
pub(crate) struct RunSummary {
    pub(crate) export_path: PathBuf,
    pub(crate) report_path: Option<PathBuf>,
    pub(crate) entries: usize,
    pub(crate) invalid: usize,
}

/// CSV slice -> sequential fetches -> JSON export.
pub(crate) async fn run<T: Transport>(config: &Config, transport: T) -> Result<RunSummary> {
    let urls = build_url_list(&config.csv, &config.query())
        .with_context(|| format!("Failed to build URL list from {}", config.csv.display()))?;

    let scraper = CenturyScraper::new(transport, &config.user_agent);
    let batch = scraper
        .fetch_all(&urls, config.error_policy())
        .await
        .context("Batch aborted")?;

    let export_path = export_results(
        &batch.results,
        &config.out_dir,
        &config.property_type,
        config.start,
        config.limit,
    )
    .context("Failed to export results")?;
    info!("Data exported to JSON file: {}", export_path.display());

    let report_path = export_report(
        &batch,
        &config.out_dir,
        &config.property_type,
        config.start,
        config.limit,
    )
    .context("Failed to write run report")?;

    Ok(RunSummary {
        export_path,
        report_path,
        entries: batch.results.len(),
        invalid: batch.invalid_urls.len(),
    })
}
