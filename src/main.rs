use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use crate::config::Config;
use crate::requester::HttpRequester;

mod century;
mod config;
mod dataset;
mod errors;
mod export;
mod listing_structs;
mod pipeline;
mod requester;

#[tokio::main]
async fn main() -> Result<()> {
    // install global collector, INFO unless RUST_LOG says otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();

    let config = Config::parse();
    info!(
        "Scraping '{}' rows [{}, {}) of {}",
        config.property_type,
        config.start,
        config.limit,
        config.csv.display()
    );

    let requester = HttpRequester::new(&config.transport()).context("Failed to build HTTP client")?;
    let summary = pipeline::run(&config, requester).await?;

    info!(
        "Done: {} entries written to {}",
        summary.entries,
        summary.export_path.display()
    );
    if let Some(report) = summary.report_path {
        info!("{} invalid URLs, see {}", summary.invalid, report.display());
    }
    Ok(())
}
