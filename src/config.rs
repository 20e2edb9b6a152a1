use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::century::{ErrorPolicy, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::dataset::{UrlQuery, DEFAULT_TYPE_COLUMN, DEFAULT_URL_COLUMN};
use crate::requester::TransportConfig;

/// Scrape Century 21 Mexico listings named in a CSV export into a JSON file.
#[derive(Debug, Clone, Parser)]
#[command(name = "century_scraper", version)]
pub(crate) struct Config {
    /// First row of the filtered dataset to fetch
    #[arg(long, default_value_t = 0)]
    pub(crate) start: usize,

    /// Row the slice stops before
    #[arg(long, default_value_t = 5)]
    pub(crate) limit: usize,

    /// Property type to keep, e.g. terreno or casa
    #[arg(long, default_value = "terreno")]
    pub(crate) property_type: String,

    /// CSV export holding the listing paths
    #[arg(long, default_value = "urls.csv")]
    pub(crate) csv: PathBuf,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub(crate) base_url: String,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub(crate) user_agent: String,

    /// Requests per URL before giving up
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) max_attempts: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub(crate) timeout_secs: u64,

    /// Proxy URL used for every request
    #[arg(long)]
    pub(crate) proxy: Option<String>,

    /// Directory the export and run report are written to
    #[arg(long, default_value = ".")]
    pub(crate) out_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_TYPE_COLUMN)]
    pub(crate) type_column: String,

    #[arg(long, default_value = DEFAULT_URL_COLUMN)]
    pub(crate) url_column: String,

    /// Record a null entry for a listing that cannot be fetched or decoded
    /// instead of aborting the run
    #[arg(long)]
    pub(crate) continue_on_error: bool,
}

impl Config {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            max_attempts: self.max_attempts,
            timeout: Duration::from_secs(self.timeout_secs),
            proxy: self.proxy.clone(),
        }
    }

    pub(crate) fn query(&self) -> UrlQuery {
        UrlQuery {
            type_column: self.type_column.clone(),
            url_column: self.url_column.clone(),
            ..UrlQuery::new(&self.base_url, &self.property_type, self.start, self.limit)
        }
    }

    pub(crate) fn error_policy(&self) -> ErrorPolicy {
        if self.continue_on_error {
            ErrorPolicy::Skip
        } else {
            ErrorPolicy::Abort
        }
    }
}
