use http::StatusCode;
use polars::prelude::PolarsError;

/// Every attempt for `url` either errored or came back non-200.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no 200 response from {url} after {attempts} attempt(s){}", .last_status.map(|s| format!(", last status {s}")).unwrap_or_default())]
pub(crate) struct FetchFailed {
    pub(crate) url: String,
    pub(crate) attempts: u32,
    pub(crate) last_status: Option<StatusCode>,
}

/// Errors that abort a single listing fetch.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchFailed),

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot build request headers for {url}: {reason}")]
    Header { url: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum DatasetError {
    #[error("CSV error: {0}")]
    Polars(#[from] PolarsError),

    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
