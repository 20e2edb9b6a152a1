use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// What a listing fetch produced.
///
/// A successful probe yields the whole `?json=true` document, the fallback
/// path only the `results` field of the page. Both serialize untagged, so an
/// export holds either the document or the bare `results` value (`null` when
/// the key was missing).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum PagePayload {
    Document(Value),
    Results(Option<Value>),
}

impl PagePayload {
    /// Pulls `results` out of a decoded page, absent for non-objects too.
    pub(crate) fn results_of(mut page: Value) -> Self {
        PagePayload::Results(page.get_mut("results").map(Value::take))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ListingOutcome {
    pub(crate) url: String,
    /// Whether the probe request against the HTML page returned 200.
    pub(crate) probe_ok: bool,
    pub(crate) payload: PagePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct FailedListing {
    pub(crate) url: String,
    pub(crate) error: String,
}

/// Everything a batch run accumulates, in input order.
#[derive(Debug, Default)]
pub(crate) struct BatchOutcome {
    /// One entry per input URL; `None` only for skipped failures.
    pub(crate) results: Vec<Option<PagePayload>>,
    /// URLs whose probe request did not return 200.
    pub(crate) invalid_urls: Vec<String>,
    pub(crate) failed: Vec<FailedListing>,
}

impl BatchOutcome {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        BatchOutcome {
            results: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, outcome: ListingOutcome) {
        if !outcome.probe_ok {
            warn!("Invalid URL: {}", outcome.url);
            self.invalid_urls.push(outcome.url);
        }
        self.results.push(Some(outcome.payload));
    }

    /// Keeps a placeholder so results stay aligned with the URL list.
    pub(crate) fn record_failure(&mut self, url: &str, error: &impl std::fmt::Display) {
        warn!("Skipping {}: {}", url, error);
        self.failed.push(FailedListing {
            url: url.to_string(),
            error: error.to_string(),
        });
        self.results.push(None);
    }

    pub(crate) fn has_problems(&self) -> bool {
        !self.invalid_urls.is_empty() || !self.failed.is_empty()
    }
}
