use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use tracing::{info, warn};

use crate::errors::ScrapeError;
use crate::listing_structs::{BatchOutcome, ListingOutcome, PagePayload};
use crate::requester::{FetchedPage, Transport};

pub(crate) const DEFAULT_BASE_URL: &str = "https://century21mexico.com";
pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:136.0) Gecko/20100101 Firefox/136.0";
pub(crate) const JSON_QUERY: &str = "?json=true";

/// What to do when a single listing fails past the transport retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ErrorPolicy {
    /// Stop the run; nothing is exported.
    #[default]
    Abort,
    /// Record a `null` entry and move on to the next URL.
    Skip,
}

/// Header set of a same-origin browser XHR, with the listing as referer.
pub(crate) fn browser_headers(url: &str, user_agent: &str) -> Result<HeaderMap, ScrapeError> {
    let invalid = |reason: String| ScrapeError::Header {
        url: url.to_string(),
        reason,
    };
    let value = |v: &str| HeaderValue::from_str(v).map_err(|e| invalid(e.to_string()));

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(HeaderName::from_static("priority"), HeaderValue::from_static("u=0, i"));
    headers.insert(header::REFERER, value(url)?);
    headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("empty"));
    headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("cors"));
    headers.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("same-origin"));
    headers.insert(HeaderName::from_static("sec-gpc"), HeaderValue::from_static("1"));
    headers.insert(header::TE, HeaderValue::from_static("trailers"));
    headers.insert(header::USER_AGENT, value(user_agent)?);

    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if let Some(host) = parsed.host_str() {
        let host = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        headers.insert(header::HOST, value(&host)?);
    }

    Ok(headers)
}

/// Fetches Century 21 listing payloads through any [`Transport`].
pub(crate) struct CenturyScraper<T> {
    transport: T,
    user_agent: String,
}

impl<T: Transport> CenturyScraper<T> {
    pub(crate) fn new(transport: T, user_agent: &str) -> Self {
        CenturyScraper {
            transport,
            user_agent: user_agent.to_string(),
        }
    }

    /// Probes the listing page, then reads its JSON.
    ///
    /// On a 200 probe the whole `?json=true` document is returned. Otherwise
    /// the listing URL itself is fetched again and only its `results` field is
    /// kept. The two shapes are distinguished by [`PagePayload`].
    pub(crate) async fn fetch_listing(&self, url: &str) -> Result<ListingOutcome, ScrapeError> {
        let headers = browser_headers(url, &self.user_agent)?;

        match self.transport.fetch(url, &headers).await {
            Ok(probe) if probe.status == StatusCode::OK => {
                let page = self.transport.fetch(&format!("{url}{JSON_QUERY}"), &headers).await?;
                let document = decode(&page)?;
                info!("{}", url);
                return Ok(ListingOutcome {
                    url: url.to_string(),
                    probe_ok: true,
                    payload: PagePayload::Document(document),
                });
            }
            Ok(probe) => warn!("Probe of {} returned {}", url, probe.status),
            Err(e) => warn!("Probe failed: {}", e),
        }

        let page = self.transport.fetch(url, &headers).await?;
        Ok(ListingOutcome {
            url: url.to_string(),
            probe_ok: false,
            payload: PagePayload::results_of(decode(&page)?),
        })
    }

    /// Fetches every URL in order, one at a time.
    pub(crate) async fn fetch_all(
        &self,
        urls: &[String],
        policy: ErrorPolicy,
    ) -> Result<BatchOutcome, ScrapeError> {
        let mut batch = BatchOutcome::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            match self.fetch_listing(url).await {
                Ok(outcome) => batch.record(outcome),
                Err(e) if policy == ErrorPolicy::Skip => batch.record_failure(url, &e),
                Err(e) => {
                    warn!("Aborting batch at entry {} of {}", i + 1, urls.len());
                    return Err(e);
                }
            }
        }

        info!(
            "Fetched {} listings ({} invalid, {} failed)",
            batch.results.len(),
            batch.invalid_urls.len(),
            batch.failed.len()
        );
        Ok(batch)
    }
}

fn decode(page: &FetchedPage) -> Result<serde_json::Value, ScrapeError> {
    page.json().map_err(|source| ScrapeError::Decode {
        url: page.url.clone(),
        source,
    })
}
