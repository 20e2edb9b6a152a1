use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::FetchFailed;

pub(crate) const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A response that came back with a success status.
#[derive(Debug, Clone)]
pub(crate) struct FetchedPage {
    pub(crate) url: String,
    pub(crate) status: StatusCode,
    pub(crate) body: String,
}

impl FetchedPage {
    pub(crate) fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TransportConfig {
    pub(crate) max_attempts: u32,
    /// Applied to each request, not to the whole retry loop.
    pub(crate) timeout: Duration,
    pub(crate) proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
        }
    }
}

/// Retrying GET capability the page fetcher is built on.
#[async_trait]
pub(crate) trait Transport: Send + Sync {
    /// Returns the first 200 response, or `FetchFailed` once the attempt
    /// budget is spent. Never surfaces network errors directly.
    ///
    /// `last_status` on failure describes the final attempt only.
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<FetchedPage, FetchFailed>;
}

/// Transport over a single shared reqwest session.
#[derive(Debug, Clone)]
pub(crate) struct HttpRequester {
    client: reqwest::Client,
    max_attempts: u32,
}

impl HttpRequester {
    pub(crate) fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(HttpRequester {
            client: builder.build()?,
            max_attempts: config.max_attempts,
        })
    }
}

#[async_trait]
impl Transport for HttpRequester {
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<FetchedPage, FetchFailed> {
        let headers = to_reqwest_headers(headers);
        let mut last_status = None;

        // Immediate retry, no backoff
        for attempt in 1..=self.max_attempts {
            match self.client.get(url).headers(headers.clone()).send().await {
                Ok(response) if response.status() == reqwest::StatusCode::OK => {
                    match response.text().await {
                        Ok(body) => {
                            return Ok(FetchedPage {
                                url: url.to_string(),
                                status: StatusCode::OK,
                                body,
                            })
                        }
                        Err(e) => {
                            warn!("{url} (attempt {attempt}/{}): {e}", self.max_attempts);
                            last_status = None;
                        }
                    }
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    debug!("{url} (attempt {attempt}/{}): status {status}", self.max_attempts);
                    last_status = StatusCode::from_u16(status).ok();
                }
                Err(e) => {
                    warn!("{url} (attempt {attempt}/{}): {e}", self.max_attempts);
                    last_status = None;
                }
            }
        }

        Err(FetchFailed {
            url: url.to_string(),
            attempts: self.max_attempts,
            last_status,
        })
    }
}

/// reqwest 0.11 sits on `http` 0.2, so header maps are rebuilt byte for byte.
fn to_reqwest_headers(headers: &HeaderMap) -> reqwest::header::HeaderMap {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let name = reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes()).ok()?;
            let value = reqwest::header::HeaderValue::from_bytes(value.as_bytes()).ok()?;
            Some((name, value))
        })
        .collect()
}
