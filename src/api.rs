//! Naver News Search API access.
//!
//! # Architecture
//!
//! - [`SearchApi`]: one paginated search request per call
//! - [`NaverClient`]: the HTTP implementation, configured with an injected
//!   [`ApiConfig`]
//!
//! Requests are never retried. A failed page is reported to the caller as a
//! [`FetchError`] and the caller decides whether the run continues.

use crate::error::FetchError;
use crate::models::{RawItem, SearchCriteria, SearchResponse};
use crate::utils::truncate_for_log;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Path of the news search endpoint relative to the API base URL.
const NEWS_SEARCH_PATH: &str = "v1/search/news.json";

/// Trait for fetching one page of search results.
///
/// An empty `Vec` means no results exist at or after `start`.
pub trait SearchApi {
    /// Fetch the page beginning at the 1-based offset `start`, sized by
    /// `criteria.page_size()`.
    async fn fetch_page(
        &self,
        criteria: &SearchCriteria,
        start: usize,
    ) -> Result<Vec<RawItem>, FetchError>;
}

/// Application credentials sent as `X-Naver-Client-Id` / `X-Naver-Client-Secret`.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Connection settings for [`NaverClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub credentials: Credentials,
}

/// HTTP client for the Naver News Search API.
pub struct NaverClient {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
}

impl fmt::Debug for NaverClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NaverClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl NaverClient {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut base = Url::parse(&config.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(NEWS_SEARCH_PATH)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            credentials: config.credentials.clone(),
        })
    }
}

impl SearchApi for NaverClient {
    #[instrument(level = "info", skip_all, fields(query = %criteria.query(), start = start))]
    async fn fetch_page(
        &self,
        criteria: &SearchCriteria,
        start: usize,
    ) -> Result<Vec<RawItem>, FetchError> {
        let t0 = Instant::now();
        let display = criteria.page_size().to_string();
        let start_param = start.to_string();

        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[
                ("query", criteria.query()),
                ("display", display.as_str()),
                ("start", start_param.as_str()),
                ("sort", criteria.sort().as_param()),
            ])
            .header("X-Naver-Client-Id", &self.credentials.client_id)
            .header("X-Naver-Client-Secret", &self.credentials.client_secret)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = dt.as_millis() as u128,
                body = %truncate_for_log(&body, 300),
                "Search API returned an error status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body).inspect_err(|e| {
            warn!(
                error = %e,
                body = %truncate_for_log(&body, 300),
                "Search API returned non-conforming JSON"
            );
        })?;

        info!(
            count = parsed.items.len(),
            total = ?parsed.total,
            elapsed_ms = dt.as_millis() as u128,
            "Fetched search page"
        );
        debug!(items = ?parsed.items, "Search page items");
        Ok(parsed.items)
    }
}
