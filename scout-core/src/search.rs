//! Web-search collaborator: ordered organic results for a query.
//!
//! The pipeline only needs one operation from the search provider, expressed
//! by the [`SearchProvider`] trait so the collector can be driven by a stub
//! in tests. The production implementation is a SerpAPI client.

use crate::error::SearchError;
use crate::options::SearchFilters;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One organic (non-paid) search hit. Consumed immediately by the collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// A provider of ordered organic search results.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search. An empty Vec is a valid, non-error "no sources" outcome.
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SearchResult>, SearchError>;
}

/// The default SerpAPI endpoint.
const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// SerpAPI-backed search client.
pub struct SerpApiClient {
    client: reqwest::Client,
    base_url: String,
    engine: String,
    api_key: String,
}

impl SerpApiClient {
    /// Create a new client for the given engine selector and API key.
    pub fn new(
        engine: impl Into<String>,
        api_key: impl Into<String>,
        base_url: Option<String>,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SearchError::ApiRequest {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            engine: engine.into(),
            api_key: api_key.into(),
        })
    }

    /// Pull `{title, link, snippet}` records out of the provider payload.
    ///
    /// A missing `organic_results` key or an empty array is not an error.
    fn parse_organic_results(body: &serde_json::Value) -> Vec<SearchResult> {
        let Some(results) = body.get("organic_results").and_then(|v| v.as_array()) else {
            return Vec::new();
        };

        results
            .iter()
            .map(|r| SearchResult {
                title: r
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or("N/A")
                    .to_string(),
                link: r
                    .get("link")
                    .and_then(|v| v.as_str())
                    .unwrap_or("N/A")
                    .to_string(),
                snippet: r
                    .get("snippet")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("{}/search.json", self.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("engine", self.engine.clone()),
            ("api_key", self.api_key.clone()),
            ("gl", filters.region.code().to_string()),
            ("hl", filters.language.code().to_string()),
        ];
        if let Some(code) = filters.time.recency_code() {
            params.push(("tbs", format!("qdr:{code}")));
        }

        debug!(query, region = filters.region.code(), "Sending search request");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::ApiRequest {
                message: format!("Search request failed: {e}"),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SearchError::AuthFailed);
        }
        if !status.is_success() {
            return Err(SearchError::ApiRequest {
                message: format!("HTTP {status} from search provider"),
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| SearchError::ResponseParse {
                    message: format!("Failed to parse search response: {e}"),
                })?;

        let results = Self::parse_organic_results(&body);
        debug!(count = results.len(), "Search returned organic results");
        Ok(results)
    }
}
