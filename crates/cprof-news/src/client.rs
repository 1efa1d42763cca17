//! HTTP client for `SerpAPI`'s Google News search.

use std::time::Duration;

use cprof_core::{is_transient_status, retry_with_backoff, NewsItem, MAX_NEWS_ITEMS};
use reqwest::{Client, Url};

use crate::error::NewsError;
use crate::types::SearchResponse;

const DEFAULT_BASE_URL: &str = "https://serpapi.com/search.json";

/// Client for `SerpAPI`.
///
/// Use [`SerpApiClient::new`] for production or
/// [`SerpApiClient::with_base_url`] to point at a mock server in tests.
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SerpApiClient {
    /// Creates a new client pointed at the production `SerpAPI` endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, NewsError> {
        Self::with_base_url(
            api_key,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a new client with a custom endpoint URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NewsError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, NewsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cprof/0.1 (company-profiler)")
            .build()?;

        let base_url = Url::parse(base_url)
            .map_err(|e| NewsError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Searches recent news about `company`.
    ///
    /// Sends `"<company> latest news"` to the Google engine with `tbm=nws`
    /// and returns at most five items, in the order `SerpAPI` ranked them.
    /// Falls back to organic results when the news block is absent.
    ///
    /// # Errors
    ///
    /// - [`NewsError::Api`] if the response carries an `"error"` field.
    /// - [`NewsError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`NewsError::Http`] on network failure after retries.
    /// - [`NewsError::Deserialize`] if the body is not the expected JSON shape.
    pub async fn search_news(&self, company: &str) -> Result<Vec<NewsItem>, NewsError> {
        let query = format!("{company} latest news");
        let url = self.build_url(&query);

        let response = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request(&url, &query)
        })
        .await?;

        let items = response.into_news_items(MAX_NEWS_ITEMS);
        tracing::debug!(company, count = items.len(), "news fetched");
        Ok(items)
    }

    fn build_url(&self, query: &str) -> Url {
        let num = MAX_NEWS_ITEMS.to_string();
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("engine", "google")
            .append_pair("q", query)
            .append_pair("tbm", "nws")
            .append_pair("num", &num)
            .append_pair("hl", "en")
            .append_pair("gl", "us")
            .append_pair("api_key", &self.api_key);
        url
    }

    async fn request(&self, url: &Url, query: &str) -> Result<SearchResponse, NewsError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| NewsError::Http(e.without_url()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NewsError::Http(e.without_url()))?;

        decode_response(status.as_u16(), &body, query)
    }
}

/// Map a `SerpAPI` status and body to a typed response.
///
/// An `"error"` field wins over the payload. On a non-2xx status it becomes
/// [`NewsError::Api`] unless the status is retryable.
fn decode_response(status: u16, body: &str, query: &str) -> Result<SearchResponse, NewsError> {
    let parsed = serde_json::from_str::<SearchResponse>(body);

    if !(200..300).contains(&status) {
        let api_error = parsed.ok().and_then(|r| r.error);
        return match api_error {
            Some(msg) if !is_transient_status(status) => Err(NewsError::Api(msg)),
            _ => Err(NewsError::UnexpectedStatus { status }),
        };
    }

    let mut response = parsed.map_err(|e| NewsError::Deserialize {
        context: format!("search({query})"),
        source: e,
    })?;
    if let Some(msg) = response.error.take() {
        return Err(NewsError::Api(msg));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> SerpApiClient {
        SerpApiClient::with_base_url("test-key", 15, 0, 0, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_sets_news_search_params() {
        let client = test_client("https://serpapi.com/search.json");
        let url = client.build_url("Acme latest news");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("engine".into(), "google".into())));
        assert!(pairs.contains(&("q".into(), "Acme latest news".into())));
        assert!(pairs.contains(&("tbm".into(), "nws".into())));
        assert!(pairs.contains(&("num".into(), "5".into())));
        assert!(pairs.contains(&("api_key".into(), "test-key".into())));
        assert_eq!(url.path(), "/search.json");
    }

    #[test]
    fn with_base_url_rejects_garbage() {
        let result = SerpApiClient::with_base_url("k", 15, 0, 0, "not a url");
        assert!(matches!(result, Err(NewsError::Api(_))));
    }

    #[test]
    fn decode_reads_error_field_from_ok_body() {
        let result = decode_response(200, r#"{"error":"Your account has run out of searches."}"#, "q");
        assert!(matches!(result, Err(NewsError::Api(ref msg)) if msg.contains("run out")));
    }

    #[test]
    fn decode_maps_error_body_on_client_error_to_api() {
        let result = decode_response(401, r#"{"error":"Invalid API key."}"#, "q");
        assert!(matches!(result, Err(NewsError::Api(ref msg)) if msg == "Invalid API key."));
    }

    #[test]
    fn decode_keeps_retryable_status_even_with_error_body() {
        let result = decode_response(503, r#"{"error":"busy"}"#, "q");
        assert!(matches!(result, Err(NewsError::UnexpectedStatus { status: 503 })));
    }

    #[test]
    fn decode_returns_results_without_error() {
        let response = decode_response(200, r#"{"news_results":[{"title":"Acme"}]}"#, "q")
            .expect("expected a response");
        assert!(response.error.is_none());
        assert_eq!(response.into_news_items(5)[0].title, "Acme");
    }
}
