use std::time::Duration;

use cprof_core::{parse_website_url, retry_with_backoff, ScrapedPage};
use reqwest::Client;

use crate::error::ScraperError;
use crate::parse::parse_page;

/// HTTP client that downloads a company homepage and extracts its structure.
///
/// Sends a browser-like `User-Agent`, follows redirects, and retries network
/// failures, HTTP 429 and 5xx responses up to `max_retries` additional times.
pub struct SiteClient {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SiteClient {
    /// Creates a `SiteClient` with the given request timeout, `User-Agent`,
    /// and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches `url` and extracts title, meta description, headings, links,
    /// and visible text.
    ///
    /// Relative links resolve against the final URL after redirects.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` is not an absolute `http(s)` URL.
    /// - [`ScraperError::RateLimited`]: HTTP 429 after retries.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network, TLS or timeout failure after retries.
    pub async fn fetch_page(
        &self,
        url: &str,
        content_char_limit: usize,
        max_links: usize,
    ) -> Result<ScrapedPage, ScraperError> {
        let target = parse_website_url(url)?;

        let (body, final_url) = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let target = target.clone();
            async move {
                let response = self.client.get(target.clone()).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(ScraperError::RateLimited {
                        url: target.to_string(),
                    });
                }
                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: target.to_string(),
                    });
                }

                let final_url = response.url().clone();
                let body = response.text().await?;
                Ok((body, final_url))
            }
        })
        .await?;

        let page = parse_page(&body, url, &final_url, content_char_limit, max_links);
        tracing::debug!(
            url,
            title = page.title.as_deref().unwrap_or_default(),
            h1 = page.h1_tags.len(),
            links = page.outbound_links.len(),
            content_chars = page.content.chars().count(),
            "homepage scraped"
        );
        Ok(page)
    }
}
