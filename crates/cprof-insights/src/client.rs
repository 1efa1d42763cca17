//! HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use cprof_core::{retry_with_backoff, Insights, NewsItem, ScrapedPage};
use reqwest::Client;

use crate::error::InsightError;
use crate::parse::parse_insights;
use crate::prompt::build_analysis_prompt;
use crate::types::{Content, ErrorEnvelope, GenerateRequest, GenerateResponse, GenerationConfig, Part};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const ANALYSIS_TEMPERATURE: f32 = 0.3;
const CHAT_TEMPERATURE: f32 = 0.7;

/// Client for Google's Gemini API.
///
/// The API key travels in the `x-goog-api-key` header, never in the URL.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GeminiClient {
    /// Creates a client for `model` against the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, InsightError> {
        Self::with_base_url(
            api_key,
            model,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom API root (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cprof/0.1 (company-profiler)")
            .build()?;

        let endpoint = format!(
            "{}/models/{model}:generateContent",
            base_url.trim_end_matches('/')
        );

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Asks the model to analyze a scraped page and its news.
    ///
    /// The model is asked for JSON; whatever it returns is decoded
    /// best-effort by [`parse_insights`], so a successful call may still
    /// yield partially empty insights.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError`] when the API call fails or the model
    /// returns no text.
    pub async fn analyze(
        &self,
        page: &ScrapedPage,
        news: &[NewsItem],
    ) -> Result<Insights, InsightError> {
        let prompt = build_analysis_prompt(page, news);
        let text = self
            .generate(&prompt, ANALYSIS_TEMPERATURE, Some("application/json"))
            .await?;
        let insights = parse_insights(&text);
        tracing::debug!(
            url = %page.url,
            empty = insights.is_empty(),
            competitors = insights.potential_competitors.len(),
            "insights generated"
        );
        Ok(insights)
    }

    /// Free-form text generation, used by the interactive chat.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError`] when the API call fails or the model
    /// returns no text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, InsightError> {
        self.generate(prompt, CHAT_TEMPERATURE, None).await
    }

    async fn generate(
        &self,
        prompt: &str,
        temperature: f32,
        response_mime_type: Option<&'static str>,
    ) -> Result<String, InsightError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type,
            },
        };

        let response = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send(&request)
        })
        .await?;

        response
            .into_text()
            .map_err(|reason| InsightError::EmptyResponse { reason })
    }

    async fn send(&self, request: &GenerateRequest) -> Result<GenerateResponse, InsightError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(InsightError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| InsightError::Deserialize {
            context: "generateContent response".to_string(),
            source: e,
        })
    }
}
