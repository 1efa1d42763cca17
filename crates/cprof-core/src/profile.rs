//! Domain types shared by the fetchers, the insight generator, and the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on `latest_news` entries kept on a profile.
pub const MAX_NEWS_ITEMS: usize = 5;

/// Structural and text facts extracted from a company's homepage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// The URL that was fetched.
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_tags: Vec<String>,
    pub h2_tags: Vec<String>,
    /// Absolute link targets in document order, deduplicated.
    pub outbound_links: Vec<String>,
    /// Visible body text, whitespace-collapsed and already truncated.
    pub content: String,
}

impl ScrapedPage {
    /// An empty page for `url`, used when scraping failed outright.
    #[must_use]
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.meta_description.is_none()
            && self.h1_tags.is_empty()
            && self.h2_tags.is_empty()
            && self.outbound_links.is_empty()
            && self.content.is_empty()
    }
}

/// One search hit about the company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    /// As reported by the search API, e.g. `"2 days ago"` or `"Mar 4, 2025"`.
    #[serde(default)]
    pub published_date: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub source_name: String,
}

/// AI-derived analytical fields. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub company_summary: Option<String>,
    pub industry_category: Option<String>,
    pub target_audience: Option<String>,
    #[serde(default)]
    pub key_problems_solved: Vec<String>,
    #[serde(default)]
    pub potential_competitors: Vec<String>,
    pub news_summary: Option<String>,
}

impl Insights {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.company_summary.is_none()
            && self.industry_category.is_none()
            && self.target_audience.is_none()
            && self.key_problems_solved.is_empty()
            && self.potential_competitors.is_empty()
            && self.news_summary.is_none()
    }
}

/// The persisted company profile, keyed by normalized `website_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub website_url: String,
    pub company_name: Option<String>,
    pub page_title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_tags: Vec<String>,
    pub h2_tags: Vec<String>,
    pub outbound_links: Vec<String>,
    pub scraped_content: Option<String>,
    pub latest_news: Vec<NewsItem>,
    pub company_summary: Option<String>,
    pub industry_category: Option<String>,
    pub target_audience: Option<String>,
    pub key_problems_solved: Vec<String>,
    pub potential_competitors: Vec<String>,
    pub news_summary: Option<String>,
    /// Set by the store on insert.
    pub created_at: Option<DateTime<Utc>>,
    /// Set by the store on insert and every update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl CompanyProfile {
    /// A copy with the store-managed timestamps cleared, for comparisons.
    #[must_use]
    pub fn without_timestamps(&self) -> Self {
        Self {
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }

    /// The AI-derived fields of this profile.
    #[must_use]
    pub fn insights(&self) -> Insights {
        Insights {
            company_summary: self.company_summary.clone(),
            industry_category: self.industry_category.clone(),
            target_audience: self.target_audience.clone(),
            key_problems_solved: self.key_problems_solved.clone(),
            potential_competitors: self.potential_competitors.clone(),
            news_summary: self.news_summary.clone(),
        }
    }
}

/// Truncate `text` to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
