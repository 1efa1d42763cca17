//! Wire types for the `SerpAPI` `search.json` response.
//!
//! Only the fields the profiler reads are modelled; everything is optional
//! because `SerpAPI` omits keys freely.

use cprof_core::NewsItem;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub news_results: Option<Vec<NewsResult>>,
    #[serde(default)]
    pub organic_results: Option<Vec<OrganicResult>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `source` is `{"name": "..."}` on the news engine and a bare string on
/// some older responses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ResultSource {
    Named { name: String },
    Plain(String),
}

impl ResultSource {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named { name } | Self::Plain(name) => name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub source: Option<ResultSource>,
}

#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub displayed_link: String,
}

impl From<NewsResult> for NewsItem {
    fn from(r: NewsResult) -> Self {
        Self {
            title: r.title,
            link: r.link,
            published_date: r.date,
            snippet: r.snippet,
            source_name: r.source.map(|s| s.name().to_string()).unwrap_or_default(),
        }
    }
}

impl From<OrganicResult> for NewsItem {
    fn from(r: OrganicResult) -> Self {
        Self {
            title: r.title,
            link: r.link,
            published_date: r.date,
            snippet: r.snippet,
            source_name: r.displayed_link,
        }
    }
}

impl SearchResponse {
    /// News hits, falling back to organic hits, capped at `limit`.
    #[must_use]
    pub fn into_news_items(self, limit: usize) -> Vec<NewsItem> {
        match (self.news_results, self.organic_results) {
            (Some(news), _) if !news.is_empty() => {
                news.into_iter().take(limit).map(NewsItem::from).collect()
            }
            (_, Some(organic)) => organic.into_iter().take(limit).map(NewsItem::from).collect(),
            _ => Vec::new(),
        }
    }
}
