//! Service seams the pipeline depends on.
//!
//! Production adapters live in [`crate::adapters`]; tests substitute
//! in-memory fakes.

use async_trait::async_trait;
use cprof_core::{CompanyProfile, Insights, NewsItem, ScrapedPage};
use cprof_db::DbError;
use cprof_insights::InsightError;
use cprof_news::NewsError;
use cprof_scraper::ScraperError;

/// Fetches and extracts a company homepage.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<ScrapedPage, ScraperError>;
}

/// Searches recent news about a company by name.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self, company: &str) -> Result<Vec<NewsItem>, NewsError>;
}

/// Derives analytical fields from a page and its news.
#[async_trait]
pub trait InsightSource: Send + Sync {
    async fn analyze(
        &self,
        page: &ScrapedPage,
        news: &[NewsItem],
    ) -> Result<Insights, InsightError>;
}

/// Persistent profile storage keyed by normalized website URL.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn exists(&self, website_url: &str) -> Result<bool, DbError>;

    /// Returns [`DbError::NotFound`] when no profile is stored.
    async fn get(&self, website_url: &str) -> Result<CompanyProfile, DbError>;

    /// Insert or replace; returns the stored profile with timestamps.
    async fn upsert(&self, profile: &CompanyProfile) -> Result<CompanyProfile, DbError>;
}
