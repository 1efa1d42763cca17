//! Production implementations of the pipeline traits.

use async_trait::async_trait;
use cprof_core::{CompanyProfile, Insights, NewsItem, ScrapedPage};
use cprof_db::DbError;
use cprof_insights::{GeminiClient, InsightError};
use cprof_news::{NewsError, SerpApiClient};
use cprof_scraper::{ScraperError, SiteClient};
use sqlx::PgPool;

use crate::traits::{InsightSource, NewsSource, PageSource, ProfileStore};

/// [`SiteClient`] bound to the configured content and link limits.
pub struct SitePageSource {
    client: SiteClient,
    content_char_limit: usize,
    max_links: usize,
}

impl SitePageSource {
    #[must_use]
    pub fn new(client: SiteClient, content_char_limit: usize, max_links: usize) -> Self {
        Self {
            client,
            content_char_limit,
            max_links,
        }
    }
}

#[async_trait]
impl PageSource for SitePageSource {
    async fn fetch_page(&self, url: &str) -> Result<ScrapedPage, ScraperError> {
        self.client
            .fetch_page(url, self.content_char_limit, self.max_links)
            .await
    }
}

#[async_trait]
impl NewsSource for SerpApiClient {
    async fn fetch_news(&self, company: &str) -> Result<Vec<NewsItem>, NewsError> {
        self.search_news(company).await
    }
}

#[async_trait]
impl InsightSource for GeminiClient {
    async fn analyze(
        &self,
        page: &ScrapedPage,
        news: &[NewsItem],
    ) -> Result<Insights, InsightError> {
        GeminiClient::analyze(self, page, news).await
    }
}

/// Postgres-backed [`ProfileStore`].
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn exists(&self, website_url: &str) -> Result<bool, DbError> {
        cprof_db::profile_exists(&self.pool, website_url).await
    }

    async fn get(&self, website_url: &str) -> Result<CompanyProfile, DbError> {
        cprof_db::get_company_profile(&self.pool, website_url)
            .await?
            .map(CompanyProfile::from)
            .ok_or(DbError::NotFound)
    }

    async fn upsert(&self, profile: &CompanyProfile) -> Result<CompanyProfile, DbError> {
        cprof_db::upsert_company_profile(&self.pool, profile)
            .await
            .map(CompanyProfile::from)
    }
}
