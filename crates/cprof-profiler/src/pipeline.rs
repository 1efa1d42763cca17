//! Profile pipeline orchestration.

use std::sync::Arc;

use cprof_core::{
    company_name_from_title, company_name_from_url, normalize_website_url, CompanyProfile,
    Insights, NewsItem, ScrapedPage, MAX_NEWS_ITEMS,
};

use crate::error::ProfileError;
use crate::traits::{InsightSource, NewsSource, PageSource, ProfileStore};
use crate::types::{ProfileRun, RunStatus, Step, StepFailure};

/// Runs the profile pipeline against a set of services.
///
/// Cloning is cheap; all services are shared.
#[derive(Clone)]
pub struct Profiler {
    pages: Arc<dyn PageSource>,
    news: Arc<dyn NewsSource>,
    insights: Arc<dyn InsightSource>,
    store: Arc<dyn ProfileStore>,
}

impl Profiler {
    #[must_use]
    pub fn new(
        pages: Arc<dyn PageSource>,
        news: Arc<dyn NewsSource>,
        insights: Arc<dyn InsightSource>,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            pages,
            news,
            insights,
            store,
        }
    }

    /// Profile the company at `raw_url`.
    ///
    /// 1. Normalize the URL into the store key. Invalid URLs stop here.
    /// 2. If a profile is already stored, return it; nothing is fetched.
    /// 3. Scrape the homepage (failure: empty page).
    /// 4. Search news for the company name from the page title, or the
    ///    domain when there is no usable title (failure: no news).
    /// 5. Generate insights from whatever was gathered (failure: empty).
    /// 6. Assemble and upsert the profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidUrl`] before any external call, or
    /// [`ProfileError::Repository`] if the existence check, read, or upsert
    /// fails. Scrape, news and insight failures never surface here; they are
    /// listed in [`ProfileRun::degraded`].
    pub async fn run(&self, raw_url: &str) -> Result<ProfileRun, ProfileError> {
        let website_url = normalize_website_url(raw_url)?;

        if self.store.exists(&website_url).await? {
            tracing::info!(%website_url, "profile already stored, skipping collection");
            let profile = self.store.get(&website_url).await?;
            return Ok(ProfileRun {
                status: RunStatus::Exists,
                profile,
                degraded: Vec::new(),
            });
        }

        tracing::info!(%website_url, "profiling new company");
        let mut degraded = Vec::new();

        let fetch_url = raw_url.trim();
        let page = match self.pages.fetch_page(fetch_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = fetch_url, error = %e, "scrape failed, continuing without page data");
                degraded.push(StepFailure {
                    step: Step::Scrape,
                    error: e.to_string(),
                });
                ScrapedPage::empty(fetch_url)
            }
        };

        let company_name = page
            .title
            .as_deref()
            .and_then(company_name_from_title)
            .or_else(|| company_name_from_url(fetch_url));

        let news = match company_name.as_deref() {
            Some(name) => match self.news.fetch_news(name).await {
                Ok(mut items) => {
                    items.truncate(MAX_NEWS_ITEMS);
                    items
                }
                Err(e) => {
                    tracing::warn!(company = name, error = %e, "news fetch failed, continuing without news");
                    degraded.push(StepFailure {
                        step: Step::News,
                        error: e.to_string(),
                    });
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let insights = match self.insights.analyze(&page, &news).await {
            Ok(insights) => insights,
            Err(e) => {
                tracing::warn!(%website_url, error = %e, "insight generation failed, storing without insights");
                degraded.push(StepFailure {
                    step: Step::Insights,
                    error: e.to_string(),
                });
                Insights::default()
            }
        };

        let profile = assemble_profile(&website_url, company_name, page, news, insights);
        let stored = self.store.upsert(&profile).await?;

        tracing::info!(
            %website_url,
            degraded = degraded.len(),
            news = stored.latest_news.len(),
            "profile stored"
        );

        Ok(ProfileRun {
            status: RunStatus::Created,
            profile: stored,
            degraded,
        })
    }
}

/// Merge pipeline outputs into one profile. Nothing is invented: missing
/// inputs become `None` or empty collections.
#[must_use]
pub fn assemble_profile(
    website_url: &str,
    company_name: Option<String>,
    page: ScrapedPage,
    mut news: Vec<NewsItem>,
    insights: Insights,
) -> CompanyProfile {
    news.truncate(MAX_NEWS_ITEMS);

    CompanyProfile {
        website_url: website_url.to_string(),
        company_name,
        page_title: page.title,
        meta_description: page.meta_description,
        h1_tags: page.h1_tags,
        h2_tags: page.h2_tags,
        outbound_links: page.outbound_links,
        scraped_content: (!page.content.is_empty()).then_some(page.content),
        latest_news: news,
        company_summary: insights.company_summary,
        industry_category: insights.industry_category,
        target_audience: insights.target_audience,
        key_problems_solved: insights.key_problems_solved,
        potential_competitors: insights.potential_competitors,
        news_summary: insights.news_summary,
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
