//! Database operations for the `company_profiles` table.

use chrono::{DateTime, Utc};
use cprof_core::{CompanyProfile, NewsItem};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `company_profiles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyProfileRow {
    pub id: i64,
    pub public_id: Uuid,
    pub website_url: String,
    pub company_name: Option<String>,
    pub page_title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_tags: Vec<String>,
    pub h2_tags: Vec<String>,
    pub outbound_links: Vec<String>,
    pub scraped_content: Option<String>,
    pub latest_news: Json<Vec<NewsItem>>,
    pub company_summary: Option<String>,
    pub industry_category: Option<String>,
    pub target_audience: Option<String>,
    pub key_problems_solved: Vec<String>,
    pub potential_competitors: Vec<String>,
    pub news_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CompanyProfileRow> for CompanyProfile {
    fn from(row: CompanyProfileRow) -> Self {
        Self {
            website_url: row.website_url,
            company_name: row.company_name,
            page_title: row.page_title,
            meta_description: row.meta_description,
            h1_tags: row.h1_tags,
            h2_tags: row.h2_tags,
            outbound_links: row.outbound_links,
            scraped_content: row.scraped_content,
            latest_news: row.latest_news.0,
            company_summary: row.company_summary,
            industry_category: row.industry_category,
            target_audience: row.target_audience,
            key_problems_solved: row.key_problems_solved,
            potential_competitors: row.potential_competitors,
            news_summary: row.news_summary,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

const SELECT_COLUMNS: &str = "id, public_id, website_url, company_name, page_title, \
     meta_description, h1_tags, h2_tags, outbound_links, scraped_content, latest_news, \
     company_summary, industry_category, target_audience, key_problems_solved, \
     potential_competitors, news_summary, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns `true` when a profile is stored under `website_url`.
///
/// `website_url` must already be normalized.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn profile_exists(pool: &PgPool, website_url: &str) -> Result<bool, DbError> {
    Ok(sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM company_profiles WHERE website_url = $1)",
    )
    .bind(website_url)
    .fetch_one(pool)
    .await?)
}

/// Fetch the profile stored under `website_url`, if any.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn get_company_profile(
    pool: &PgPool,
    website_url: &str,
) -> Result<Option<CompanyProfileRow>, DbError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM company_profiles WHERE website_url = $1");
    Ok(sqlx::query_as::<_, CompanyProfileRow>(&sql)
        .bind(website_url)
        .fetch_optional(pool)
        .await?)
}

/// Insert or fully replace the profile keyed by `profile.website_url`.
///
/// Every content column is overwritten on conflict; `created_at` is kept and
/// `updated_at` is bumped. The stored row is returned.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn upsert_company_profile(
    pool: &PgPool,
    profile: &CompanyProfile,
) -> Result<CompanyProfileRow, DbError> {
    let sql = format!(
        "INSERT INTO company_profiles \
           (website_url, company_name, page_title, meta_description, h1_tags, h2_tags, \
            outbound_links, scraped_content, latest_news, company_summary, industry_category, \
            target_audience, key_problems_solved, potential_competitors, news_summary) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         ON CONFLICT (website_url) DO UPDATE SET \
           company_name          = EXCLUDED.company_name, \
           page_title            = EXCLUDED.page_title, \
           meta_description      = EXCLUDED.meta_description, \
           h1_tags               = EXCLUDED.h1_tags, \
           h2_tags               = EXCLUDED.h2_tags, \
           outbound_links        = EXCLUDED.outbound_links, \
           scraped_content       = EXCLUDED.scraped_content, \
           latest_news           = EXCLUDED.latest_news, \
           company_summary       = EXCLUDED.company_summary, \
           industry_category     = EXCLUDED.industry_category, \
           target_audience       = EXCLUDED.target_audience, \
           key_problems_solved   = EXCLUDED.key_problems_solved, \
           potential_competitors = EXCLUDED.potential_competitors, \
           news_summary          = EXCLUDED.news_summary, \
           updated_at            = NOW() \
         RETURNING {SELECT_COLUMNS}"
    );

    let latest_news = serde_json::to_value(&profile.latest_news)?;

    let row = sqlx::query_as::<_, CompanyProfileRow>(&sql)
        .bind(&profile.website_url)
        .bind(profile.company_name.as_deref())
        .bind(profile.page_title.as_deref())
        .bind(profile.meta_description.as_deref())
        .bind(&profile.h1_tags)
        .bind(&profile.h2_tags)
        .bind(&profile.outbound_links)
        .bind(profile.scraped_content.as_deref())
        .bind(latest_news)
        .bind(profile.company_summary.as_deref())
        .bind(profile.industry_category.as_deref())
        .bind(profile.target_audience.as_deref())
        .bind(&profile.key_problems_solved)
        .bind(&profile.potential_competitors)
        .bind(profile.news_summary.as_deref())
        .fetch_one(pool)
        .await?;

    tracing::debug!(website_url = %row.website_url, id = row.id, "company profile upserted");
    Ok(row)
}
