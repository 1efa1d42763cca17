use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use cprof_db::DbError;
use cprof_insights::InsightError;
use cprof_news::NewsError;
use cprof_scraper::ScraperError;

use super::*;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakePages {
    page: Option<ScrapedPage>,
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl PageSource for FakePages {
    async fn fetch_page(&self, url: &str) -> Result<ScrapedPage, ScraperError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.page.clone().ok_or_else(|| ScraperError::UnexpectedStatus {
            status: 503,
            url: url.to_string(),
        })
    }
}

#[derive(Default)]
struct FakeNews {
    items: Option<Vec<NewsItem>>,
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl NewsSource for FakeNews {
    async fn fetch_news(&self, company: &str) -> Result<Vec<NewsItem>, NewsError> {
        self.queries.lock().unwrap().push(company.to_string());
        self.items
            .clone()
            .ok_or_else(|| NewsError::Api("out of searches".to_string()))
    }
}

#[derive(Default)]
struct FakeInsights {
    insights: Option<Insights>,
    calls: AtomicUsize,
    seen_news: Mutex<Option<usize>>,
}

#[async_trait]
impl InsightSource for FakeInsights {
    async fn analyze(
        &self,
        _page: &ScrapedPage,
        news: &[NewsItem],
    ) -> Result<Insights, InsightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_news.lock().unwrap() = Some(news.len());
        self.insights
            .clone()
            .ok_or_else(|| InsightError::EmptyResponse {
                reason: "no candidates".to_string(),
            })
    }
}

#[derive(Default)]
struct MemoryStore {
    rows: Mutex<HashMap<String, CompanyProfile>>,
    fail_exists: bool,
    fail_upsert: bool,
    exists_calls: AtomicUsize,
    upserts: AtomicUsize,
}

impl MemoryStore {
    fn with_profile(profile: CompanyProfile) -> Self {
        let store = Self::default();
        store
            .rows
            .lock()
            .unwrap()
            .insert(profile.website_url.clone(), profile);
        store
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn exists(&self, website_url: &str) -> Result<bool, DbError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self.rows.lock().unwrap().contains_key(website_url))
    }

    async fn get(&self, website_url: &str) -> Result<CompanyProfile, DbError> {
        self.rows
            .lock()
            .unwrap()
            .get(website_url)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn upsert(&self, profile: &CompanyProfile) -> Result<CompanyProfile, DbError> {
        if self.fail_upsert {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let stored = CompanyProfile {
            created_at: Some(now),
            updated_at: Some(now),
            ..profile.clone()
        };
        self.rows
            .lock()
            .unwrap()
            .insert(profile.website_url.clone(), stored.clone());
        Ok(stored)
    }
}

struct Harness {
    pages: Arc<FakePages>,
    news: Arc<FakeNews>,
    insights: Arc<FakeInsights>,
    store: Arc<MemoryStore>,
}

impl Harness {
    fn new(pages: FakePages, news: FakeNews, insights: FakeInsights, store: MemoryStore) -> Self {
        Self {
            pages: Arc::new(pages),
            news: Arc::new(news),
            insights: Arc::new(insights),
            store: Arc::new(store),
        }
    }

    fn profiler(&self) -> Profiler {
        Profiler::new(
            self.pages.clone(),
            self.news.clone(),
            self.insights.clone(),
            self.store.clone(),
        )
    }

    fn external_calls(&self) -> usize {
        self.pages.calls.lock().unwrap().len()
            + self.news.queries.lock().unwrap().len()
            + self.insights.calls.load(Ordering::SeqCst)
    }
}

fn acme_page() -> ScrapedPage {
    ScrapedPage {
        url: "https://www.acme.io/".to_string(),
        title: Some("Acme Robotics | Warehouse automation".to_string()),
        meta_description: Some("Robots for warehouses.".to_string()),
        h1_tags: vec!["Automate your warehouse".to_string()],
        h2_tags: vec!["Pricing".to_string()],
        outbound_links: vec!["https://acme.io/about".to_string()],
        content: "Acme builds warehouse robots.".to_string(),
    }
}

fn news_items(n: usize) -> Vec<NewsItem> {
    (0..n)
        .map(|i| NewsItem {
            title: format!("Acme story {i}"),
            link: format!("https://news.example/{i}"),
            ..NewsItem::default()
        })
        .collect()
}

fn acme_insights() -> Insights {
    Insights {
        company_summary: Some("Acme builds warehouse robots.".to_string()),
        industry_category: Some("Robotics".to_string()),
        potential_competitors: vec!["Initech".to_string()],
        ..Insights::default()
    }
}

fn healthy() -> Harness {
    Harness::new(
        FakePages {
            page: Some(acme_page()),
            ..FakePages::default()
        },
        FakeNews {
            items: Some(news_items(2)),
            ..FakeNews::default()
        },
        FakeInsights {
            insights: Some(acme_insights()),
            ..FakeInsights::default()
        },
        MemoryStore::default(),
    )
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_url_is_scraped_enriched_and_stored() {
    let h = healthy();
    let run = h.profiler().run("https://www.acme.io/").await.unwrap();

    assert_eq!(run.status, RunStatus::Created);
    assert!(!run.is_partial());
    assert_eq!(run.profile.website_url, "https://acme.io");
    assert_eq!(run.profile.company_name.as_deref(), Some("Acme Robotics"));
    assert_eq!(
        run.profile.page_title.as_deref(),
        Some("Acme Robotics | Warehouse automation")
    );
    assert_eq!(run.profile.latest_news.len(), 2);
    assert_eq!(run.profile.industry_category.as_deref(), Some("Robotics"));
    assert!(run.profile.created_at.is_some());

    assert_eq!(h.pages.calls.lock().unwrap().as_slice(), ["https://www.acme.io/"]);
    assert_eq!(h.news.queries.lock().unwrap().as_slice(), ["Acme Robotics"]);
    assert_eq!(*h.insights.seen_news.lock().unwrap(), Some(2));
    assert_eq!(h.store.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_run_returns_existing_without_external_calls() {
    let h = healthy();
    let profiler = h.profiler();
    let first = profiler.run("https://acme.io").await.unwrap();
    let calls_after_first = h.external_calls();

    let second = profiler.run("http://www.ACME.io/").await.unwrap();

    assert_eq!(second.status, RunStatus::Exists);
    assert_eq!(second.profile, first.profile);
    assert!(second.degraded.is_empty());
    assert_eq!(h.external_calls(), calls_after_first);
    assert_eq!(h.store.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stored_profile_round_trips_except_timestamps() {
    let h = healthy();
    let run = h.profiler().run("https://acme.io").await.unwrap();

    let expected = assemble_profile(
        "https://acme.io",
        Some("Acme Robotics".to_string()),
        acme_page(),
        news_items(2),
        acme_insights(),
    );
    let read_back = h.store.get("https://acme.io").await.unwrap();
    assert_eq!(read_back.without_timestamps(), expected);
    assert_eq!(run.profile.without_timestamps(), expected);
}

#[tokio::test]
async fn news_is_capped_at_five() {
    let h = Harness::new(
        FakePages {
            page: Some(acme_page()),
            ..FakePages::default()
        },
        FakeNews {
            items: Some(news_items(9)),
            ..FakeNews::default()
        },
        FakeInsights {
            insights: Some(acme_insights()),
            ..FakeInsights::default()
        },
        MemoryStore::default(),
    );
    let run = h.profiler().run("https://acme.io").await.unwrap();
    assert_eq!(run.profile.latest_news.len(), 5);
    assert_eq!(*h.insights.seen_news.lock().unwrap(), Some(5));
}

// ---------------------------------------------------------------------------
// Degradation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn news_and_insight_failures_degrade_to_empty_fields() {
    let h = Harness::new(
        FakePages {
            page: Some(acme_page()),
            ..FakePages::default()
        },
        FakeNews::default(),
        FakeInsights::default(),
        MemoryStore::default(),
    );
    let run = h.profiler().run("https://acme.io").await.unwrap();

    assert_eq!(run.status, RunStatus::Created);
    assert_eq!(run.profile.h1_tags, vec!["Automate your warehouse".to_string()]);
    assert_eq!(
        run.profile.scraped_content.as_deref(),
        Some("Acme builds warehouse robots.")
    );
    assert!(run.profile.latest_news.is_empty());
    assert!(run.profile.insights().is_empty());

    let steps: Vec<Step> = run.degraded.iter().map(|f| f.step).collect();
    assert_eq!(steps, vec![Step::News, Step::Insights]);
    assert!(run.degraded[0].error.contains("out of searches"));
    assert_eq!(h.store.upserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scrape_failure_falls_back_to_domain_name_and_still_generates() {
    let h = Harness::new(
        FakePages::default(),
        FakeNews {
            items: Some(news_items(1)),
            ..FakeNews::default()
        },
        FakeInsights {
            insights: Some(acme_insights()),
            ..FakeInsights::default()
        },
        MemoryStore::default(),
    );
    let run = h.profiler().run("https://www.acme.io").await.unwrap();

    assert_eq!(run.status, RunStatus::Created);
    assert_eq!(h.news.queries.lock().unwrap().as_slice(), ["Acme"]);
    assert_eq!(run.profile.company_name.as_deref(), Some("Acme"));
    assert!(run.profile.page_title.is_none());
    assert!(run.profile.scraped_content.is_none());
    assert!(run.profile.outbound_links.is_empty());
    assert_eq!(h.insights.calls.load(Ordering::SeqCst), 1);
    assert_eq!(run.degraded.len(), 1);
    assert_eq!(run.degraded[0].step, Step::Scrape);
}

#[tokio::test]
async fn everything_failing_still_stores_a_bare_profile() {
    let h = Harness::new(
        FakePages::default(),
        FakeNews::default(),
        FakeInsights::default(),
        MemoryStore::default(),
    );
    let run = h.profiler().run("https://acme.io").await.unwrap();

    assert_eq!(run.status, RunStatus::Created);
    assert_eq!(run.degraded.len(), 3);
    assert_eq!(run.profile.website_url, "https://acme.io");
    assert!(run.profile.company_summary.is_none());
    assert!(h.store.rows.lock().unwrap().contains_key("https://acme.io"));
}

// ---------------------------------------------------------------------------
// Terminal failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_url_fails_before_any_call() {
    let h = healthy();
    let result = h.profiler().run("not a url").await;

    assert!(matches!(result, Err(ProfileError::InvalidUrl(_))));
    assert_eq!(h.external_calls(), 0);
    assert_eq!(h.store.exists_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn existence_check_failure_is_terminal_and_skips_collection() {
    let h = Harness::new(
        FakePages {
            page: Some(acme_page()),
            ..FakePages::default()
        },
        FakeNews {
            items: Some(news_items(1)),
            ..FakeNews::default()
        },
        FakeInsights {
            insights: Some(acme_insights()),
            ..FakeInsights::default()
        },
        MemoryStore {
            fail_exists: true,
            ..MemoryStore::default()
        },
    );
    let result = h.profiler().run("https://acme.io").await;

    assert!(matches!(result, Err(ProfileError::Repository(_))));
    assert_eq!(h.external_calls(), 0);
}

#[tokio::test]
async fn upsert_failure_is_terminal() {
    let h = Harness::new(
        FakePages {
            page: Some(acme_page()),
            ..FakePages::default()
        },
        FakeNews {
            items: Some(news_items(1)),
            ..FakeNews::default()
        },
        FakeInsights {
            insights: Some(acme_insights()),
            ..FakeInsights::default()
        },
        MemoryStore {
            fail_upsert: true,
            ..MemoryStore::default()
        },
    );
    let result = h.profiler().run("https://acme.io").await;

    assert!(matches!(result, Err(ProfileError::Repository(_))));
    assert!(h.store.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn stored_profile_is_returned_as_exists() {
    let existing = CompanyProfile {
        website_url: "https://acme.io".to_string(),
        company_name: Some("Acme".to_string()),
        ..CompanyProfile::default()
    };
    let h = Harness::new(
        FakePages::default(),
        FakeNews::default(),
        FakeInsights::default(),
        MemoryStore::with_profile(existing.clone()),
    );
    let run = h.profiler().run("https://acme.io/").await.unwrap();

    assert_eq!(run.status, RunStatus::Exists);
    assert_eq!(run.profile, existing);
    assert_eq!(h.external_calls(), 0);
}

// ---------------------------------------------------------------------------
// assemble_profile
// ---------------------------------------------------------------------------

#[test]
fn assemble_keeps_empty_content_as_none() {
    let profile = assemble_profile(
        "https://acme.io",
        None,
        ScrapedPage::empty("https://acme.io"),
        Vec::new(),
        Insights::default(),
    );
    assert!(profile.scraped_content.is_none());
    assert!(profile.company_name.is_none());
    assert!(profile.latest_news.is_empty());
}

#[test]
fn assemble_caps_news() {
    let profile = assemble_profile(
        "https://acme.io",
        None,
        ScrapedPage::empty("https://acme.io"),
        news_items(7),
        Insights::default(),
    );
    assert_eq!(profile.latest_news.len(), MAX_NEWS_ITEMS);
}

#[tokio::test]
async fn run_serializes_status_and_degraded_steps() {
    let h = Harness::new(
        FakePages {
            page: Some(acme_page()),
            ..FakePages::default()
        },
        FakeNews::default(),
        FakeInsights {
            insights: Some(acme_insights()),
            ..FakeInsights::default()
        },
        MemoryStore::default(),
    );
    let run = h.profiler().run("https://acme.io").await.unwrap();

    let json = serde_json::to_value(&run).unwrap();
    assert_eq!(json["status"], "created");
    assert_eq!(json["degraded"][0]["step"], "news");
    assert_eq!(json["profile"]["website_url"], "https://acme.io");
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

struct StalledInsights;

#[async_trait]
impl InsightSource for StalledInsights {
    async fn analyze(
        &self,
        _page: &ScrapedPage,
        _news: &[NewsItem],
    ) -> Result<Insights, InsightError> {
        std::future::pending::<Result<Insights, InsightError>>().await
    }
}

#[tokio::test]
async fn cancelled_run_issues_no_write() {
    let store = Arc::new(MemoryStore::default());
    let profiler = Profiler::new(
        Arc::new(FakePages {
            page: Some(acme_page()),
            ..FakePages::default()
        }),
        Arc::new(FakeNews {
            items: Some(news_items(2)),
            ..FakeNews::default()
        }),
        Arc::new(StalledInsights),
        store.clone(),
    );

    let result = tokio::time::timeout(
        std::time::Duration::from_millis(50),
        profiler.run("https://acme.io"),
    )
    .await;

    assert!(result.is_err(), "run should still be waiting on insights");
    assert_eq!(store.exists_calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.upserts.load(Ordering::SeqCst), 0);
    assert!(store.rows.lock().unwrap().is_empty());
}
