mod interactive;
mod report;
mod shutdown;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cprof_core::{normalize_website_url, AppConfig, Environment, UrlError};
use cprof_insights::GeminiClient;
use cprof_news::SerpApiClient;
use cprof_profiler::{PgProfileStore, Profiler, SitePageSource};
use cprof_scraper::SiteClient;
use tracing_subscriber::EnvFilter;

/// Exit status for a run interrupted by Ctrl-C or SIGTERM.
const EXIT_CANCELLED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "cprof-cli")]
#[command(about = "Build a company profile from its website, recent news, and an LLM summary")]
struct Cli {
    /// Company website to profile, e.g. `https://stripe.com`
    website_url: String,

    /// After the first profile, keep reading URLs and questions from stdin
    #[arg(short, long)]
    interactive: bool,
}

enum Outcome {
    Done,
    Cancelled,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Cancelled) => {
            eprintln!("cancelled");
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let config = cprof_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(colored_logs(&config.env))
        .init();
    tracing::debug!(?config, "configuration loaded");

    let website_url = validate_target(&cli.website_url)?;
    tracing::debug!(%website_url, "target URL accepted");

    let pool_config = cprof_db::PoolConfig::from_app_config(&config);
    let pool = cprof_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("connecting to database")?;
    cprof_db::run_migrations(&pool)
        .await
        .context("running database migrations")?;

    let gemini = Arc::new(GeminiClient::new(
        &config.gemini_api_key,
        &config.gemini_model,
        config.llm_timeout_secs,
        config.max_retries,
        config.retry_backoff_ms,
    )?);
    let profiler = build_profiler(&config, pool, Arc::clone(&gemini))?;

    let work = async {
        if cli.interactive {
            interactive::run(&profiler, &gemini, &cli.website_url).await
        } else {
            let run = profiler.run(&cli.website_url).await?;
            println!("{}", report::render_run(&run));
            Ok(())
        }
    };

    tokio::select! {
        result = work => result.map(|()| Outcome::Done),
        () = shutdown::signal() => Ok(Outcome::Cancelled),
    }
}

/// Reject a malformed target URL before the database is contacted.
fn validate_target(raw: &str) -> Result<String, UrlError> {
    normalize_website_url(raw)
}

/// ANSI colors are enabled only in development.
fn colored_logs(env: &Environment) -> bool {
    matches!(env, Environment::Development)
}

fn build_profiler(
    config: &AppConfig,
    pool: sqlx::PgPool,
    gemini: Arc<GeminiClient>,
) -> anyhow::Result<Profiler> {
    let site = SiteClient::new(
        config.scraper_timeout_secs,
        &config.scraper_user_agent,
        config.max_retries,
        config.retry_backoff_ms,
    )?;
    let serp = SerpApiClient::new(
        &config.serpapi_key,
        config.news_timeout_secs,
        config.max_retries,
        config.retry_backoff_ms,
    )?;

    Ok(Profiler::new(
        Arc::new(SitePageSource::new(
            site,
            config.content_char_limit,
            config.max_outbound_links,
        )),
        Arc::new(serp),
        gemini,
        Arc::new(PgProfileStore::new(pool)),
    ))
}
