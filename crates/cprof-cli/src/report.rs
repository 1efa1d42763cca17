//! Plain-text rendering of profiles for stdout.

use std::fmt::Write as _;

use cprof_core::{truncate_chars, CompanyProfile};
use cprof_profiler::{ProfileRun, RunStatus};

/// Characters of scraped content included in chat context per profile.
const CONTEXT_CONTENT_CHARS: usize = 1500;

pub(crate) fn render_run(run: &ProfileRun) -> String {
    let mut out = String::new();

    match run.status {
        RunStatus::Exists => out.push_str("Status: exists (loaded from database)\n"),
        RunStatus::Created if run.is_partial() => {
            let failed: Vec<String> = run.degraded.iter().map(|f| f.step.to_string()).collect();
            let _ = writeln!(out, "Status: created (partial: {} unavailable)", failed.join(", "));
        }
        RunStatus::Created => out.push_str("Status: created\n"),
    }
    out.push('\n');
    out.push_str(&render_profile(&run.profile));

    if run.is_partial() {
        out.push_str("\nDiagnostics:\n");
        for failure in &run.degraded {
            let _ = writeln!(out, "  {}: {}", failure.step, failure.error);
        }
    }
    out
}

pub(crate) fn render_profile(profile: &CompanyProfile) -> String {
    let mut out = String::new();

    field(&mut out, "Company", profile.company_name.as_deref());
    field(&mut out, "Website", Some(profile.website_url.as_str()));
    field(&mut out, "Title", profile.page_title.as_deref());
    field(&mut out, "Description", profile.meta_description.as_deref());
    field(&mut out, "Industry", profile.industry_category.as_deref());
    field(&mut out, "Target audience", profile.target_audience.as_deref());

    if let Some(summary) = &profile.company_summary {
        let _ = writeln!(out, "\nSummary:\n  {summary}");
    }
    list(&mut out, "Key problems solved", &profile.key_problems_solved);
    list(&mut out, "Potential competitors", &profile.potential_competitors);

    if !profile.latest_news.is_empty() {
        out.push_str("\nLatest news:\n");
        for item in &profile.latest_news {
            let meta: Vec<&str> = [item.source_name.as_str(), item.published_date.as_str()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect();
            if meta.is_empty() {
                let _ = writeln!(out, "  - {}", item.title);
            } else {
                let _ = writeln!(out, "  - {} ({})", item.title, meta.join(", "));
            }
            if !item.link.is_empty() {
                let _ = writeln!(out, "    {}", item.link);
            }
        }
    }
    if let Some(news_summary) = &profile.news_summary {
        let _ = writeln!(out, "\nNews summary:\n  {news_summary}");
    }

    list(&mut out, "Headlines", &profile.h1_tags);
    if !profile.outbound_links.is_empty() {
        let _ = writeln!(out, "\nOutbound links: {}", profile.outbound_links.len());
    }
    out
}

/// Compact description of a profile for the chat model.
pub(crate) fn profile_context(profile: &CompanyProfile) -> String {
    let mut out = render_profile(profile);
    if let Some(content) = &profile.scraped_content {
        let _ = writeln!(
            out,
            "\nWebsite content (excerpt):\n  {}",
            truncate_chars(content, CONTEXT_CONTENT_CHARS)
        );
    }
    out
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "{label}: {value}");
    }
}

fn list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{label}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}
