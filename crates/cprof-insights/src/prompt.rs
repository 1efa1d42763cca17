use std::fmt::Write as _;

use cprof_core::{truncate_chars, NewsItem, ScrapedPage};

const MAX_H1: usize = 5;
const MAX_H2: usize = 10;
const EXCERPT_CHARS: usize = 2000;
const MAX_HEADLINES: usize = 5;

const RESPONSE_SCHEMA: &str = r#"{
  "company_summary": "What the company does, in at most 100 words",
  "industry_category": "The primary industry category",
  "target_audience": "Who the company sells to",
  "key_problems_solved": ["Problem 1", "Problem 2", "Problem 3"],
  "potential_competitors": ["Competitor 1", "Competitor 2", "Competitor 3"],
  "news_summary": "A short paragraph on the latest news and developments"
}"#;

/// Build the single analysis prompt sent to the model.
///
/// Missing page fields are rendered as `N/A` so the model can see what was
/// not available rather than guessing.
#[must_use]
pub fn build_analysis_prompt(page: &ScrapedPage, news: &[NewsItem]) -> String {
    let mut prompt = String::from(
        "Analyze the following company information and provide structured insights.\n\n",
    );

    let _ = writeln!(prompt, "Website URL: {}", page.url);
    let _ = writeln!(prompt, "Page Title: {}", page.title.as_deref().unwrap_or("N/A"));
    let _ = writeln!(
        prompt,
        "Meta Description: {}",
        page.meta_description.as_deref().unwrap_or("N/A")
    );

    prompt.push_str("\nKey Headlines (H1):\n");
    push_lines(&mut prompt, page.h1_tags.iter().take(MAX_H1).map(String::as_str));

    prompt.push_str("\nSubheadings (H2):\n");
    push_lines(&mut prompt, page.h2_tags.iter().take(MAX_H2).map(String::as_str));

    prompt.push_str("\nWebsite Content (excerpt):\n");
    if page.content.is_empty() {
        prompt.push_str("N/A\n");
    } else {
        prompt.push_str(&truncate_chars(&page.content, EXCERPT_CHARS));
        prompt.push('\n');
    }

    prompt.push_str("\nRecent News:\n");
    if news.is_empty() {
        prompt.push_str("N/A\n");
    }
    for item in news.iter().take(MAX_HEADLINES) {
        if item.source_name.is_empty() {
            let _ = writeln!(prompt, "- {}", item.title);
        } else {
            let _ = writeln!(prompt, "- {} ({})", item.title, item.source_name);
        }
    }

    prompt.push_str("\nBased on this information, provide the following analysis in JSON format:\n\n");
    prompt.push_str(RESPONSE_SCHEMA);
    prompt.push_str(
        "\n\nUse an empty string or empty list for anything the information does not support. \
         Respond with valid JSON only.",
    );
    prompt
}

fn push_lines<'a>(prompt: &mut String, lines: impl Iterator<Item = &'a str>) {
    let mut wrote = false;
    for line in lines {
        prompt.push_str(line);
        prompt.push('\n');
        wrote = true;
    }
    if !wrote {
        prompt.push_str("N/A\n");
    }
}
