//! Turning model output into [`Insights`].
//!
//! The model is asked for JSON but may wrap it in prose or code fences, or
//! emit something slightly malformed. Decoding tries the outermost `{...}`
//! span first and falls back to pulling individual fields out with regexes.
//! Fields that cannot be recovered stay empty.

use cprof_core::Insights;
use regex::Regex;
use serde_json::Value;

const STRING_FIELDS: [&str; 4] = [
    "company_summary",
    "industry_category",
    "target_audience",
    "news_summary",
];
const LIST_FIELDS: [&str; 2] = ["key_problems_solved", "potential_competitors"];

/// Parse model output into [`Insights`]. Never fails.
#[must_use]
pub fn parse_insights(text: &str) -> Insights {
    if let Some(value) = outermost_json_object(text) {
        return insights_from_value(&value);
    }
    tracing::warn!(
        chars = text.chars().count(),
        "model output is not valid JSON, extracting fields best-effort"
    );
    extract_fields(text)
}

fn outermost_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&text[start..=end])
        .ok()
        .filter(Value::is_object)
}

fn insights_from_value(value: &Value) -> Insights {
    let string = |key: &str| value.get(key).and_then(value_as_text);
    let list = |key: &str| value.get(key).map(value_as_list).unwrap_or_default();

    Insights {
        company_summary: string("company_summary"),
        industry_category: string("industry_category"),
        target_audience: string("target_audience"),
        key_problems_solved: list("key_problems_solved"),
        potential_competitors: list("potential_competitors"),
        news_summary: string("news_summary"),
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean(s),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            clean(&joined)
        }
        _ => None,
    }
}

fn value_as_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(clean)
            .collect(),
        Value::String(s) => clean(s).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn clean(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn extract_fields(text: &str) -> Insights {
    let string_value = |key: &str| -> Option<String> {
        let re = Regex::new(&format!(r#""{key}"\s*:\s*"((?:[^"\\]|\\.)*)""#))
            .expect("valid insight field regex");
        re.captures(text)
            .and_then(|cap| cap.get(1))
            .and_then(|m| clean(&unescape(m.as_str())))
    };

    let list_value = |key: &str| -> Vec<String> {
        // The list ends at the first `]` after a closing quote (and an optional
        // trailing comma), so a bracket inside an item does not cut it short.
        let re = Regex::new(&format!(r#"(?s)"{key}"\s*:\s*\[(.*?")\s*,?\s*\]"#))
            .expect("valid insight list regex");
        let item_re = Regex::new(r#""((?:[^"\\]|\\.)*)""#).expect("valid list item regex");
        re.captures(text)
            .and_then(|cap| cap.get(1))
            .map(|inner| {
                item_re
                    .captures_iter(inner.as_str())
                    .filter_map(|c| c.get(1))
                    .filter_map(|m| clean(&unescape(m.as_str())))
                    .collect()
            })
            .unwrap_or_default()
    };

    let [summary, category, audience, news] = STRING_FIELDS.map(string_value);
    let [problems, competitors] = LIST_FIELDS.map(list_value);

    Insights {
        company_summary: summary,
        industry_category: category,
        target_audience: audience,
        key_problems_solved: problems,
        potential_competitors: competitors,
        news_summary: news,
    }
}

/// Decode JSON string escapes, keeping the raw text if they are malformed.
fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
