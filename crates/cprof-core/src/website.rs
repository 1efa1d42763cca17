//! Website URL validation, natural-key normalization, and name heuristics.

use thiserror::Error;
use url::Url;

/// A website URL that cannot be profiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid website URL \"{url}\": {reason}")]
pub struct UrlError {
    pub url: String,
    pub reason: String,
}

impl UrlError {
    fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Title segments that name the page rather than the company.
const GENERIC_TITLE_SEGMENTS: &[&str] = &["home", "homepage", "home page", "welcome"];

const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " – ", " — ", " · ", ": "];

/// Parse `raw` as an absolute `http(s)` URL with a host.
///
/// # Errors
///
/// Returns [`UrlError`] for empty input, a missing scheme, a non-HTTP scheme,
/// or an unparseable host.
pub fn parse_website_url(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::new(raw, "empty URL"));
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::new(raw, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::new(
            raw,
            format!("unsupported scheme \"{}\"", url.scheme()),
        ));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::new(raw, "missing host")),
    }
}

/// Normalize a website URL into the profile store's natural key.
///
/// The key is lower-cased, always `https`, has a leading `www.` removed from
/// the host, drops query and fragment, and has no trailing slash. Non-default
/// ports are kept.
///
/// `"http://www.Acme.io/About/"` becomes `"https://acme.io/about"`.
///
/// # Errors
///
/// Returns [`UrlError`] when `raw` is not a valid absolute `http(s)` URL.
pub fn normalize_website_url(raw: &str) -> Result<String, UrlError> {
    let url = parse_website_url(raw)?;

    let host = url.host_str().unwrap_or_default().to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    let path = url.path().to_lowercase();

    let key = format!("https://{host}{port}{path}");
    Ok(key.trim_end_matches('/').to_string())
}

/// Guess a company name from the website's host.
///
/// Takes the first label of the host (after dropping `www.`) and capitalizes
/// it: `https://www.stripe.com` gives `"Stripe"`. Returns `None` if `url` does
/// not parse.
#[must_use]
pub fn company_name_from_url(url: &str) -> Option<String> {
    let parsed = parse_website_url(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let label = host.split('.').next().filter(|l| !l.is_empty())?;
    Some(capitalize(label))
}

/// Guess a company name from an HTML `<title>`.
///
/// Splits on common title separators (`|`, `-`, `–`, `—`, `·`, `:`) and takes
/// the first segment, skipping generic ones like "Home". Returns `None` when
/// nothing usable remains.
#[must_use]
pub fn company_name_from_title(title: &str) -> Option<String> {
    let mut segments: Vec<&str> = vec![title];
    for sep in TITLE_SEPARATORS {
        segments = segments
            .into_iter()
            .flat_map(|segment| segment.split(sep))
            .collect();
    }

    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .find(|s| !GENERIC_TITLE_SEGMENTS.contains(&s.to_lowercase().as_str()))
        .map(str::to_string)
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
