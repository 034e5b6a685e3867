//! Inbound side: turning a request URL into query variables.

use super::compiled::RuleTable;
use super::matchers::EVENT_DISPLAY_VAR;
use super::QueryVars;
use tracing::debug;
use url::{form_urlencoded, Url};

/// Path and raw query string of `url`; relative URLs are accepted.
pub fn split_url(url: &str) -> (String, Option<String>) {
    if let Ok(parsed) = Url::parse(url) {
        return (parsed.path().to_string(), parsed.query().map(str::to_string));
    }

    let without_fragment = url.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (without_fragment.to_string(), None),
    }
}

/// The site's path below the host, e.g. `/blog` for `http://x.org/blog/`.
pub fn home_path(home: &str) -> String {
    let path = match Url::parse(home) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => home.to_string(),
    };
    path.trim_matches('/').to_string()
}

/// `path` relative to the home path, slashes trimmed at both ends.
pub fn relative_path(path: &str, home_path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if home_path.is_empty() {
        return trimmed.to_string();
    }

    match trimmed.strip_prefix(home_path) {
        Some("") => String::new(),
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/').to_string(),
        _ => trimmed.to_string(),
    }
}

/// Query variables carried by a raw query string; later keys win.
pub fn parse_query_string(query: &str) -> QueryVars {
    form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// First rule matching `path`, retried once with the path percent-decoded.
pub fn match_path(table: &RuleTable, path: &str) -> Option<QueryVars> {
    if let Some((rule, vars)) = table.find_match(path) {
        debug!("Path '{}' matched rule {}", path, rule.source);
        return Some(vars);
    }

    let decoded = urlencoding::decode(path).ok()?;
    if decoded == path {
        return None;
    }
    let (rule, vars) = table.find_match(&decoded)?;
    debug!("Decoded path '{}' matched rule {}", decoded, rule.source);
    Some(vars)
}

/// A rule that settled on the `default` display yields to an explicit
/// `eventDisplay` in the URL's own query string.
pub fn normalize(mut query_vars: QueryVars, url: &str) -> QueryVars {
    if url.is_empty() {
        return query_vars;
    }

    let Some(query) = split_url(url).1 else {
        return query_vars;
    };
    let url_vars = parse_query_string(&query);

    let Some(requested) = url_vars.get(EVENT_DISPLAY_VAR) else {
        return query_vars;
    };
    if query_vars.get(EVENT_DISPLAY_VAR).map(String::as_str) != Some("default") {
        return query_vars;
    }

    query_vars.insert(EVENT_DISPLAY_VAR.to_string(), requested.clone());
    query_vars
}
