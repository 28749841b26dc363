//! Recognizes YouTube watch and shorts URLs.

use url::Url;

use crate::types::errors::HistoryError;

/// Returns true for `http(s)://[*.]youtube.com/watch?v=<id>` and
/// `http(s)://[*.]youtube.com/shorts/<id>`.
pub fn is_watch_url(raw: &str) -> bool {
    let Ok(parsed) = Url::parse(raw.trim()) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    if host != "youtube.com" && !host.ends_with(".youtube.com") {
        return false;
    }

    let path = parsed.path();
    if path == "/watch" || path == "/watch/" {
        return parsed.query_pairs().any(|(k, v)| k == "v" && !v.is_empty());
    }
    match path.strip_prefix("/shorts/") {
        Some(id) => !id.trim_matches('/').is_empty(),
        None => false,
    }
}

/// Trims `raw` and checks it is a watch or shorts URL.
pub fn validate_watch_url(raw: &str) -> Result<String, HistoryError> {
    let trimmed = raw.trim();
    if is_watch_url(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(HistoryError::InvalidUrl(trimmed.to_string()))
    }
}
