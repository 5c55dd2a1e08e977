//! Binary response detection.
//!
//! Proxy responses travel inside a JSON document, so anything that is not
//! known to be text has to be base64-encoded.

use std::collections::HashSet;

use axum::http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use axum::http::HeaderMap;

/// Media types outside `text/*` that are still sent as plain text.
const TEXTUAL_TYPES: [&str; 4] = [
    "image/svg+xml",
    "application/json",
    "application/xml",
    "application/javascript",
];

/// Returns true if the response described by `headers` must be base64-encoded.
pub fn is_binary(headers: &HeaderMap) -> bool {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !is_text_mime(content_type) {
        return true;
    }

    headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|encoding| encoding.trim().eq_ignore_ascii_case("gzip"))
}

/// Returns true if `value` parses as a media type that represents text.
pub fn is_text_mime(value: &str) -> bool {
    match parse_media_type(value) {
        Some(media_type) => {
            media_type.starts_with("text/") || TEXTUAL_TYPES.contains(&media_type.as_str())
        }
        None => false,
    }
}

/// Parse a `Content-Type` value and return its lowercased `type/subtype`.
///
/// Returns `None` for an empty value, a malformed type, or a parameter that
/// is not `name=token` / `name="quoted"`, or a parameter name given twice
/// (case-insensitive). A trailing `;` is tolerated.
pub fn parse_media_type(value: &str) -> Option<String> {
    let (essence, params) = match value.split_once(';') {
        Some((essence, params)) => (essence, Some(params)),
        None => (value, None),
    };

    let essence = essence.trim().to_ascii_lowercase();
    let valid = match essence.split_once('/') {
        Some((kind, subtype)) => is_token(kind) && is_token(subtype),
        None => is_token(&essence),
    };
    if !valid {
        return None;
    }

    if let Some(params) = params {
        let segments = split_params(params)?;
        let last = segments.len().saturating_sub(1);
        let mut seen = HashSet::new();
        for (i, segment) in segments.iter().enumerate() {
            let segment = segment.trim();
            if segment.is_empty() && i == last {
                continue;
            }
            let (name, value) = segment.split_once('=')?;
            let name = name.trim();
            if !is_token(name) || !is_param_value(value.trim()) {
                return None;
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return None;
            }
        }
    }

    Some(essence)
}

/// Split on `;` outside quoted strings. `None` on an unterminated quote.
fn split_params(params: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in params.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_quotes {
        return None;
    }
    segments.push(&params[start..]);
    Some(segments)
}

fn is_param_value(value: &str) -> bool {
    if let Some(inner) = value.strip_prefix('"') {
        return inner.ends_with('"') && !inner.is_empty();
    }
    is_token(value)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

fn is_token_char(c: char) -> bool {
    c.is_ascii() && !c.is_ascii_control() && c != ' ' && !"()<>@,;:\\\"/[]?=".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: Option<&str>, encoding: Option<&str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(ct) = content_type {
            h.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        }
        if let Some(enc) = encoding {
            h.insert(CONTENT_ENCODING, HeaderValue::from_str(enc).unwrap());
        }
        h
    }

    #[test]
    fn test_textual_types() {
        assert!(!is_binary(&headers(Some("application/json"), None)));
        assert!(!is_binary(&headers(Some("text/html"), None)));
        assert!(!is_binary(&headers(Some("text/plain; charset=utf8"), None)));
        assert!(!is_binary(&headers(Some("image/svg+xml"), None)));
        assert!(!is_binary(&headers(Some("application/xml"), None)));
        assert!(!is_binary(&headers(Some("Application/JavaScript"), None)));
    }

    #[test]
    fn test_binary_types() {
        assert!(is_binary(&headers(Some("image/png"), None)));
        assert!(is_binary(&headers(Some("application/octet-stream"), None)));
        assert!(is_binary(&headers(Some("application/pdf"), None)));
    }

    #[test]
    fn test_gzip_forces_binary() {
        assert!(is_binary(&headers(Some("application/json"), Some("gzip"))));
        assert!(is_binary(&headers(Some("text/html"), Some("gzip"))));
        assert!(!is_binary(&headers(Some("text/html"), Some("identity"))));
    }

    #[test]
    fn test_unparseable_is_binary() {
        assert!(is_binary(&headers(None, None)));
        assert!(is_binary(&headers(Some(""), None)));
        assert!(is_binary(&headers(Some("text/"), None)));
        assert!(is_binary(&headers(Some("text/html; charset"), None)));
        assert!(is_binary(&headers(Some("text/html; a=\"open"), None)));
    }

    #[test]
    fn test_repeated_parameter_is_binary() {
        assert_eq!(parse_media_type("text/html; charset=a; charset=b"), None);
        assert_eq!(parse_media_type("text/html; charset=a; Charset=b"), None);
        assert!(is_binary(&headers(Some("text/html; charset=a; charset=b"), None)));
        assert!(!is_binary(&headers(Some("text/html; charset=a; q=b"), None)));
    }

    #[test]
    fn test_parse_media_type() {
        assert_eq!(
            parse_media_type("Text/HTML; charset=\"utf-8\"").as_deref(),
            Some("text/html")
        );
        assert_eq!(parse_media_type("text/plain;").as_deref(), Some("text/plain"));
        assert_eq!(parse_media_type("text").as_deref(), Some("text"));
        assert_eq!(parse_media_type("a b/c"), None);
    }
}
