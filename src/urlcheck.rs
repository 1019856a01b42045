//! URL validation and cleanup for scraped purchase links.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Substrings that mark a link as navigation glue rather than a page.
const INVALID_URL_MARKERS: &[&str] = &["javascript:", "mailto:", "#", "void(0)"];

/// Query parameters stripped from stored links.
const TRACKING_PARAMS: &[&str] = &["utm_source", "utm_medium", "utm_campaign", "ref", "affiliate"];

/// Default book-id patterns, covering the common store URL shapes.
static BOOK_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"/book/(\d+)",
        r"/product/(\d+)",
        r"/item/(\d+)",
        r"id=(\d+)",
        r"/(\d+)/?$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Checks whether a URL plausibly points at a book page.
///
/// Requires an http(s) scheme, optionally requires the host to contain
/// `expected_domain`, and rejects script/mail/fragment pseudo-links.
pub fn is_valid_book_url(url: &str, expected_domain: Option<&str>) -> bool {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return false;
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return false;
    }

    if let Some(domain) = expected_domain {
        let Ok(parsed) = Url::parse(trimmed) else {
            return false;
        };
        if !parsed.host_str().is_some_and(|host| host.contains(domain)) {
            return false;
        }
    }

    let lowered = trimmed.to_lowercase();
    !INVALID_URL_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Resolves a link against its site base and strips tracking parameters.
///
/// Unparseable inputs are handed back after base resolution only.
pub fn normalize_book_url(link: &str, base_url: Option<&str>) -> String {
    if link.is_empty() {
        return String::new();
    }

    let mut absolute = link.trim().to_string();
    if absolute.starts_with('/')
        && let Some(base) = base_url
    {
        absolute = format!("{}{}", base.trim_end_matches('/'), absolute);
    }

    let Ok(mut parsed) = Url::parse(&absolute) else {
        return absolute;
    };

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&kept)
            .finish();
        parsed.set_query(Some(&query));
    }

    parsed.to_string()
}

/// Extracts a numeric book id from a URL.
///
/// With no explicit pattern, the default store URL shapes are tried in
/// order. A supplied pattern must capture the id in group 1.
pub fn extract_book_id(url: &str, pattern: Option<&Regex>) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    if let Some(re) = pattern {
        return re
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
    }

    BOOK_ID_PATTERNS.iter().find_map(|re| {
        re.captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_book_url() {
        assert!(is_valid_book_url("https://bookwalker.jp/de123456/", None));
        assert!(is_valid_book_url(
            "https://bookwalker.jp/de123456/",
            Some("bookwalker.jp")
        ));
    }

    #[test]
    fn test_invalid_book_urls() {
        assert!(!is_valid_book_url("", None));
        assert!(!is_valid_book_url("  ", None));
        assert!(!is_valid_book_url("/relative/path", None));
        assert!(!is_valid_book_url("javascript:void(0)", None));
        assert!(!is_valid_book_url("https://example.com/#section", None));
        assert!(!is_valid_book_url(
            "https://example.com/book",
            Some("bookwalker.jp")
        ));
    }

    #[test]
    fn test_normalize_resolves_relative_links() {
        assert_eq!(
            normalize_book_url("/de123456/", Some("https://bookwalker.jp")),
            "https://bookwalker.jp/de123456/"
        );
        assert_eq!(
            normalize_book_url("https://other.jp/x", Some("https://bookwalker.jp")),
            "https://other.jp/x"
        );
    }

    #[test]
    fn test_normalize_strips_tracking_params() {
        let cleaned = normalize_book_url(
            "https://example.jp/book?id=42&utm_source=mail&ref=top",
            None,
        );
        assert_eq!(cleaned, "https://example.jp/book?id=42");

        let no_query = normalize_book_url("https://example.jp/book?utm_source=mail", None);
        assert_eq!(no_query, "https://example.jp/book");
    }

    #[test]
    fn test_extract_book_id_defaults() {
        assert_eq!(
            extract_book_id("https://example.jp/book/123456", None),
            Some("123456".to_string())
        );
        assert_eq!(
            extract_book_id("https://example.jp/store?id=789", None),
            Some("789".to_string())
        );
        assert_eq!(extract_book_id("https://example.jp/about", None), None);
    }

    #[test]
    fn test_extract_book_id_custom_pattern() {
        let pattern = Regex::new(r"/de(\d+)").unwrap();
        assert_eq!(
            extract_book_id("https://bookwalker.jp/de123456/", Some(&pattern)),
            Some("123456".to_string())
        );
    }
}
