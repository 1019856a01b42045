//! Search-query planning.
//!
//! Store search engines disagree about volume notation and choke on long
//! titles, so each catalog title is expanded into a short, ordered list of
//! queries: the normalized title first, then recall-widening fallbacks.

use crate::normalize::normalize;
use crate::volume::create_volume_variants;
use regex::Regex;
use std::sync::LazyLock;

/// Default cap on queries generated per title.
pub const DEFAULT_QUERY_LIMIT: usize = 4;

/// Titles longer than this get an extra leading-words query.
const LONG_TITLE_CHARS: usize = 10;

/// Series names shorter than this are too generic to search on their own.
const MIN_SERIES_CHARS: usize = 5;

/// How many volume variants to fold into the query plan.
const VARIANT_QUERIES: usize = 2;

/// Patterns removed when reducing a title to its series name. Broader than
/// the volume markers: also covers 上/中/下 splits, 前編/後編/完結編 and
/// bracketed annotations.
static SERIES_NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"[①-⑳]",
        r"第\d+巻",
        r"\d+巻",
        r"[（(]\d+[)）]",
        r"[上中下]",
        r"前編|後編|完結編",
        r"【[^】]*】",
        r"(?i)vol\.?\s*\d+",
        r"(?i)volume\s*\d+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Plans the ordered search queries for a catalog title.
pub fn plan_queries(title: &str, limit: usize) -> Vec<String> {
    let mut queries: Vec<String> = Vec::new();
    if title.is_empty() || limit == 0 {
        return queries;
    }

    let base = normalize(title);
    push_unique(&mut queries, base.clone());

    // Long titles get a leading-words query; search engines often truncate.
    if base.chars().count() > LONG_TITLE_CHARS {
        let words: Vec<&str> = base.split_whitespace().collect();
        if words.len() >= 2 {
            push_unique(&mut queries, words[..2].join(" "));
        }
    }

    for variant in create_volume_variants(title).into_iter().take(VARIANT_QUERIES) {
        push_unique(&mut queries, variant);
    }

    let series = extract_series_name(title);
    if series != title && series.chars().count() > MIN_SERIES_CHARS {
        push_unique(&mut queries, series);
    }

    queries.truncate(limit);
    queries
}

/// Wraps the planned queries in a `site:` operator for engine-side search.
pub fn site_queries(title: &str, site_domain: &str, limit: usize) -> Vec<String> {
    plan_queries(title, limit)
        .into_iter()
        .map(|query| format!("site:{site_domain} \"{query}\""))
        .collect()
}

/// Combines the planned queries with an author name.
pub fn author_queries(title: &str, author: &str, limit: usize) -> Vec<String> {
    if title.is_empty() || author.is_empty() {
        return Vec::new();
    }
    plan_queries(title, limit)
        .into_iter()
        .map(|query| format!("{query} {author}"))
        .collect()
}

/// Reduces a title to its series name by removing installment markers and
/// annotations. Falls back to the input when everything would be removed.
pub fn extract_series_name(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }

    let mut series = title.to_string();
    for pattern in SERIES_NOISE.iter() {
        series = pattern.replace_all(&series, "").trim().to_string();
    }

    if series.is_empty() {
        title.to_string()
    } else {
        series
    }
}

fn push_unique(queries: &mut Vec<String>, query: String) {
    if !query.trim().is_empty() && !queries.contains(&query) {
        queries.push(query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_queries_empty_title() {
        assert!(plan_queries("", DEFAULT_QUERY_LIMIT).is_empty());
    }

    #[test]
    fn test_plan_queries_base_first() {
        let queries = plan_queries("タイトル④", DEFAULT_QUERY_LIMIT);
        assert_eq!(queries[0], "タイトル4");
        assert!(queries.len() <= DEFAULT_QUERY_LIMIT);
    }

    #[test]
    fn test_plan_queries_deduplicated() {
        let queries = plan_queries("課長が目覚めたら異世界SF艦隊の提督になってた件です①", 6);
        for (i, q) in queries.iter().enumerate() {
            assert!(!queries[..i].contains(q), "duplicate query {q:?}");
        }
    }

    #[test]
    fn test_plan_queries_leading_words_for_long_titles() {
        let queries = plan_queries("word1 word2 word3 word4 extra", 6);
        assert!(queries.contains(&"word1 word2".to_string()));
    }

    #[test]
    fn test_site_queries_format() {
        let queries = site_queries("タイトル④", "bookwalker.jp", 2);
        assert!(!queries.is_empty());
        assert!(queries[0].starts_with("site:bookwalker.jp \""));
        assert!(queries[0].ends_with('"'));
    }

    #[test]
    fn test_author_queries() {
        let queries = author_queries("タイトル④", "著者名", 2);
        assert!(queries.iter().all(|q| q.ends_with(" 著者名")));
        assert!(author_queries("タイトル④", "", 2).is_empty());
    }

    #[test]
    fn test_extract_series_name() {
        assert_eq!(
            extract_series_name("課長が目覚めたら異世界SF艦隊の提督になってた件です①"),
            "課長が目覚めたら異世界SF艦隊の提督になってた件です"
        );
        assert_eq!(extract_series_name("シリーズ名 第3巻"), "シリーズ名");
        assert_eq!(extract_series_name("【新装版】シリーズ名 後編"), "シリーズ名");
    }

    #[test]
    fn test_extract_series_name_falls_back_to_title() {
        assert_eq!(extract_series_name("上"), "上");
    }
}
