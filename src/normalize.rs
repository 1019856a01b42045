//! Title normalization for cross-site comparison.
//!
//! Retail sites render the same work with different width forms, bracket
//! annotations and spacing. Everything that compares titles goes through
//! [`normalize`] first so those renderings collapse to one canonical form.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Bracket characters stripped from titles before comparison.
const STRIPPED_BRACKETS: &[char] = &[
    '【', '】', '[', ']', '（', '）', '(', ')', '「', '」', '『', '』', '《', '》', '〈', '〉',
];

/// Matches runs of whitespace, including ideographic spaces left by NFKC.
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Produces the canonical comparable form of a title.
///
/// Applies Unicode NFKC normalization (folding full-width alphanumerics and
/// circled digits toward their base forms), strips bracket characters,
/// collapses whitespace runs to a single space, trims, and lowercases.
/// Total over arbitrary strings and idempotent.
pub fn normalize(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }

    let folded: String = title.nfkc().collect();
    let stripped: String = folded
        .chars()
        .filter(|c| !STRIPPED_BRACKETS.contains(c))
        .collect();
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");

    collapsed.trim().to_lowercase()
}

/// Japanese-specialized normalization.
///
/// On top of [`normalize`], folds long-vowel mark look-alikes (minus sign,
/// horizontal bar, hyphen) into the katakana-hiragana prolonged sound mark,
/// which search engines on Japanese storefronts treat interchangeably.
pub fn normalize_ja(title: &str) -> String {
    normalize(title)
        .chars()
        .map(|c| match c {
            '−' | '―' | '‐' => 'ー',
            other => other,
        })
        .collect()
}
