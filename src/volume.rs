//! Volume-number detection and variant rendering.
//!
//! Japanese e-book listings encode the installment number in many shapes
//! (④, 第4巻, (4), vol.4, a trailing digit). This module extracts the
//! number, strips the marker to recover the bare series name, and renders
//! the marker back out in each shape to widen search recall.

use regex::Regex;
use std::sync::LazyLock;

/// Circled digits ①..⑳, indexed by volume number minus one.
const CIRCLED_DIGITS: [char; 20] = [
    '①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩', '⑪', '⑫', '⑬', '⑭', '⑮', '⑯',
    '⑰', '⑱', '⑲', '⑳',
];

/// Full-width digits ０..９, indexed by digit value.
const FULLWIDTH_DIGITS: [char; 10] =
    ['０', '１', '２', '３', '４', '５', '６', '７', '８', '９'];

// Extraction patterns, tried in order. The kanji form must win over the
// parenthesis and trailing-digit forms when a title matches several.
static KANJI_VOLUME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"第(\d+)巻").unwrap());
static PLAIN_VOLUME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)巻").unwrap());
static PAREN_VOLUME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[（(](\d+)[)）]").unwrap());
static VOL_ABBREV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)vol\.?\s*(\d+)").unwrap());
static VOL_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)volume\s*(\d+)").unwrap());
static TRAILING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*$").unwrap());

// Marker-removal patterns used to recover the bare series name.
static STRIP_ANY_KANJI_VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第?\d+巻").unwrap());
static STRIP_PAREN_VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[（(]\d+[)）]").unwrap());
static STRIP_VOL_ABBREV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vol\.?\s*\d+").unwrap());
static STRIP_VOL_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)volume\s*\d+").unwrap());
static STRIP_TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+\s*$").unwrap());

/// Target notation for [`normalize_volume_notation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeFormat {
    /// Circled digit, e.g. ④. Only exists for volumes 1 through 20.
    Circled,
    /// Space-separated arabic numeral, e.g. `タイトル 4`.
    Arabic,
    /// Kanji volume phrase, e.g. `タイトル 第4巻`.
    Kanji,
    /// Parenthesized numeral, e.g. `タイトル(4)`.
    Paren,
}

impl VolumeFormat {
    /// All formats, in the order variants are generated.
    pub const ALL: [VolumeFormat; 4] = [
        VolumeFormat::Circled,
        VolumeFormat::Arabic,
        VolumeFormat::Kanji,
        VolumeFormat::Paren,
    ];
}

/// Extracts the volume number encoded in a title, if any.
///
/// Patterns are tried first-match-wins: 第N巻, N巻, a circled digit,
/// (N), vol.N, volume N, then a bare trailing integer. Full-width digits
/// count as digits.
pub fn extract_volume_number(title: &str) -> Option<u32> {
    if title.is_empty() {
        return None;
    }

    for pattern in [&*KANJI_VOLUME, &*PLAIN_VOLUME] {
        if let Some(caps) = pattern.captures(title)
            && let Some(volume) = parse_digits(&caps[1])
        {
            return Some(volume);
        }
    }

    if let Some(volume) = title.chars().find_map(circled_digit_value) {
        return Some(volume);
    }

    for pattern in [&*PAREN_VOLUME, &*VOL_ABBREV, &*VOL_WORD, &*TRAILING_NUMBER] {
        if let Some(caps) = pattern.captures(title)
            && let Some(volume) = parse_digits(&caps[1])
        {
            return Some(volume);
        }
    }

    None
}

/// Removes every recognized volume marker, yielding the bare series name.
pub fn strip_volume_markers(title: &str) -> String {
    let mut cleaned: String = title
        .chars()
        .filter(|c| !CIRCLED_DIGITS.contains(c))
        .collect();

    for pattern in [
        &*STRIP_ANY_KANJI_VOLUME,
        &*STRIP_PAREN_VOLUME,
        &*STRIP_VOL_ABBREV,
        &*STRIP_VOL_WORD,
        &*STRIP_TRAILING_NUMBER,
    ] {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }

    cleaned.trim().to_string()
}

/// Re-renders a title's volume marker in the requested notation.
///
/// Titles without a detectable volume are returned unchanged. Circled
/// digits only exist for volumes 1-20; requesting `Circled` outside that
/// range yields the bare series name.
pub fn normalize_volume_notation(title: &str, format: VolumeFormat) -> String {
    if title.is_empty() {
        return String::new();
    }

    let Some(volume) = extract_volume_number(title) else {
        return title.to_string();
    };

    render_volume(&strip_volume_markers(title), volume, format)
}

/// Generates alternate volume-notation renderings of a title.
///
/// Titles without a detectable volume come back as a single-element list
/// containing the input. Otherwise the list holds the four
/// [`VolumeFormat`] renderings, a digit-with-no-space form, and (for
/// volumes 0-9) a full-width-digit form, de-duplicated in insertion order.
pub fn create_volume_variants(title: &str) -> Vec<String> {
    let Some(volume) = extract_volume_number(title) else {
        return vec![title.to_string()];
    };

    let series = strip_volume_markers(title);
    let mut variants: Vec<String> = Vec::new();

    for format in VolumeFormat::ALL {
        push_unique(&mut variants, render_volume(&series, volume, format));
    }

    push_unique(&mut variants, format!("{series}{volume}"));

    if let Some(digit) = fullwidth_digit(volume) {
        push_unique(&mut variants, format!("{series}{digit}"));
    }

    variants
}

fn render_volume(series: &str, volume: u32, format: VolumeFormat) -> String {
    match format {
        VolumeFormat::Circled => match circled_digit(volume) {
            Some(digit) => format!("{series}{digit}"),
            None => series.to_string(),
        },
        VolumeFormat::Arabic => format!("{series} {volume}"),
        VolumeFormat::Kanji => format!("{series} 第{volume}巻"),
        VolumeFormat::Paren => format!("{series}({volume})"),
    }
}

fn circled_digit(volume: u32) -> Option<char> {
    (1..=20)
        .contains(&volume)
        .then(|| CIRCLED_DIGITS[(volume - 1) as usize])
}

fn circled_digit_value(c: char) -> Option<u32> {
    CIRCLED_DIGITS
        .iter()
        .position(|&digit| digit == c)
        .map(|index| index as u32 + 1)
}

fn fullwidth_digit(volume: u32) -> Option<char> {
    (volume <= 9).then(|| FULLWIDTH_DIGITS[volume as usize])
}

/// Parses a digit run that may mix ASCII and full-width digits.
fn parse_digits(digits: &str) -> Option<u32> {
    let mut value: u32 = 0;
    for c in digits.chars() {
        let digit = c.to_digit(10).or_else(|| {
            FULLWIDTH_DIGITS
                .iter()
                .position(|&d| d == c)
                .map(|i| i as u32)
        })?;
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    Some(value)
}

fn push_unique(variants: &mut Vec<String>, variant: String) {
    if !variants.contains(&variant) {
        variants.push(variant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_circled_digit() {
        assert_eq!(extract_volume_number("エアボーンウイッチ④"), Some(4));
        assert_eq!(extract_volume_number("タイトル⑳"), Some(20));
    }

    #[test]
    fn test_extract_no_marker() {
        assert_eq!(extract_volume_number("この素晴らしい世界に祝福を！"), None);
        assert_eq!(extract_volume_number(""), None);
    }

    #[test]
    fn test_extract_kanji_forms() {
        assert_eq!(extract_volume_number("シリーズ名 第3巻"), Some(3));
        assert_eq!(extract_volume_number("シリーズ名5巻"), Some(5));
    }

    #[test]
    fn test_extract_paren_and_vol_forms() {
        assert_eq!(extract_volume_number("タイトル(7)"), Some(7));
        assert_eq!(extract_volume_number("タイトル（１２）"), Some(12));
        assert_eq!(extract_volume_number("Title vol.2"), Some(2));
        assert_eq!(extract_volume_number("Title VOL 8"), Some(8));
        assert_eq!(extract_volume_number("Title Volume 11"), Some(11));
    }

    #[test]
    fn test_extract_trailing_number() {
        assert_eq!(extract_volume_number("タイトル 3"), Some(3));
        assert_eq!(extract_volume_number("タイトル３"), Some(3));
    }

    #[test]
    fn test_kanji_form_wins_over_trailing() {
        // 第2巻 and the trailing 9 both match; pattern order decides
        assert_eq!(extract_volume_number("第2巻 特典9"), Some(2));
    }

    #[test]
    fn test_strip_volume_markers() {
        assert_eq!(strip_volume_markers("シリーズ名 第3巻"), "シリーズ名");
        assert_eq!(strip_volume_markers("タイトル④"), "タイトル");
        assert_eq!(strip_volume_markers("Title vol.2"), "Title");
        assert_eq!(strip_volume_markers("タイトル(7)"), "タイトル");
    }

    #[test]
    fn test_normalize_volume_notation_formats() {
        let title = "シリーズ名 第3巻";
        assert_eq!(
            normalize_volume_notation(title, VolumeFormat::Circled),
            "シリーズ名③"
        );
        assert_eq!(
            normalize_volume_notation(title, VolumeFormat::Arabic),
            "シリーズ名 3"
        );
        assert_eq!(
            normalize_volume_notation(title, VolumeFormat::Kanji),
            "シリーズ名 第3巻"
        );
        assert_eq!(
            normalize_volume_notation(title, VolumeFormat::Paren),
            "シリーズ名(3)"
        );
    }

    #[test]
    fn test_normalize_volume_notation_without_marker() {
        assert_eq!(
            normalize_volume_notation("この素晴らしい世界に祝福を！", VolumeFormat::Circled),
            "この素晴らしい世界に祝福を！"
        );
    }

    #[test]
    fn test_circled_out_of_range_yields_series_name() {
        assert_eq!(
            normalize_volume_notation("シリーズ名 第21巻", VolumeFormat::Circled),
            "シリーズ名"
        );
    }

    #[test]
    fn test_volume_round_trip() {
        let titles = [
            "課長が目覚めたら異世界SF艦隊の提督になってた件です①",
            "シリーズ名 第3巻",
            "タイトル(12)",
            "Title vol.7",
        ];
        for title in titles {
            let volume = extract_volume_number(title).unwrap();
            for format in VolumeFormat::ALL {
                let rendered = normalize_volume_notation(title, format);
                assert_eq!(
                    extract_volume_number(&rendered),
                    Some(volume),
                    "round trip failed for {title:?} via {format:?}"
                );
            }
        }
    }

    #[test]
    fn test_create_volume_variants_shape() {
        let title = "課長が目覚めたら異世界SF艦隊の提督になってた件です①";
        let variants = create_volume_variants(title);

        assert!(variants.contains(&title.to_string()));
        assert!(variants.iter().any(|v| v.contains('1')));
        assert!(
            (3..=12).contains(&variants.len()),
            "unexpected variant count: {variants:?}"
        );

        // de-duplicated
        for (i, v) in variants.iter().enumerate() {
            assert!(!variants[..i].contains(v));
        }
    }

    #[test]
    fn test_create_volume_variants_fullwidth_form() {
        let variants = create_volume_variants("タイトル④");
        assert!(variants.contains(&"タイトル４".to_string()));
        assert!(variants.contains(&"タイトル4".to_string()));
    }

    #[test]
    fn test_create_volume_variants_without_marker() {
        let title = "この素晴らしい世界に祝福を！";
        assert_eq!(create_volume_variants(title), vec![title.to_string()]);
    }
}
