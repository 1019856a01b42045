//! Ranking of scraped result-page candidates against a catalog title.

use crate::similarity::similarity_score;
use tracing::debug;

/// Result-page navigation labels that are never book titles.
const JUNK_TITLES: &[&str] = &["詳細", "more", "続きを読む", "見る"];

/// Link texts shorter than this are navigation chrome, not titles.
const MIN_TITLE_CHARS: usize = 3;

/// Default minimum score for a candidate to be considered at all.
pub const DEFAULT_ACCEPT_FLOOR: f64 = 0.2;

/// A purchase-link candidate scraped from a search results page.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Link text as shown on the results page.
    pub title: String,
    /// Absolute URL of the linked page.
    pub url: String,
    /// Presentation-layer bonus supplied by the caller, e.g. for a link
    /// shape that usually points at a product detail page. Added on top of
    /// the similarity score, which stays free of URL heuristics.
    pub bonus: f64,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            bonus: 0.0,
        }
    }

    pub fn with_bonus(mut self, bonus: f64) -> Self {
        self.bonus = bonus;
        self
    }
}

/// A candidate together with its final score.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

/// Scores every plausible candidate against the query, highest first.
///
/// Junk candidates (navigation labels, near-empty link texts) are dropped
/// before scoring.
pub fn rank_candidates(query: &str, candidates: &[Candidate]) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter(|c| !is_junk_title(&c.title))
        .map(|c| {
            let score = similarity_score(query, &c.title) + c.bonus;
            debug!(title = %c.title, url = %c.url, score, "scored candidate");
            ScoredCandidate {
                candidate: c.clone(),
                score,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}

/// Picks the best-scoring candidate at or above `accept_floor`.
pub fn best_match(query: &str, candidates: &[Candidate], accept_floor: f64) -> Option<ScoredCandidate> {
    rank_candidates(query, candidates)
        .into_iter()
        .find(|scored| scored.score >= accept_floor)
}

fn is_junk_title(title: &str) -> bool {
    let trimmed = title.trim();
    if trimmed.chars().count() < MIN_TITLE_CHARS {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    JUNK_TITLES.contains(&lowered.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate::new("全く関係ない本", "https://example.jp/de/1"),
            Candidate::new("シリーズ名 第3巻", "https://example.jp/de/2"),
            Candidate::new("詳細", "https://example.jp/nav"),
            Candidate::new("シリーズ名③", "https://example.jp/de/3"),
        ]
    }

    #[test]
    fn test_rank_orders_by_score() {
        let ranked = rank_candidates("シリーズ名 第3巻", &candidates());
        assert_eq!(ranked[0].candidate.url, "https://example.jp/de/2");
        assert_eq!(ranked[0].score, 1.0);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_junk_titles_filtered() {
        let ranked = rank_candidates("シリーズ名 第3巻", &candidates());
        assert!(ranked.iter().all(|s| s.candidate.title != "詳細"));

        let short = vec![Candidate::new("見る", "https://example.jp/x")];
        assert!(rank_candidates("anything", &short).is_empty());
    }

    #[test]
    fn test_bonus_breaks_ties() {
        let pair = vec![
            Candidate::new("シリーズ名 第3巻", "https://example.jp/series/1"),
            Candidate::new("シリーズ名 第3巻", "https://example.jp/de/1").with_bonus(0.1),
        ];
        let ranked = rank_candidates("シリーズ名 第3巻", &pair);
        assert_eq!(ranked[0].candidate.url, "https://example.jp/de/1");
    }

    #[test]
    fn test_best_match_honors_floor() {
        let unrelated = vec![Candidate::new("全く関係ない本", "https://example.jp/de/1")];
        let query = "課長が目覚めたら異世界SF艦隊の提督になってた件です①";
        assert!(best_match(query, &unrelated, DEFAULT_ACCEPT_FLOOR).is_none());

        let related = candidates();
        let hit = best_match("シリーズ名 第3巻", &related, DEFAULT_ACCEPT_FLOOR).unwrap();
        assert_eq!(hit.candidate.url, "https://example.jp/de/2");
    }
}
