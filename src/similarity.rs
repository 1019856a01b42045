//! Similarity scoring between a catalog title and a scraped candidate.
//!
//! The score is a heuristic, not a metric: containment is judged
//! asymmetrically and the word-overlap rule clamps into its own band. The
//! constants below are the single source of truth for every threshold the
//! original call sites hard-coded inconsistently.

use crate::normalize::normalize;
use std::collections::HashSet;
use strsim::normalized_levenshtein;

/// Score for an exact match after normalization.
pub const EXACT_SCORE: f64 = 1.0;

/// Score when the normalized query is contained in the candidate.
pub const QUERY_IN_CANDIDATE_SCORE: f64 = 0.9;

/// Score when the normalized candidate is contained in the query.
pub const CANDIDATE_IN_QUERY_SCORE: f64 = 0.85;

/// Default threshold for [`is_title_match`].
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.85;

/// Minimum Jaccard index for the word-overlap rule to apply.
const WORD_OVERLAP_MIN_JACCARD: f64 = 0.15;

/// Clamp band for word-overlap scores.
const WORD_SCORE_FLOOR: f64 = 0.3;
const WORD_SCORE_CEIL: f64 = 0.8;

/// Blend weights for the word-overlap rule.
const JACCARD_WEIGHT: f64 = 1.2;
const COMMON_RATIO_WEIGHT: f64 = 0.8;

/// Titles longer than this (in chars) get an edit-distance floor, so one
/// long unrelated string can't swamp every other signal.
const LONG_TITLE_CHARS: usize = 20;
const LONG_TITLE_FLOOR: f64 = 0.15;

/// Estimates how likely `candidate` refers to the same work as `query`.
///
/// Rules apply in order: exact normalized match, containment in either
/// direction, word-set overlap (both sides need at least two tokens), and
/// finally normalized Levenshtein similarity.
pub fn similarity_score(query: &str, candidate: &str) -> f64 {
    let query_norm = normalize(query);
    let candidate_norm = normalize(candidate);

    if query_norm == candidate_norm {
        return EXACT_SCORE;
    }
    if query_norm.is_empty() || candidate_norm.is_empty() {
        return 0.0;
    }
    if candidate_norm.contains(&query_norm) {
        return QUERY_IN_CANDIDATE_SCORE;
    }
    if query_norm.contains(&candidate_norm) {
        return CANDIDATE_IN_QUERY_SCORE;
    }

    if let Some(score) = word_overlap_score(&query_norm, &candidate_norm) {
        return score;
    }

    edit_distance_score(&query_norm, &candidate_norm)
}

/// Checks whether a candidate clears the match threshold.
pub fn is_title_match(expected: &str, actual: &str, threshold: f64) -> bool {
    similarity_score(expected, actual) >= threshold
}

fn word_overlap_score(query_norm: &str, candidate_norm: &str) -> Option<f64> {
    let query_words: HashSet<&str> = query_norm.split_whitespace().collect();
    let candidate_words: HashSet<&str> = candidate_norm.split_whitespace().collect();

    if query_words.len() < 2 || candidate_words.len() < 2 {
        return None;
    }

    let common = query_words.intersection(&candidate_words).count() as f64;
    let union = query_words.union(&candidate_words).count() as f64;
    let jaccard = common / union;
    if jaccard <= WORD_OVERLAP_MIN_JACCARD {
        return None;
    }

    let smaller = query_words.len().min(candidate_words.len()) as f64;
    let common_ratio = common / smaller;
    let blended = (jaccard * JACCARD_WEIGHT).max(common_ratio * COMMON_RATIO_WEIGHT);

    Some(blended.clamp(WORD_SCORE_FLOOR, WORD_SCORE_CEIL))
}

fn edit_distance_score(query_norm: &str, candidate_norm: &str) -> f64 {
    let similarity = normalized_levenshtein(query_norm, candidate_norm);
    let longest = query_norm
        .chars()
        .count()
        .max(candidate_norm.chars().count());

    if longest > LONG_TITLE_CHARS {
        similarity.max(LONG_TITLE_FLOOR)
    } else {
        similarity.max(0.0)
    }
}
