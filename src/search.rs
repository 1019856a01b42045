//! Profile-driven store search.
//!
//! Instead of one scraper type per store, a single [`SiteSearcher`]
//! consumes [`SiteProfile`] data: search endpoint, query parameter and the
//! ordered result selectors with their presentation bonuses. New stores
//! are config entries, not code.

use crate::catalog::CatalogEntry;
use crate::config::MatchingConfig;
use crate::error::SearchError;
use crate::export::{BatchReport, SearchRecord};
use crate::fetch::{FetchConfig, create_http_client, fetch_html, rate_limit};
use crate::matcher::{Candidate, ScoredCandidate, best_match};
use crate::query::plan_queries;
use crate::urlcheck::{is_valid_book_url, normalize_book_url};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Links evaluated per selector rule. Result pages list hundreds of
/// titles; only the top of each rule's match list is worth scoring.
const MAX_CANDIDATES_PER_RULE: usize = 20;

/// One CSS selector for result links, with its presentation bonus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorRule {
    /// CSS selector matching anchor elements on the results page.
    pub selector: String,

    /// Score bonus for candidates found through this rule, e.g. for link
    /// shapes that usually point at product detail pages.
    #[serde(default)]
    pub bonus: f64,
}

/// Declarative description of one store's search surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Display name, e.g. `BOOK☆WALKER`.
    pub name: String,

    /// Site root, used to resolve relative result links.
    pub base_url: String,

    /// Search endpoint URL.
    pub search_url: String,

    /// Name of the search endpoint's query parameter.
    pub query_param: String,

    /// Per-site override of the acceptance floor.
    ///
    /// Declared before `selectors` so TOML serialization keeps scalar
    /// values ahead of the table array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_floor: Option<f64>,

    /// Result link selectors, in priority order.
    pub selectors: Vec<SelectorRule>,
}

/// A source of purchase-link candidates for a query.
///
/// The seam between the matching pipeline and the network: production code
/// uses [`SiteSearcher`], tests substitute a canned source.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Per-source acceptance floor override.
    fn accept_floor(&self) -> Option<f64> {
        None
    }

    /// Runs one search query and returns the scraped candidates.
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, SearchError>;
}

/// HTTP-backed candidate source for one configured store.
pub struct SiteSearcher {
    client: reqwest::Client,
    profile: SiteProfile,
    fetch: FetchConfig,
}

impl SiteSearcher {
    /// Creates a searcher for the given store profile.
    pub fn new(profile: SiteProfile, fetch: FetchConfig) -> Result<Self, SearchError> {
        let client = create_http_client().map_err(SearchError::HttpError)?;
        Ok(Self {
            client,
            profile,
            fetch,
        })
    }

    /// Extracts deduplicated candidates from a results page, walking the
    /// profile's selector rules in priority order.
    fn extract_candidates(&self, doc: &Html) -> Result<Vec<Candidate>, SearchError> {
        let mut candidates = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();

        for rule in &self.profile.selectors {
            let selector =
                Selector::parse(&rule.selector).map_err(|e| SearchError::InvalidSelector {
                    selector: rule.selector.clone(),
                    message: e.to_string(),
                })?;

            for element in doc.select(&selector).take(MAX_CANDIDATES_PER_RULE) {
                let Some(href) = element.value().attr("href") else {
                    continue;
                };
                let title = element.text().collect::<String>().trim().to_string();
                if title.is_empty() {
                    continue;
                }

                let url = normalize_book_url(href, Some(&self.profile.base_url));
                if !is_valid_book_url(&url, None) {
                    continue;
                }
                if !seen_urls.insert(url.clone()) {
                    continue;
                }

                candidates.push(Candidate::new(title, url).with_bonus(rule.bonus));
            }
        }

        debug!(site = %self.profile.name, count = candidates.len(), "extracted candidates");
        Ok(candidates)
    }
}

#[async_trait]
impl CandidateSource for SiteSearcher {
    fn name(&self) -> &str {
        &self.profile.name
    }

    fn accept_floor(&self) -> Option<f64> {
        self.profile.accept_floor
    }

    async fn search(&self, query: &str) -> Result<Vec<Candidate>, SearchError> {
        rate_limit(self.fetch.delay_between_requests_sec).await;

        let doc = fetch_html(
            &self.client,
            &self.profile.search_url,
            &[(self.profile.query_param.as_str(), query)],
            &self.fetch.retry,
        )
        .await?;

        self.extract_candidates(&doc)
    }
}

/// Searches one source for a purchase link matching `title`.
///
/// Planned queries run in order; a candidate at or above the match
/// threshold short-circuits, otherwise the best accepted candidate across
/// all queries wins. Per-query failures are logged and only surface when
/// every query failed.
pub async fn find_link(
    source: &dyn CandidateSource,
    title: &str,
    matching: &MatchingConfig,
) -> Result<Option<ScoredCandidate>, SearchError> {
    let accept_floor = source.accept_floor().unwrap_or(matching.accept_floor);
    let mut best: Option<ScoredCandidate> = None;
    let mut last_error: Option<SearchError> = None;
    let mut queries_succeeded = 0u32;

    for query in plan_queries(title, matching.max_queries) {
        let candidates = match source.search(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(site = source.name(), query = %query, error = %e, "query failed");
                last_error = Some(e);
                continue;
            }
        };
        queries_succeeded += 1;

        let Some(hit) = best_match(title, &candidates, accept_floor) else {
            continue;
        };

        if hit.score >= matching.match_threshold {
            debug!(site = source.name(), url = %hit.candidate.url, score = hit.score, "confident match");
            return Ok(Some(hit));
        }
        if best.as_ref().is_none_or(|b| hit.score > b.score) {
            best = Some(hit);
        }
    }

    if queries_succeeded == 0
        && let Some(e) = last_error
    {
        return Err(e);
    }

    Ok(best)
}

/// Searches every catalog entry against every source, sequentially, and
/// aggregates the outcomes into a report.
pub async fn search_catalog(
    sources: &[Box<dyn CandidateSource>],
    catalog: &[CatalogEntry],
    matching: &MatchingConfig,
) -> BatchReport {
    let mut report = BatchReport::new();

    for entry in catalog {
        for source in sources {
            let started = Instant::now();
            let outcome = find_link(source.as_ref(), &entry.title, matching).await;
            let elapsed = started.elapsed().as_secs_f64();

            let record = match outcome {
                Ok(Some(hit)) => {
                    info!(
                        n_code = %entry.n_code,
                        site = source.name(),
                        url = %hit.candidate.url,
                        score = hit.score,
                        "found purchase link"
                    );
                    SearchRecord::success(entry, source.name(), &hit, elapsed)
                }
                Ok(None) => {
                    info!(n_code = %entry.n_code, site = source.name(), "no match");
                    SearchRecord::not_found(entry, source.name(), elapsed)
                }
                Err(e) => {
                    warn!(n_code = %entry.n_code, site = source.name(), error = %e, "search failed");
                    SearchRecord::error(entry, source.name(), e.to_string(), elapsed)
                }
            };
            report.add_record(record);
        }
    }

    report.finalize();
    report
}
