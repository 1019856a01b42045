//! Batch report model and JSON/CSV writers.
//!
//! Every (catalog entry, site) pair produces one [`SearchRecord`]; a
//! [`BatchReport`] aggregates them with per-status totals and an error
//! summary, and serializes to pretty JSON or quoted CSV.

use crate::catalog::CatalogEntry;
use crate::error::ExportError;
use crate::matcher::ScoredCandidate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Outcome of one (catalog entry, site) search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Success,
    NotFound,
    Error,
    Skipped,
}

impl SearchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchStatus::Success => "success",
            SearchStatus::NotFound => "not_found",
            SearchStatus::Error => "error",
            SearchStatus::Skipped => "skipped",
        }
    }
}

/// One search outcome, ready for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub n_code: String,
    pub title: String,
    pub site: String,
    pub status: SearchStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub searched_at: DateTime<Utc>,
    pub elapsed_sec: f64,
}

impl SearchRecord {
    pub fn success(
        entry: &CatalogEntry,
        site: &str,
        hit: &ScoredCandidate,
        elapsed_sec: f64,
    ) -> Self {
        Self::base(entry, site, SearchStatus::Success, elapsed_sec)
            .with_url(hit.candidate.url.clone(), hit.score)
    }

    pub fn not_found(entry: &CatalogEntry, site: &str, elapsed_sec: f64) -> Self {
        Self::base(entry, site, SearchStatus::NotFound, elapsed_sec)
    }

    pub fn error(entry: &CatalogEntry, site: &str, message: String, elapsed_sec: f64) -> Self {
        let mut record = Self::base(entry, site, SearchStatus::Error, elapsed_sec);
        record.error = Some(message);
        record
    }

    fn base(entry: &CatalogEntry, site: &str, status: SearchStatus, elapsed_sec: f64) -> Self {
        Self {
            n_code: entry.n_code.clone(),
            title: entry.title.clone(),
            site: site.to_string(),
            status,
            url: None,
            score: None,
            error: None,
            searched_at: Utc::now(),
            elapsed_sec,
        }
    }

    fn with_url(mut self, url: String, score: f64) -> Self {
        self.url = Some(url);
        self.score = Some(score);
        self
    }
}

/// Aggregated outcome of one catalog run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_searches: usize,
    pub successful: usize,
    pub not_found: usize,
    pub failed: usize,
    pub skipped: usize,

    /// Error message -> occurrence count.
    pub error_summary: BTreeMap<String, usize>,

    pub records: Vec<SearchRecord>,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchReport {
    pub fn new() -> Self {
        let started_at = Utc::now();
        Self {
            batch_id: format!("batch_{}", started_at.format("%Y%m%d_%H%M%S")),
            started_at,
            completed_at: None,
            total_searches: 0,
            successful: 0,
            not_found: 0,
            failed: 0,
            skipped: 0,
            error_summary: BTreeMap::new(),
            records: Vec::new(),
        }
    }

    /// Adds a record and updates the running totals.
    pub fn add_record(&mut self, record: SearchRecord) {
        self.total_searches += 1;
        match record.status {
            SearchStatus::Success => self.successful += 1,
            SearchStatus::NotFound => self.not_found += 1,
            SearchStatus::Error => {
                self.failed += 1;
                let key = record.error.clone().unwrap_or_else(|| "unknown error".to_string());
                *self.error_summary.entry(key).or_insert(0) += 1;
            }
            SearchStatus::Skipped => self.skipped += 1,
        }
        self.records.push(record);
    }

    /// Stamps the completion time.
    pub fn finalize(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Share of successful searches, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total_searches == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total_searches as f64 * 100.0
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Writes the records as CSV, all fields quoted.
    pub fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        let mut out = String::new();
        out.push_str("n_code,title,site,status,url,score,error,searched_at,elapsed_sec\n");

        for record in &self.records {
            let score = record.score.map(|s| format!("{s:.3}")).unwrap_or_default();
            let searched_at = record.searched_at.to_rfc3339();
            let elapsed = format!("{:.3}", record.elapsed_sec);
            let fields = [
                record.n_code.as_str(),
                record.title.as_str(),
                record.site.as_str(),
                record.status.as_str(),
                record.url.as_deref().unwrap_or(""),
                score.as_str(),
                record.error.as_deref().unwrap_or(""),
                searched_at.as_str(),
                elapsed.as_str(),
            ]
            .map(csv_field);
            out.push_str(&fields.join(","));
            out.push('\n');
        }

        std::fs::write(path, out)?;
        Ok(())
    }
}

fn csv_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
