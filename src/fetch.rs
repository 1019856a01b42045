//! HTTP plumbing for search-page retrieval.
//!
//! One shared client per searcher, a pacing delay between requests, and a
//! bounded retry policy for transient failures. HTTP 429 responses are
//! retried with backoff before surfacing as [`SearchError::RateLimited`].

use crate::error::SearchError;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Creates the HTTP client used for site searches.
pub fn create_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .build()
}

/// Applies the pacing delay between requests.
pub async fn rate_limit(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}

/// Backoff shape used between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Same delay before every retry.
    Fixed,
    /// Delay grows by the base delay each attempt.
    Linear,
    /// Delay doubles (by `backoff_factor`) each attempt.
    Exponential,
}

/// Retry settings for transient fetch failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Backoff shape between attempts.
    pub strategy: BackoffStrategy,

    /// Delay before the first retry in seconds.
    pub base_delay_sec: f64,

    /// Upper bound on any single delay in seconds.
    pub max_delay_sec: f64,

    /// Growth factor for exponential backoff.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            strategy: BackoffStrategy::Exponential,
            base_delay_sec: 1.0,
            max_delay_sec: 60.0,
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry that follows attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = match self.strategy {
            BackoffStrategy::Fixed => self.base_delay_sec,
            BackoffStrategy::Linear => self.base_delay_sec * (attempt + 1) as f64,
            BackoffStrategy::Exponential => {
                self.base_delay_sec * self.backoff_factor.powi(attempt as i32)
            }
        };
        Duration::from_secs_f64(delay.clamp(0.0, self.max_delay_sec))
    }
}

/// Request pacing and retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Delay between web requests in seconds.
    pub delay_between_requests_sec: f64,

    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay_between_requests_sec: 1.0,
            retry: RetryPolicy::default(),
        }
    }
}

/// Fetches a page and parses it, retrying transient failures.
pub async fn fetch_html(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
    policy: &RetryPolicy,
) -> Result<Html, SearchError> {
    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            let delay = policy.delay_for(attempt - 1);
            debug!(url, attempt, ?delay, "retrying fetch");
            tokio::time::sleep(delay).await;
        }

        match try_fetch(client, url, query).await {
            Ok(html) => return Ok(html),
            Err(SearchError::RateLimited(host)) => {
                warn!(url, host = %host, "rate limited");
            }
            Err(SearchError::HttpError(e)) => {
                warn!(url, error = %e, "fetch failed");
            }
            Err(other) => return Err(other),
        }
    }

    Err(SearchError::RetriesExhausted {
        url: url.to_string(),
        attempts: policy.max_attempts,
    })
}

async fn try_fetch(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Html, SearchError> {
    let mut request = client.get(url);
    if !query.is_empty() {
        request = request.query(query);
    }

    let response = request.send().await?;
    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(SearchError::RateLimited(url.to_string()));
    }

    let text = response.error_for_status()?.text().await?;
    Ok(Html::parse_document(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay() {
        let policy = RetryPolicy {
            strategy: BackoffStrategy::Fixed,
            base_delay_sec: 2.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(5), Duration::from_secs(2));
    }

    #[test]
    fn test_linear_delay() {
        let policy = RetryPolicy {
            strategy: BackoffStrategy::Linear,
            base_delay_sec: 1.5,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs_f64(1.5));
        assert_eq!(policy.delay_for(2), Duration::from_secs_f64(4.5));
    }

    #[test]
    fn test_exponential_delay_is_capped() {
        let policy = RetryPolicy {
            strategy: BackoffStrategy::Exponential,
            base_delay_sec: 1.0,
            max_delay_sec: 60.0,
            backoff_factor: 2.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for(20), Duration::from_secs(60));
    }
}
