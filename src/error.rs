//! Error types for the meguri application.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use thiserror::Error;

/// Main error type for site search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to parse search results
    #[error("Failed to parse search results: {0}")]
    ParseError(String),

    /// A site profile carries a CSS selector that doesn't parse
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// URL parsing or validation failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Rate limit exceeded or server returned 429
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// All retry attempts exhausted
    #[error("All {attempts} attempts failed for {url}")]
    RetriesExhausted { url: String, attempts: u32 },
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Missing required configuration value
    #[error("Missing required config value: {0}")]
    MissingValue(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Error type for catalog loading.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Failed to read catalog file
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    /// A line isn't `n_code<TAB>title`
    #[error("Invalid catalog line {line}: {content}")]
    InvalidLine { line: usize, content: String },
}

/// Error type for report export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Failed to write report file
    #[error("Failed to write report: {0}")]
    WriteError(#[from] std::io::Error),

    /// Failed to serialize report
    #[error("Failed to serialize report: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
