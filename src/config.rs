//! Configuration management for meguri.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories. Matching thresholds, request
//! pacing and the store profiles all live here, so there is exactly one
//! place to tune them.

use crate::error::ConfigError;
use crate::fetch::FetchConfig;
use crate::matcher::DEFAULT_ACCEPT_FLOOR;
use crate::query::DEFAULT_QUERY_LIMIT;
use crate::search::{SelectorRule, SiteProfile};
use crate::similarity::DEFAULT_MATCH_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "Meguri";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Matching thresholds.
    pub matching: MatchingConfig,

    /// Request pacing and retry settings.
    pub fetch: FetchConfig,

    /// Store profiles to search.
    pub sites: Vec<SiteProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matching: MatchingConfig::default(),
            fetch: FetchConfig::default(),
            sites: default_sites(),
        }
    }
}

/// Title-matching thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Score at or above which a candidate is accepted without trying
    /// further queries.
    pub match_threshold: f64,

    /// Minimum score for a candidate to be considered at all.
    pub accept_floor: f64,

    /// Maximum search queries generated per title.
    pub max_queries: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            accept_floor: DEFAULT_ACCEPT_FLOOR,
            max_queries: DEFAULT_QUERY_LIMIT,
        }
    }
}

/// Store profiles shipped as defaults. Selector bonuses mirror each
/// store's preferred link shape: product detail pages outrank series and
/// listing pages.
pub fn default_sites() -> Vec<SiteProfile> {
    vec![
        SiteProfile {
            name: "BOOK☆WALKER".to_string(),
            base_url: "https://bookwalker.jp".to_string(),
            search_url: "https://bookwalker.jp/search/".to_string(),
            query_param: "word".to_string(),
            selectors: vec![
                SelectorRule {
                    selector: r#"a[href*="/de"]"#.to_string(),
                    bonus: 0.1,
                },
                SelectorRule {
                    selector: r#"a[href*="/series"]"#.to_string(),
                    bonus: 0.05,
                },
                SelectorRule {
                    selector: r#"a[href*="/book"]"#.to_string(),
                    bonus: 0.0,
                },
            ],
            accept_floor: None,
        },
        SiteProfile {
            name: "ebookjapan".to_string(),
            base_url: "https://ebookjapan.yahoo.co.jp".to_string(),
            search_url: "https://ebookjapan.yahoo.co.jp/search/".to_string(),
            query_param: "keyword".to_string(),
            selectors: vec![
                SelectorRule {
                    selector: r#"a[href*="/books/"]"#.to_string(),
                    bonus: 0.1,
                },
                SelectorRule {
                    selector: r#"a[href*="/title/"]"#.to_string(),
                    bonus: 0.0,
                },
            ],
            accept_floor: None,
        },
        SiteProfile {
            name: "honto".to_string(),
            base_url: "https://honto.jp".to_string(),
            search_url: "https://honto.jp/netstore/search.html".to_string(),
            query_param: "k".to_string(),
            selectors: vec![
                SelectorRule {
                    selector: r#"a[href*="/dsg-"]"#.to_string(),
                    bonus: 0.1,
                },
                SelectorRule {
                    selector: r#"a[href*="/netstore/pd-book"]"#.to_string(),
                    bonus: 0.05,
                },
            ],
            accept_floor: None,
        },
    ]
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.matching.match_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "matching.match_threshold".to_string(),
                message: "must be between 0 and 1".to_string(),
            });
        }

        if self.matching.accept_floor < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "matching.accept_floor".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        if self.matching.max_queries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "matching.max_queries".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.fetch.delay_between_requests_sec < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "fetch.delay_between_requests_sec".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        if self.fetch.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "fetch.retry.max_attempts".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        for site in &self.sites {
            if site.name.is_empty() || site.search_url.is_empty() || site.query_param.is_empty() {
                return Err(ConfigError::MissingValue(format!(
                    "sites entry '{}' needs name, search_url and query_param",
                    site.name
                )));
            }
            if site.selectors.is_empty() {
                return Err(ConfigError::MissingValue(format!(
                    "sites entry '{}' needs at least one selector",
                    site.name
                )));
            }
        }

        Ok(())
    }

    /// Finds a configured site profile by (case-insensitive) name.
    pub fn site_by_name(&self, name: &str) -> Option<&SiteProfile> {
        self.sites
            .iter()
            .find(|site| site.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.matching.match_threshold, DEFAULT_MATCH_THRESHOLD);
        assert_eq!(config.matching.accept_floor, DEFAULT_ACCEPT_FLOOR);
        assert_eq!(config.fetch.delay_between_requests_sec, 1.0);
        assert_eq!(config.sites.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let file = NamedTempFile::new().unwrap();

        config.save_to(file.path()).unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.matching.match_threshold, config.matching.match_threshold);
        assert_eq!(loaded.sites.len(), config.sites.len());
        assert_eq!(loaded.sites[0].name, "BOOK☆WALKER");
        assert_eq!(loaded.sites[0].selectors[0].bonus, 0.1);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.sites.len(), 3);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.matching.match_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.matching.max_queries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sites[0].selectors.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_site_by_name() {
        let config = Config::default();
        assert!(config.site_by_name("honto").is_some());
        assert!(config.site_by_name("HONTO").is_some());
        assert!(config.site_by_name("unknown").is_none());
    }
}
