//! Catalog input: the list of works to find purchase links for.
//!
//! A catalog is a tab-separated text file, one `n_code<TAB>title` pair per
//! line. Blank lines and `#` comments are skipped.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One catalog row: a Syosetu N-code and the published title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Work identifier, e.g. `n1234ab`.
    pub n_code: String,

    /// Published book title, volume marker included.
    pub title: String,
}

/// Loads a catalog file from disk.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    parse_catalog(&content)
}

/// Parses catalog text into entries.
pub fn parse_catalog(content: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let mut entries = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let invalid = || CatalogError::InvalidLine {
            line: index + 1,
            content: trimmed.to_string(),
        };

        let (n_code, title) = trimmed.split_once('\t').ok_or_else(invalid)?;
        let n_code = n_code.trim();
        let title = title.trim();
        if n_code.is_empty() || title.is_empty() {
            return Err(invalid());
        }

        entries.push(CatalogEntry {
            n_code: n_code.to_string(),
            title: title.to_string(),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog() {
        let content = "# catalog\nn1234ab\tタイトル①\n\nn5678cd\t別のタイトル\n";
        let entries = parse_catalog(content).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].n_code, "n1234ab");
        assert_eq!(entries[0].title, "タイトル①");
        assert_eq!(entries[1].n_code, "n5678cd");
    }

    #[test]
    fn test_parse_catalog_rejects_malformed_lines() {
        assert!(matches!(
            parse_catalog("no tab here"),
            Err(CatalogError::InvalidLine { line: 1, .. })
        ));
        assert!(matches!(
            parse_catalog("n1234ab\t \n"),
            Err(CatalogError::InvalidLine { .. })
        ));
    }

    #[test]
    fn test_load_catalog_round_trip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "n1234ab\tタイトル\n").unwrap();

        let entries = load_catalog(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "タイトル");
    }
}
