//! Lookup configuration file.
//!
//! The file is a JSON array; only the first entry is used:
//!
//! ```json
//! [{ "url_mapping_path": "data/url_mapping.xlsx" }]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::LookupError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LookupConfig {
    /// Spreadsheet or CSV file holding the `File Name` -> `Link URL` mapping.
    pub url_mapping_path: PathBuf,
}

/// Reads the config file and returns its first entry.
pub fn read_config(path: &Path) -> Result<LookupConfig, LookupError> {
    let raw = fs::read_to_string(path).map_err(|source| LookupError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    let entries: Vec<LookupConfig> =
        serde_json::from_str(&raw).map_err(|source| LookupError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    entries
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::EmptyConfig(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_config_uses_first_entry() {
        let file = write_config(
            r#"[{"url_mapping_path": "first.xlsx"}, {"url_mapping_path": "second.xlsx"}]"#,
        );
        let config = read_config(file.path()).unwrap();
        assert_eq!(config.url_mapping_path, PathBuf::from("first.xlsx"));
    }

    #[test]
    fn test_read_config_ignores_extra_keys() {
        let file = write_config(r#"[{"url_mapping_path": "map.csv", "owner": "docs"}]"#);
        assert!(read_config(file.path()).is_ok());
    }

    #[test]
    fn test_read_config_missing_file() {
        let err = read_config(Path::new("/nonexistent/url-config.json")).unwrap_err();
        assert!(matches!(err, LookupError::ConfigRead { .. }));
    }

    #[test]
    fn test_read_config_invalid_json() {
        let file = write_config("{not json");
        assert!(matches!(
            read_config(file.path()),
            Err(LookupError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_read_config_object_instead_of_array() {
        let file = write_config(r#"{"url_mapping_path": "map.xlsx"}"#);
        assert!(matches!(
            read_config(file.path()),
            Err(LookupError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_read_config_empty_array() {
        let file = write_config("[]");
        assert!(matches!(
            read_config(file.path()),
            Err(LookupError::EmptyConfig(_))
        ));
    }
}
