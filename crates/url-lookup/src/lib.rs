//! Source document link lookup.
//!
//! Resolves a document file name to its public link using the URL mapping
//! spreadsheet named in a small JSON config file. Config and mapping are
//! re-read on every call.

pub mod config;
pub mod error;
pub mod mapping;

use std::path::Path;

use tracing::debug;

pub use config::{read_config, LookupConfig};
pub use error::LookupError;
pub use mapping::{load_rows, scan, MappingRow, UrlLookup, FILE_NAME_COLUMN, LINK_URL_COLUMN};

/// Looks `file_name` up in the mapping referenced by the config at `config_path`.
pub fn lookup_file_url(config_path: &Path, file_name: &str) -> Result<UrlLookup, LookupError> {
    let config = read_config(config_path)?;
    let rows = load_rows(&config.url_mapping_path)?;
    let result = scan(&rows, file_name);

    debug!(file_name, result = ?result, "URL lookup finished");
    Ok(result)
}

/// Like [`lookup_file_url`], but returns only the link when one exists.
pub fn get_file_url(config_path: &Path, file_name: &str) -> Result<Option<String>, LookupError> {
    lookup_file_url(config_path, file_name).map(UrlLookup::into_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Fixture {
        _dir: tempfile::TempDir,
        config_path: std::path::PathBuf,
    }

    fn fixture(mapping_csv: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mapping_path = dir.path().join("url_mapping.csv");
        fs::write(&mapping_path, mapping_csv).unwrap();

        let config_path = dir.path().join("config.json");
        let config = serde_json::json!([{ "url_mapping_path": mapping_path }]);
        fs::write(&config_path, config.to_string()).unwrap();

        Fixture {
            _dir: dir,
            config_path,
        }
    }

    const MAPPING: &str = "File Name,Link URL\n\
                           policy.pdf,https://contoso.com/policy.pdf\n\
                           draft.docx,  \n";

    #[test]
    fn test_get_file_url_found() {
        let f = fixture(MAPPING);
        assert_eq!(
            get_file_url(&f.config_path, "policy.pdf").unwrap().as_deref(),
            Some("https://contoso.com/policy.pdf")
        );
    }

    #[test]
    fn test_lookup_file_url_distinguishes_misses() {
        let f = fixture(MAPPING);
        assert_eq!(
            lookup_file_url(&f.config_path, "draft.docx").unwrap(),
            UrlLookup::FoundBlank
        );
        assert_eq!(
            lookup_file_url(&f.config_path, "unknown.pdf").unwrap(),
            UrlLookup::NotFound
        );
        assert_eq!(get_file_url(&f.config_path, "draft.docx").unwrap(), None);
        assert_eq!(get_file_url(&f.config_path, "unknown.pdf").unwrap(), None);
    }

    #[test]
    fn test_missing_mapping_file_is_an_error() {
        let f = fixture(MAPPING);
        let config = serde_json::json!([{ "url_mapping_path": "/nonexistent/url_mapping.csv" }]);
        fs::write(&f.config_path, config.to_string()).unwrap();

        assert!(matches!(
            get_file_url(&f.config_path, "policy.pdf"),
            Err(LookupError::Csv { .. })
        ));
    }

    #[test]
    fn test_missing_config_is_an_error() {
        assert!(matches!(
            get_file_url(Path::new("/nonexistent/config.json"), "policy.pdf"),
            Err(LookupError::ConfigRead { .. })
        ));
    }

    #[test]
    fn test_mapping_is_reread_on_each_call() {
        let f = fixture(MAPPING);
        assert_eq!(
            lookup_file_url(&f.config_path, "new.pdf").unwrap(),
            UrlLookup::NotFound
        );

        let config = read_config(&f.config_path).unwrap();
        fs::write(
            &config.url_mapping_path,
            "File Name,Link URL\nnew.pdf,https://contoso.com/new.pdf\n",
        )
        .unwrap();

        assert_eq!(
            get_file_url(&f.config_path, "new.pdf").unwrap().as_deref(),
            Some("https://contoso.com/new.pdf")
        );
    }
}
