//! URL lookup error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the lookup config or the mapping file.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Config file {0} contains no entries")]
    EmptyConfig(PathBuf),

    #[error("Failed to open spreadsheet {path}: {message}")]
    Spreadsheet { path: PathBuf, message: String },

    #[error("Spreadsheet {0} has no worksheets")]
    NoWorksheet(PathBuf),

    #[error("Failed to read CSV file {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Mapping file {path} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: &'static str },
}
