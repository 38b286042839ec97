//! Mapping file readers and the row scan.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::error::LookupError;

pub const FILE_NAME_COLUMN: &str = "File Name";
pub const LINK_URL_COLUMN: &str = "Link URL";

/// One data row of the mapping file.
///
/// A cell is `None` when it is empty or does not hold text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingRow {
    pub file_name: Option<String>,
    pub link_url: Option<String>,
}

impl MappingRow {
    pub fn new(file_name: Option<&str>, link_url: Option<&str>) -> Self {
        Self {
            file_name: file_name.map(str::to_string),
            link_url: link_url.map(str::to_string),
        }
    }
}

/// Outcome of looking a file name up in the mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlLookup {
    /// A matching row with a usable link, returned as stored.
    Found(String),
    /// The file name is listed, but none of its rows has a usable link.
    FoundBlank,
    NotFound,
}

impl UrlLookup {
    pub fn into_url(self) -> Option<String> {
        match self {
            UrlLookup::Found(url) => Some(url),
            UrlLookup::FoundBlank | UrlLookup::NotFound => None,
        }
    }
}

/// Scans rows in order for the first exact `file_name` match with a non-blank link.
pub fn scan<'a, I>(rows: I, file_name: &str) -> UrlLookup
where
    I: IntoIterator<Item = &'a MappingRow>,
{
    let mut listed = false;

    for row in rows {
        if row.file_name.as_deref() != Some(file_name) {
            continue;
        }
        match row.link_url.as_deref() {
            Some(url) if !url.trim().is_empty() => return UrlLookup::Found(url.to_string()),
            _ => listed = true,
        }
    }

    if listed {
        UrlLookup::FoundBlank
    } else {
        UrlLookup::NotFound
    }
}

/// Loads every data row of the mapping file.
///
/// Files with a `.csv` extension are read as CSV; anything else is opened as a
/// workbook and its first worksheet is used.
pub fn load_rows(path: &Path) -> Result<Vec<MappingRow>, LookupError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let rows = if is_csv {
        load_csv(path)?
    } else {
        load_workbook(path)?
    };

    debug!(path = %path.display(), rows = rows.len(), "Loaded URL mapping");
    Ok(rows)
}

fn column_index<'a, I>(headers: I, column: &'static str, path: &Path) -> Result<usize, LookupError>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    headers
        .into_iter()
        .position(|header| header.map(str::trim) == Some(column))
        .ok_or_else(|| LookupError::MissingColumn {
            path: path.to_path_buf(),
            column,
        })
}

fn load_csv(path: &Path) -> Result<Vec<MappingRow>, LookupError> {
    let csv_error = |source: csv::Error| LookupError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let name_idx = column_index(headers.iter().map(Some), FILE_NAME_COLUMN, path)?;
    let url_idx = column_index(headers.iter().map(Some), LINK_URL_COLUMN, path)?;

    let text = |record: &csv::StringRecord, idx: usize| {
        record
            .get(idx)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    reader
        .records()
        .map(|record| {
            let record = record.map_err(csv_error)?;
            Ok(MappingRow {
                file_name: text(&record, name_idx),
                link_url: text(&record, url_idx),
            })
        })
        .collect()
}

fn load_workbook(path: &Path) -> Result<Vec<MappingRow>, LookupError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LookupError::Spreadsheet {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LookupError::NoWorksheet(path.to_path_buf()))?
        .map_err(|e| LookupError::Spreadsheet {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let name_idx = column_index(header.iter().map(cell_text), FILE_NAME_COLUMN, path)?;
    let url_idx = column_index(header.iter().map(cell_text), LINK_URL_COLUMN, path)?;

    let text = |row: &[Data], idx: usize| row.get(idx).and_then(cell_text).map(str::to_string);

    Ok(rows
        .map(|row| MappingRow {
            file_name: text(row, name_idx),
            link_url: text(row, url_idx),
        })
        .collect())
}

fn cell_text(cell: &Data) -> Option<&str> {
    match cell {
        Data::String(s) => Some(s.as_str()),
        _ => None,
    }
}
