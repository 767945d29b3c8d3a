//! Raw CSV preview.
//!
//! Shows the header and the first rows of any delimited file without
//! interpreting the columns. Used for the fuel-economy (mpg) table and
//! for peeking at the plant table itself.

use crate::error::{DataError, DataResult};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Header, leading rows and total row count of a CSV file.
#[derive(Debug, Clone, Serialize)]
pub struct CsvPreview {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Data rows in the whole file, not just the preview.
    pub total_rows: usize,
}

/// Preview a CSV file on disk.
pub fn preview_csv(path: &Path, max_rows: usize) -> DataResult<CsvPreview> {
    let file = File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    preview_reader(file, path, max_rows)
}

/// Preview CSV data from any reader.
pub fn preview_reader<R: Read>(reader: R, path: &Path, max_rows: usize) -> DataResult<CsvPreview> {
    let csv_err = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(String::from)
        .collect();

    let mut rows = Vec::new();
    let mut total_rows = 0usize;

    for result in csv_reader.records() {
        let record = result.map_err(csv_err)?;
        if rows.len() < max_rows {
            rows.push(record.iter().map(String::from).collect());
        }
        total_rows += 1;
    }

    Ok(CsvPreview {
        path: path.to_path_buf(),
        headers,
        rows,
        total_rows,
    })
}
