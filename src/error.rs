//! Error types for data loading.
//!
//! Everything that can go wrong while reading the input files. The
//! aggregation pipeline itself is infallible; bad selections produce
//! empty results instead of errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while loading plant, boundary or preview files.
#[derive(Error, Debug)]
pub enum DataError {
    /// The input file does not exist or could not be opened.
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV row or header could not be parsed.
    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The boundary file is not a valid GeoJSON feature collection.
    #[error("malformed GeoJSON in {path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A plant references a canton code missing from the lookup table
    /// and the loader is configured to reject such rows.
    #[error("unknown canton code '{code}' on line {line}")]
    UnmappedCanton { code: String, line: u64 },
}

/// Convenience type alias for loader results.
pub type DataResult<T> = Result<T, DataError>;
