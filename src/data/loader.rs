//! Plant CSV loading.
//!
//! Reads the renewable power plant table into memory once. Numeric cells
//! are parsed leniently (see [`PlantRecord`]); structural problems such as
//! a missing `canton` column abort the load.

use crate::analysis::unmapped_codes;
use crate::error::{DataError, DataResult};
use crate::models::{Filter, PlantRecord, SourceLevel};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// What to do with plants whose canton code is not in the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmappedPolicy {
    /// Keep the rows, labelled `Unmapped (<code>)`, and log them.
    #[default]
    Label,
    /// Fail the load on the first such row.
    Reject,
}

/// Options for loading a plant file.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub unmapped: UnmappedPolicy,
    /// Show a spinner while reading.
    pub show_progress: bool,
}

/// An immutable, loaded plant table.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    records: Vec<PlantRecord>,
    unmapped: BTreeMap<String, usize>,
}

impl Dataset {
    /// Build a dataset from records already in memory.
    pub fn from_records(path: impl Into<PathBuf>, records: Vec<PlantRecord>) -> Self {
        let unmapped = unmapped_codes(&records);
        Self {
            path: path.into(),
            records,
            unmapped,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[PlantRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unknown canton codes with the number of plants carrying each.
    pub fn unmapped_codes(&self) -> &BTreeMap<String, usize> {
        &self.unmapped
    }

    /// Total capacity across all plants.
    pub fn total_capacity(&self, level: SourceLevel) -> f64 {
        crate::analysis::total_capacity(&self.records, &Filter::All, level)
    }
}

/// Load a plant CSV from disk.
pub fn load_plants(path: &Path, options: &LoadOptions) -> DataResult<Dataset> {
    let file = File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    read_plants(file, path, options)
}

/// Read plants from any reader; `path` labels the dataset and errors.
pub fn read_plants<R: Read>(reader: R, path: &Path, options: &LoadOptions) -> DataResult<Dataset> {
    let progress = spinner(options.show_progress, path);

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let csv_error = |source: csv::Error| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let headers = csv_reader.headers().map_err(csv_error)?.clone();

    let mut records = Vec::new();

    for result in csv_reader.records() {
        let row = result.map_err(csv_error)?;
        let record: PlantRecord = row.deserialize(Some(&headers)).map_err(csv_error)?;

        if options.unmapped == UnmappedPolicy::Reject && !record.canton_name().is_mapped() {
            progress.finish_and_clear();
            return Err(DataError::UnmappedCanton {
                code: record.canton_code.trim().to_string(),
                line: row.position().map_or(0, |p| p.line()),
            });
        }

        records.push(record);

        if records.len() % 1000 == 0 {
            progress.set_message(format!("{} plants", records.len()));
        }
    }

    progress.finish_and_clear();

    let dataset = Dataset::from_records(path, records);

    for (code, count) in dataset.unmapped_codes() {
        warn!(
            "Canton code '{}' is not a Swiss canton; {} plants labelled 'Unmapped ({})'",
            code, count, code
        );
    }

    info!(
        "Loaded {} plant records from {}",
        dataset.len(),
        path.display()
    );
    debug!("Unmapped canton codes: {:?}", dataset.unmapped_codes());

    Ok(dataset)
}

fn spinner(show: bool, path: &Path) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {prefix} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(format!("Loading {}", path.display()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
