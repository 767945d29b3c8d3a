//! Load-once dataset cache.
//!
//! Input files do not change while the process runs, so a dataset is read
//! at most once per path. Callers receive shared read-only snapshots.

use super::loader::{load_plants, Dataset, LoadOptions};
use crate::error::DataResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Datasets keyed by canonical input path.
#[derive(Debug, Default)]
pub struct DatasetCache {
    options: LoadOptions,
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
        }
    }

    /// Return the cached dataset for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> DataResult<Arc<Dataset>> {
        let key = std::fs::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf());

        if let Some(dataset) = self.entries.get(&key) {
            debug!("Dataset cache hit: {}", key.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_plants(path, &self.options)?);
        self.entries.insert(key, Arc::clone(&dataset));

        Ok(dataset)
    }

    /// Number of datasets held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
