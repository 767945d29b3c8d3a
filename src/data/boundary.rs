//! Canton boundary file handling.
//!
//! Only the feature names matter here: the choropleth view checks which
//! aggregated cantons have a boundary to be drawn on, and which boundaries
//! have no data. Geometry is left to whatever renders the map.

use crate::error::{DataError, DataResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// Feature names from a GeoJSON boundary file.
#[derive(Debug, Clone)]
pub struct Boundaries {
    path: PathBuf,
    names: BTreeSet<String>,
    feature_count: usize,
}

impl Boundaries {
    /// Load boundaries, naming each feature by the `id_key` property.
    ///
    /// `id_key` may be given as `kan_name` or `properties.kan_name`.
    pub fn load(path: &Path, id_key: &str) -> DataResult<Self> {
        let file = File::open(path).map_err(|source| DataError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_reader(BufReader::new(file), path, id_key)
    }

    /// Parse boundaries from any reader; `path` is used for messages only.
    pub fn from_reader<R: Read>(reader: R, path: &Path, id_key: &str) -> DataResult<Self> {
        let parsed: Result<FeatureCollection, _> = serde_json::from_reader(reader);
        let collection = parsed.map_err(|source| DataError::GeoJson {
            path: path.to_path_buf(),
            source,
        })?;

        let key = id_key.strip_prefix("properties.").unwrap_or(id_key);
        let mut names = BTreeSet::new();
        let mut unnamed = 0usize;

        for feature in &collection.features {
            let found = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(key))
                .map(feature_names)
                .unwrap_or_default();

            if found.is_empty() {
                unnamed += 1;
            }
            names.extend(found);
        }

        if unnamed > 0 {
            warn!(
                "{} of {} boundary features have no '{}' property",
                unnamed,
                collection.features.len(),
                key
            );
        }

        info!(
            "Loaded {} boundary features ({} names) from {}",
            collection.features.len(),
            names.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            names,
            feature_count: collection.features.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Whether a feature with this display name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// All feature names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Property values may be a plain string or a list of strings.
fn feature_names(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        other => {
            debug!("Ignoring non-string boundary name: {}", other);
            Vec::new()
        }
    }
}
