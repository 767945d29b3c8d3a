//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.rpp-explorer.toml` files.

use crate::data::{LoadOptions, UnmappedPolicy};
use crate::models::SourceLevel;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".rpp-explorer.toml";

/// Where the active configuration came from.
#[derive(Debug)]
pub enum ConfigOrigin {
    /// Read from this file.
    File(PathBuf),
    /// No file present; built-in defaults.
    Defaults,
    /// The default file exists but could not be read; built-in defaults.
    Invalid(anyhow::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input file locations.
    #[serde(default)]
    pub data: DataConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Input file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Renewable power plant CSV.
    #[serde(default = "default_plants")]
    pub plants: PathBuf,

    /// Canton boundary GeoJSON.
    #[serde(default = "default_boundaries")]
    pub boundaries: PathBuf,

    /// Feature property holding the canton display name.
    #[serde(default = "default_boundary_key")]
    pub boundary_key: String,

    /// Fuel-economy CSV shown by `--preview`.
    #[serde(default = "default_preview")]
    pub preview: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            plants: default_plants(),
            boundaries: default_boundaries(),
            boundary_key: default_boundary_key(),
            preview: default_preview(),
        }
    }
}

fn default_plants() -> PathBuf {
    PathBuf::from("data/renewable_power_plants_CH.csv")
}

fn default_boundaries() -> PathBuf {
    PathBuf::from("data/georef-switzerland-kanton.geojson")
}

fn default_boundary_key() -> String {
    "kan_name".to_string()
}

fn default_preview() -> PathBuf {
    PathBuf::from("data/mpg.csv")
}

/// Aggregation pipeline settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Energy source column used as the category.
    #[serde(default)]
    pub source_level: SourceLevel,

    /// Handling of canton codes missing from the lookup table.
    #[serde(default)]
    pub unmapped: UnmappedPolicy,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Marker size of the largest bubble.
    #[serde(default = "default_bubble_size_max")]
    pub bubble_size_max: f64,

    /// Rows shown by CSV previews.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bubble_size_max: default_bubble_size_max(),
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_bubble_size_max() -> f64 {
    50.0
}

fn default_preview_rows() -> usize {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Resolve the configuration before logging is set up.
    ///
    /// An explicit path must load. A broken default file falls back to the
    /// built-in defaults and is reported through the returned origin.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, ConfigOrigin)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, ConfigOrigin::File(path.to_path_buf())));
        }

        match Self::load_default() {
            Ok(Some(config)) => Ok((config, ConfigOrigin::File(PathBuf::from(CONFIG_FILE)))),
            Ok(None) => Ok((Self::default(), ConfigOrigin::Defaults)),
            Err(e) => Ok((Self::default(), ConfigOrigin::Invalid(e))),
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref plants) = args.data {
            self.data.plants = plants.clone();
        }
        if let Some(ref boundaries) = args.boundaries {
            self.data.boundaries = boundaries.clone();
        }
        if let Some(Some(ref preview)) = args.preview {
            self.data.preview = preview.clone();
        }

        if let Some(level) = args.level {
            self.pipeline.source_level = level.into();
        }
        if args.strict {
            self.pipeline.unmapped = UnmappedPolicy::Reject;
        }

        if let Some(rows) = args.rows {
            self.report.preview_rows = rows;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Loader options derived from the pipeline settings.
    pub fn load_options(&self, show_progress: bool) -> LoadOptions {
        LoadOptions {
            unmapped: self.pipeline.unmapped,
            show_progress,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.data.plants,
            PathBuf::from("data/renewable_power_plants_CH.csv")
        );
        assert_eq!(config.data.boundary_key, "kan_name");
        assert_eq!(config.pipeline.source_level, SourceLevel::Broad);
        assert_eq!(config.pipeline.unmapped, UnmappedPolicy::Label);
        assert_eq!(config.report.preview_rows, 10);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[data]
plants = "input/plants.csv"

[pipeline]
source_level = "detailed"
unmapped = "reject"

[report]
bubble_size_max = 30.0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.data.plants, PathBuf::from("input/plants.csv"));
        assert_eq!(config.data.preview, PathBuf::from("data/mpg.csv"));
        assert_eq!(config.pipeline.source_level, SourceLevel::Detailed);
        assert_eq!(config.pipeline.unmapped, UnmappedPolicy::Reject);
        assert_eq!(config.report.bubble_size_max, 30.0);
        assert_eq!(config.report.preview_rows, 10);
    }

    #[test]
    fn test_resolve_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[general]\nverbose = true\n").unwrap();

        let (config, origin) = Config::resolve(Some(file.path())).unwrap();
        assert!(config.general.verbose);
        match origin {
            ConfigOrigin::File(path) => assert_eq!(path, file.path()),
            other => panic!("unexpected origin: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_explicit_file_must_parse() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[general\n").unwrap();
        assert!(Config::resolve(Some(file.path())).is_err());

        let missing = Path::new("no/such/config.toml");
        assert!(Config::resolve(Some(missing)).is_err());
    }

    #[test]
    fn test_load_options() {
        let mut config = Config::default();
        config.pipeline.unmapped = UnmappedPolicy::Reject;

        let options = config.load_options(true);
        assert_eq!(options.unmapped, UnmappedPolicy::Reject);
        assert!(options.show_progress);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[pipeline]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data.boundary_key, "kan_name");
    }
}
