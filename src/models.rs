//! Data models for the power plant explorer.
//!
//! This module contains the core data structures shared by the loader,
//! the aggregation pipeline and the report generator.

use crate::cantons;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used by dropdowns and the CLI for "no filter".
pub const ALL: &str = "All";

/// One renewable power plant, as read from the plant CSV.
///
/// Numeric columns are parsed leniently: empty or malformed cells become
/// `None` instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    /// Two-letter canton code.
    #[serde(rename = "canton")]
    pub canton_code: String,
    /// Broad energy source category (Hydro, Wind, Solar, Bioenergy).
    #[serde(rename = "energy_source_level_2")]
    pub energy_source: String,
    /// Finer energy source subtype, when the file provides one.
    #[serde(
        rename = "energy_source_level_3",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub energy_source_detail: Option<String>,
    /// Installed capacity.
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub electrical_capacity: Option<f64>,
    /// WGS84 latitude in degrees.
    #[serde(rename = "lat", default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    /// WGS84 longitude in degrees.
    #[serde(rename = "lon", default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
    /// Display label.
    #[serde(default)]
    pub project_name: String,
}

impl PlantRecord {
    /// Capacity used for aggregation. Missing and non-finite values count as 0.
    pub fn capacity(&self) -> f64 {
        match self.electrical_capacity {
            Some(c) if c.is_finite() => c,
            _ => 0.0,
        }
    }

    /// Energy source category at the requested taxonomy level.
    ///
    /// The detailed level falls back to the broad one when the subtype is
    /// missing or blank.
    pub fn source(&self, level: SourceLevel) -> &str {
        match level {
            SourceLevel::Broad => &self.energy_source,
            SourceLevel::Detailed => self
                .energy_source_detail
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(&self.energy_source),
        }
    }

    /// Resolve the canton code against the static lookup table.
    pub fn canton_name(&self) -> CantonName {
        match cantons::canton_name(&self.canton_code) {
            Some(name) => CantonName::Mapped(name),
            None => CantonName::Unmapped(self.canton_code.trim().to_string()),
        }
    }

    /// Latitude/longitude pair when both are present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Display name of a canton, or a marker for a code missing from the table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CantonName {
    Mapped(&'static str),
    Unmapped(String),
}

impl CantonName {
    pub fn is_mapped(&self) -> bool {
        matches!(self, CantonName::Mapped(_))
    }
}

impl fmt::Display for CantonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CantonName::Mapped(name) => write!(f, "{}", name),
            CantonName::Unmapped(code) => write!(f, "Unmapped ({})", code),
        }
    }
}

/// Which energy source column acts as the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLevel {
    /// `energy_source_level_2`
    #[default]
    Broad,
    /// `energy_source_level_3`
    Detailed,
}

/// Grouping dimension(s) for the aggregation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// One row per canton (map view).
    Canton,
    /// One row per energy source (pie view).
    EnergySource,
    /// One row per (canton, energy source) pair (stacked bar view).
    CantonAndSource,
}

/// Row restriction applied before grouping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    /// No restriction.
    #[default]
    All,
    /// Keep plants whose energy source equals the value.
    EnergySource(String),
    /// Keep plants whose canton display name equals the value.
    Canton(String),
}

impl Filter {
    /// Build an energy source filter from a dropdown selection.
    pub fn source(selection: &str) -> Self {
        if is_all(selection) {
            Filter::All
        } else {
            Filter::EnergySource(selection.trim().to_string())
        }
    }

    /// Build a canton filter from a dropdown selection.
    ///
    /// Accepts a display name or a two-letter code.
    pub fn canton(selection: &str) -> Self {
        if is_all(selection) {
            return Filter::All;
        }

        let selection = selection.trim();
        match cantons::canton_name(selection) {
            Some(name) => Filter::Canton(name.to_string()),
            None => Filter::Canton(selection.to_string()),
        }
    }

    /// Selection text as shown in titles.
    pub fn label(&self) -> &str {
        match self {
            Filter::All => ALL,
            Filter::EnergySource(s) | Filter::Canton(s) => s,
        }
    }

    /// Whether a record passes this filter.
    pub fn matches(&self, record: &PlantRecord, level: SourceLevel) -> bool {
        match self {
            Filter::All => true,
            Filter::EnergySource(source) => record.source(level) == source.as_str(),
            Filter::Canton(name) => record.canton_name().to_string() == *name,
        }
    }
}

fn is_all(selection: &str) -> bool {
    let s = selection.trim();
    s.is_empty() || s.eq_ignore_ascii_case(ALL)
}

/// One output row of the aggregation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRow {
    /// Canton display name, set for canton groupings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canton: Option<String>,
    /// Energy source, set for source groupings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_source: Option<String>,
    /// Summed electrical capacity of the group.
    pub capacity: f64,
}

impl AggregatedRow {
    /// The first group key column: canton when present, else energy source.
    pub fn primary_key(&self) -> &str {
        self.canton
            .as_deref()
            .or(self.energy_source.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plant(canton: &str, source: &str, capacity: f64) -> PlantRecord {
        PlantRecord {
            canton_code: canton.to_string(),
            energy_source: source.to_string(),
            energy_source_detail: None,
            electrical_capacity: Some(capacity),
            latitude: None,
            longitude: None,
            project_name: String::new(),
        }
    }

    #[test]
    fn test_capacity_treats_missing_and_nan_as_zero() {
        let mut p = plant("ZH", "Wind", 4.5);
        assert_eq!(p.capacity(), 4.5);

        p.electrical_capacity = None;
        assert_eq!(p.capacity(), 0.0);

        p.electrical_capacity = Some(f64::NAN);
        assert_eq!(p.capacity(), 0.0);
    }

    #[test]
    fn test_source_level_fallback() {
        let mut p = plant("BE", "Bioenergy", 1.0);
        assert_eq!(p.source(SourceLevel::Detailed), "Bioenergy");

        p.energy_source_detail = Some("Biomass and biogas".to_string());
        assert_eq!(p.source(SourceLevel::Broad), "Bioenergy");
        assert_eq!(p.source(SourceLevel::Detailed), "Biomass and biogas");
    }

    #[test]
    fn test_canton_name_resolution() {
        assert_eq!(
            plant("ZH", "Wind", 1.0).canton_name(),
            CantonName::Mapped("Zürich")
        );

        let unknown = plant("XX", "Wind", 1.0).canton_name();
        assert!(!unknown.is_mapped());
        assert_eq!(unknown.to_string(), "Unmapped (XX)");
    }

    #[test]
    fn test_filter_from_selection() {
        assert_eq!(Filter::source("All"), Filter::All);
        assert_eq!(Filter::source("all"), Filter::All);
        assert_eq!(Filter::source(""), Filter::All);
        assert_eq!(
            Filter::source("Wind"),
            Filter::EnergySource("Wind".to_string())
        );
        assert_eq!(Filter::canton("Bern"), Filter::Canton("Bern".to_string()));
        assert_eq!(
            Filter::canton("SG"),
            Filter::Canton("St. Gallen".to_string())
        );
        assert_eq!(Filter::canton("Bern").label(), "Bern");
        assert_eq!(Filter::All.label(), "All");
    }

    #[test]
    fn test_filter_matches() {
        let p = plant("BE", "Wind", 2.0);
        assert!(Filter::All.matches(&p, SourceLevel::Broad));
        assert!(Filter::source("Wind").matches(&p, SourceLevel::Broad));
        assert!(!Filter::source("Solar").matches(&p, SourceLevel::Broad));
        assert!(Filter::canton("Bern").matches(&p, SourceLevel::Broad));
        assert!(Filter::canton("BE").matches(&p, SourceLevel::Broad));
        assert!(!Filter::canton("Uri").matches(&p, SourceLevel::Broad));
    }

    #[test]
    fn test_coordinates_require_both() {
        let mut p = plant("VS", "Hydro", 1.0);
        assert_eq!(p.coordinates(), None);

        p.latitude = Some(46.2);
        assert_eq!(p.coordinates(), None);

        p.longitude = Some(7.5);
        assert_eq!(p.coordinates(), Some((46.2, 7.5)));
    }

    #[test]
    fn test_row_primary_key() {
        let row = AggregatedRow {
            canton: Some("Bern".to_string()),
            energy_source: Some("Wind".to_string()),
            capacity: 1.0,
        };
        assert_eq!(row.primary_key(), "Bern");

        let by_source = AggregatedRow {
            canton: None,
            ..row
        };
        assert_eq!(by_source.primary_key(), "Wind");
    }
}
