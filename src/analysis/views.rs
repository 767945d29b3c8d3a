//! Chart datasets.
//!
//! Each builder runs the aggregation pipeline for one dashboard chart and
//! packages the result with its title, ready for a renderer. Nothing here
//! draws anything.

use super::aggregator::{aggregate, distinct_cantons, distinct_sources, total_capacity};
use crate::data::Boundaries;
use crate::models::{AggregatedRow, Dimension, Filter, PlantRecord, SourceLevel, ALL};
use serde::Serialize;

/// Settings shared by every view builder.
#[derive(Debug, Clone, Copy)]
pub struct ViewSettings {
    pub level: SourceLevel,
    /// Marker size given to the largest bubble.
    pub bubble_size_max: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            level: SourceLevel::Broad,
            bubble_size_max: 50.0,
        }
    }
}

/// The charts a selection can be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Bar,
    Map,
    Bubble,
    Pie,
    Options,
}

/// Capacity by canton, stacked by energy source.
#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    pub title: String,
    pub selection: String,
    pub rows: Vec<AggregatedRow>,
}

/// One canton on the choropleth.
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub canton: String,
    pub capacity: f64,
    /// Whether the boundary file has a shape for this canton; `None` when
    /// no boundary file was loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_boundary: Option<bool>,
}

/// Capacity per canton for a map.
#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethMap {
    pub title: String,
    pub selection: String,
    pub regions: Vec<Region>,
    /// Boundary shapes with no capacity in the selection.
    pub regions_without_data: Vec<String>,
}

/// One plant on the bubble map.
#[derive(Debug, Clone, Serialize)]
pub struct Bubble {
    pub project_name: String,
    pub canton: String,
    pub energy_source: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: f64,
    /// Marker size, proportional to the square root of capacity.
    pub size: f64,
}

/// Individual plants positioned by coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct BubbleMap {
    pub title: String,
    pub selection: String,
    pub points: Vec<Bubble>,
    /// Plants in the selection that have no usable coordinates.
    pub skipped: usize,
}

/// One energy source share.
#[derive(Debug, Clone, Serialize)]
pub struct Slice {
    pub energy_source: String,
    pub capacity: f64,
    /// Percentage of the pie, 0 to 100.
    pub share: f64,
}

/// Capacity share per energy source for a canton or the whole country.
#[derive(Debug, Clone, Serialize)]
pub struct PieChart {
    pub title: String,
    pub selection: String,
    pub slices: Vec<Slice>,
    pub total: f64,
}

/// Dropdown contents.
#[derive(Debug, Clone, Serialize)]
pub struct SelectOptions {
    pub energy_sources: Vec<String>,
    pub cantons: Vec<String>,
}

impl SelectOptions {
    /// No choice beyond the leading `"All"`.
    pub fn is_empty(&self) -> bool {
        self.energy_sources.iter().all(|s| s == ALL) && self.cantons.iter().all(|c| c == ALL)
    }
}

/// Any built view.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum View {
    Bar(BarChart),
    Map(ChoroplethMap),
    Bubble(BubbleMap),
    Pie(PieChart),
    Options(SelectOptions),
}

impl View {
    /// Whether the view has nothing to plot.
    pub fn is_empty(&self) -> bool {
        match self {
            View::Bar(v) => v.rows.is_empty(),
            View::Map(v) => v.regions.is_empty(),
            View::Bubble(v) => v.points.is_empty(),
            View::Pie(v) => v.slices.is_empty(),
            View::Options(v) => v.is_empty(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            View::Bar(v) => &v.title,
            View::Map(v) => &v.title,
            View::Bubble(v) => &v.title,
            View::Pie(v) => &v.title,
            View::Options(_) => "Selections",
        }
    }
}

/// Build one view from a dropdown selection.
///
/// The selection names an energy source for bar, map and bubble views and
/// a canton display name for the pie view; `"All"` means no filter.
pub fn build_view(
    kind: ViewKind,
    records: &[PlantRecord],
    selection: &str,
    boundaries: Option<&Boundaries>,
    settings: &ViewSettings,
) -> View {
    match kind {
        ViewKind::Bar => View::Bar(bar_chart(records, &Filter::source(selection), settings)),
        ViewKind::Map => View::Map(choropleth(
            records,
            &Filter::source(selection),
            boundaries,
            settings,
        )),
        ViewKind::Bubble => View::Bubble(bubble_map(records, &Filter::source(selection), settings)),
        ViewKind::Pie => View::Pie(pie_chart(records, &Filter::canton(selection), settings)),
        ViewKind::Options => View::Options(select_options(records, settings.level)),
    }
}

/// Stacked bar data: capacity by (canton, energy source).
pub fn bar_chart(records: &[PlantRecord], filter: &Filter, settings: &ViewSettings) -> BarChart {
    let rows = aggregate(records, Dimension::CantonAndSource, filter, settings.level);

    BarChart {
        title: format!(
            "Total Electrical Capacity by Canton ({} Energy Source)",
            filter.label()
        ),
        selection: filter.label().to_string(),
        rows,
    }
}

/// Choropleth data: capacity by canton, checked against boundary names.
pub fn choropleth(
    records: &[PlantRecord],
    filter: &Filter,
    boundaries: Option<&Boundaries>,
    settings: &ViewSettings,
) -> ChoroplethMap {
    let rows = aggregate(records, Dimension::Canton, filter, settings.level);

    let regions: Vec<Region> = rows
        .into_iter()
        .map(|row| {
            let canton = row.canton.unwrap_or_default();
            Region {
                has_boundary: boundaries.map(|b| b.contains(&canton)),
                canton,
                capacity: row.capacity,
            }
        })
        .collect();

    let regions_without_data = boundaries
        .map(|b| {
            b.names()
                .filter(|name| !regions.iter().any(|r| r.canton == *name))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    ChoroplethMap {
        title: format!(
            "Total Electrical Capacity for {} by Canton",
            filter.label()
        ),
        selection: filter.label().to_string(),
        regions,
        regions_without_data,
    }
}

/// Bubble map data: one point per plant with coordinates.
pub fn bubble_map(records: &[PlantRecord], filter: &Filter, settings: &ViewSettings) -> BubbleMap {
    let selected: Vec<&PlantRecord> = records
        .iter()
        .filter(|r| filter.matches(r, settings.level))
        .collect();

    let max_capacity = selected
        .iter()
        .map(|r| r.capacity())
        .fold(0.0f64, f64::max);

    let points: Vec<Bubble> = selected
        .iter()
        .filter_map(|r| {
            let (latitude, longitude) = r.coordinates()?;
            let capacity = r.capacity();
            Some(Bubble {
                project_name: r.project_name.clone(),
                canton: r.canton_name().to_string(),
                energy_source: r.source(settings.level).to_string(),
                latitude,
                longitude,
                capacity,
                size: marker_size(capacity, max_capacity, settings.bubble_size_max),
            })
        })
        .collect();

    let title = match filter {
        Filter::All => "Bubble Chart of Electrical Capacity in Switzerland".to_string(),
        other => format!(
            "Bubble Chart of Electrical Capacity for {} in Switzerland",
            other.label()
        ),
    };

    BubbleMap {
        title,
        selection: filter.label().to_string(),
        skipped: selected.len() - points.len(),
        points,
    }
}

/// Area-proportional marker size.
fn marker_size(capacity: f64, max_capacity: f64, size_max: f64) -> f64 {
    if max_capacity <= 0.0 || capacity <= 0.0 {
        return 0.0;
    }
    size_max * (capacity / max_capacity).sqrt()
}

/// Pie data: capacity by energy source with percentage shares.
pub fn pie_chart(records: &[PlantRecord], filter: &Filter, settings: &ViewSettings) -> PieChart {
    let rows = aggregate(records, Dimension::EnergySource, filter, settings.level);
    let total = total_capacity(records, filter, settings.level);

    let slices = rows
        .into_iter()
        .map(|row| Slice {
            share: if total > 0.0 {
                row.capacity / total * 100.0
            } else {
                0.0
            },
            energy_source: row.energy_source.unwrap_or_default(),
            capacity: row.capacity,
        })
        .collect();

    let place = match filter {
        Filter::All => "Switzerland",
        other => other.label(),
    };

    PieChart {
        title: format!("{} - Renewable Energy Capacity Distribution", place),
        selection: filter.label().to_string(),
        slices,
        total,
    }
}

/// Dropdown options, each starting with `"All"`.
pub fn select_options(records: &[PlantRecord], level: SourceLevel) -> SelectOptions {
    let with_all = |mut values: Vec<String>| {
        values.insert(0, ALL.to_string());
        values
    };

    SelectOptions {
        energy_sources: with_all(distinct_sources(records, level)),
        cantons: with_all(distinct_cantons(records)),
    }
}
