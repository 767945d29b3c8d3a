//! Markdown and JSON report generation.
//!
//! Renders built views, full reports and CSV previews. Markdown output is
//! a set of tables; JSON output serialises the same structures directly.

use crate::analysis::views::{BarChart, BubbleMap, ChoroplethMap, PieChart, SelectOptions};
use crate::analysis::View;
use crate::data::CsvPreview;
use crate::models::SourceLevel;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata about the dataset a report was built from.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Plant CSV path.
    pub dataset: String,
    /// Boundary file path, if one was loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundaries: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub records: usize,
    pub total_capacity: f64,
    pub source_level: SourceLevel,
    /// Canton codes missing from the lookup table, with plant counts.
    pub unmapped_cantons: BTreeMap<String, usize>,
}

/// A complete report: metadata plus the requested views.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Leading rows of the plant table, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_preview: Option<CsvPreview>,
    pub views: Vec<View>,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Renewable Power Plants in Switzerland\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    if let Some(ref preview) = report.data_preview {
        output.push_str(&generate_preview_markdown(preview));
    }

    if report.views.len() > 1 {
        output.push_str(&generate_table_of_contents(&report.views));
    }

    for view in &report.views {
        output.push_str(&generate_view_markdown(view));
    }

    output.push_str(&generate_footer());
    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.dataset));
    if let Some(ref boundaries) = metadata.boundaries {
        section.push_str(&format!("- **Boundaries:** `{}`\n", boundaries));
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Plants:** {}\n", metadata.records));
    section.push_str(&format!(
        "- **Total Electrical Capacity:** {:.2}\n",
        metadata.total_capacity
    ));
    let level = match metadata.source_level {
        SourceLevel::Broad => "energy_source_level_2",
        SourceLevel::Detailed => "energy_source_level_3",
    };
    section.push_str(&format!("- **Energy Source Column:** `{}`\n", level));

    if !metadata.unmapped_cantons.is_empty() {
        let codes: Vec<String> = metadata
            .unmapped_cantons
            .iter()
            .map(|(code, count)| format!("`{}` ({})", code, count))
            .collect();
        section.push_str(&format!(
            "- **⚠️ Unmapped Canton Codes:** {}\n",
            codes.join(", ")
        ));
    }

    section.push('\n');
    section
}

/// Generate the table of contents.
fn generate_table_of_contents(views: &[View]) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    for view in views {
        let title = view.title();
        toc.push_str(&format!("- [{}](#{})\n", title, anchor(title)));
    }
    toc.push('\n');

    toc
}

/// Render one view as a Markdown section.
pub fn generate_view_markdown(view: &View) -> String {
    let mut section = format!("## {}\n\n", view.title());

    let body = match view {
        View::Bar(chart) => bar_table(chart),
        View::Map(map) => map_table(map),
        View::Bubble(map) => bubble_table(map),
        View::Pie(pie) => pie_table(pie),
        View::Options(options) => options_list(options),
    };

    if view.is_empty() {
        section.push_str("_No plants match this selection._\n\n");
    } else {
        section.push_str(&body);
    }

    section
}

fn bar_table(chart: &BarChart) -> String {
    let mut table = String::new();

    table.push_str("| Canton | Energy Source | Total Electrical Capacity |\n");
    table.push_str("|:---|:---|---:|\n");
    for row in &chart.rows {
        table.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            cell(row.canton.as_deref().unwrap_or("")),
            cell(row.energy_source.as_deref().unwrap_or("")),
            row.capacity
        ));
    }
    table.push('\n');

    table
}

fn map_table(map: &ChoroplethMap) -> String {
    let mut table = String::new();
    let with_boundaries = map.regions.iter().any(|r| r.has_boundary.is_some());

    if with_boundaries {
        table.push_str(&format!(
            "| Canton | {} Capacity | Boundary |\n|:---|---:|:---:|\n",
            cell(&map.selection)
        ));
    } else {
        table.push_str(&format!(
            "| Canton | {} Capacity |\n|:---|---:|\n",
            cell(&map.selection)
        ));
    }

    for region in &map.regions {
        match region.has_boundary {
            Some(found) => table.push_str(&format!(
                "| {} | {:.2} | {} |\n",
                cell(&region.canton),
                region.capacity,
                if found { "✓" } else { "missing" }
            )),
            None => table.push_str(&format!(
                "| {} | {:.2} |\n",
                cell(&region.canton),
                region.capacity
            )),
        }
    }
    table.push('\n');

    if !map.regions_without_data.is_empty() {
        table.push_str(&format!(
            "Cantons without capacity in this selection: {}\n\n",
            map.regions_without_data.join(", ")
        ));
    }

    table
}

fn bubble_table(map: &BubbleMap) -> String {
    let mut table = String::new();

    table.push_str(
        "| Project | Canton | Energy Source | Lat | Lon | Capacity | Size |\n",
    );
    table.push_str("|:---|:---|:---|---:|---:|---:|---:|\n");
    for point in &map.points {
        table.push_str(&format!(
            "| {} | {} | {} | {:.4} | {:.4} | {:.2} | {:.1} |\n",
            cell(&point.project_name),
            cell(&point.canton),
            cell(&point.energy_source),
            point.latitude,
            point.longitude,
            point.capacity,
            point.size
        ));
    }
    table.push('\n');

    if map.skipped > 0 {
        table.push_str(&format!(
            "{} plants without coordinates are not shown.\n\n",
            map.skipped
        ));
    }

    table
}

fn pie_table(pie: &PieChart) -> String {
    let mut table = String::new();

    table.push_str("| Energy Source | Capacity | Share |\n");
    table.push_str("|:---|---:|---:|\n");
    for slice in &pie.slices {
        table.push_str(&format!(
            "| {} | {:.2} | {:.1}% |\n",
            cell(&slice.energy_source),
            slice.capacity,
            slice.share
        ));
    }
    table.push_str(&format!("| **Total** | **{:.2}** | |\n\n", pie.total));

    table
}

fn options_list(options: &SelectOptions) -> String {
    format!(
        "**Energy Sources:** {}\n\n**Cantons:** {}\n\n",
        options.energy_sources.join(", "),
        options.cantons.join(", ")
    )
}

/// Render a CSV preview as a Markdown table.
pub fn generate_preview_markdown(preview: &CsvPreview) -> String {
    let mut output = String::new();

    output.push_str(&format!("## {}\n\n", preview.path.display()));
    output.push_str(&format!(
        "*{} rows, {} columns; showing {}*\n\n",
        preview.total_rows,
        preview.headers.len(),
        preview.rows.len()
    ));

    if preview.headers.is_empty() {
        return output;
    }

    let header: Vec<String> = preview.headers.iter().map(|h| cell(h)).collect();
    output.push_str(&format!("| {} |\n", header.join(" | ")));
    output.push_str(&format!("|{}\n", "---|".repeat(preview.headers.len())));

    for row in &preview.rows {
        let cells: Vec<String> = row.iter().map(|c| cell(c)).collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    output.push('\n');

    output
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by rpp-explorer v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Serialise any view or preview as pretty JSON.
pub fn generate_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

/// Escape a value for use inside a Markdown table cell.
fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn anchor(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' => Some('-'),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}
