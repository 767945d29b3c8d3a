//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::ViewKind;
use crate::models::SourceLevel;
use clap::Parser;
use std::path::PathBuf;

/// RPP Explorer - Swiss renewable power plant capacity explorer
///
/// Aggregates installed electrical capacity by canton and energy source
/// and prints the data behind the stacked bar, choropleth, bubble and
/// pie charts as Markdown or JSON.
///
/// Examples:
///   rpp-explorer
///   rpp-explorer --view bar --source Wind
///   rpp-explorer --view pie --canton "St. Gallen" --format json
///   rpp-explorer --data plants.csv --view map --output map.md
///   rpp-explorer --preview data/mpg.csv
///   rpp-explorer --explore
///   rpp-explorer --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Renewable power plant CSV to load
    ///
    /// Defaults to the config file setting, then data/renewable_power_plants_CH.csv.
    #[arg(short, long, value_name = "FILE", env = "RPP_DATA")]
    pub data: Option<PathBuf>,

    /// Canton boundary GeoJSON used by the map view
    #[arg(long, value_name = "FILE")]
    pub boundaries: Option<PathBuf>,

    /// Which chart data to produce
    #[arg(long, default_value = "all", value_name = "VIEW")]
    pub view: ViewArg,

    /// Energy source selection for bar, map and bubble views ("All" for no filter)
    #[arg(short, long, default_value = "All", value_name = "SOURCE")]
    pub source: String,

    /// Canton selection for the pie view ("All" for the whole country)
    #[arg(long, default_value = "All", value_name = "CANTON")]
    pub canton: String,

    /// Energy source granularity
    #[arg(long, value_name = "LEVEL")]
    pub level: Option<LevelArg>,

    /// Fail loading when a plant has an unknown canton code
    ///
    /// By default such plants are kept and labelled "Unmapped (<code>)".
    #[arg(long)]
    pub strict: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .rpp-explorer.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the first rows of the plant table before the charts
    #[arg(long)]
    pub show_data: bool,

    /// Preview a CSV file (defaults to the fuel-economy table) and exit
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    pub preview: Option<Option<PathBuf>>,

    /// Number of rows shown by previews
    #[arg(long, value_name = "COUNT")]
    pub rows: Option<usize>,

    /// Read selections from stdin, one per line, and print each view
    #[arg(long, conflicts_with = "output")]
    pub explore: bool,

    /// Exit with code 2 when the requested view has no rows
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .rpp-explorer.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Chart selection for --view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewArg {
    Bar,
    Map,
    Bubble,
    Pie,
    Options,
    /// Every chart, as a full report
    All,
}

impl ViewArg {
    /// The views to build, in report order.
    pub fn kinds(self) -> Vec<ViewKind> {
        match self {
            ViewArg::Bar => vec![ViewKind::Bar],
            ViewArg::Map => vec![ViewKind::Map],
            ViewArg::Bubble => vec![ViewKind::Bubble],
            ViewArg::Pie => vec![ViewKind::Pie],
            ViewArg::Options => vec![ViewKind::Options],
            ViewArg::All => vec![
                ViewKind::Bar,
                ViewKind::Map,
                ViewKind::Bubble,
                ViewKind::Pie,
            ],
        }
    }

    /// Whether the boundary file is needed.
    pub fn needs_boundaries(self) -> bool {
        matches!(self, ViewArg::Map | ViewArg::All)
    }
}

/// Energy source granularity for --level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LevelArg {
    /// energy_source_level_2 (Hydro, Wind, Solar, Bioenergy)
    Broad,
    /// energy_source_level_3
    Detailed,
}

impl From<LevelArg> for SourceLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Broad => SourceLevel::Broad,
            LevelArg::Detailed => SourceLevel::Detailed,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.rows == Some(0) {
            return Err("Rows must be at least 1".to_string());
        }

        if self.source.trim().is_empty() {
            return Err(
                "Energy source selection cannot be empty (use \"All\")".to_string(),
            );
        }

        if self.canton.trim().is_empty() {
            return Err("Canton selection cannot be empty (use \"All\")".to_string());
        }

        // Validate output directory if provided
        if let Some(ref output) = self.output {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() && !parent.is_dir() {
                    return Err(format!(
                        "Output directory does not exist: {}",
                        parent.display()
                    ));
                }
            }
        }

        Ok(())
    }

    /// Selection string for a view kind.
    pub fn selection_for(&self, kind: ViewKind) -> &str {
        match kind {
            ViewKind::Pie => &self.canton,
            _ => &self.source,
        }
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `[general] verbose` setting; `--quiet` wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: None,
            boundaries: None,
            view: ViewArg::All,
            source: "All".to_string(),
            canton: "All".to_string(),
            level: None,
            strict: false,
            format: OutputFormat::Markdown,
            output: None,
            config: None,
            show_data: false,
            preview: None,
            rows: None,
            explore: false,
            fail_on_empty: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "rpp-explorer",
            "--view",
            "pie",
            "--canton",
            "St. Gallen",
            "--level",
            "detailed",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.view, ViewArg::Pie);
        assert_eq!(args.selection_for(ViewKind::Pie), "St. Gallen");
        assert_eq!(args.selection_for(ViewKind::Bar), "All");
        assert_eq!(args.level, Some(LevelArg::Detailed));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_preview_without_value() {
        let args = Args::try_parse_from(["rpp-explorer", "--preview"]).unwrap();
        assert_eq!(args.preview, Some(None));

        let args = Args::try_parse_from(["rpp-explorer", "--preview", "cars.csv"])
            .unwrap();
        assert_eq!(args.preview, Some(Some(PathBuf::from("cars.csv"))));
    }

    #[test]
    fn test_view_kinds() {
        assert_eq!(ViewArg::All.kinds().len(), 4);
        assert_eq!(ViewArg::Map.kinds(), vec![ViewKind::Map]);
        assert!(ViewArg::All.needs_boundaries());
        assert!(!ViewArg::Pie.needs_boundaries());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rows_and_selection() {
        let mut args = make_args();
        assert!(args.validate().is_ok());

        args.rows = Some(0);
        assert!(args.validate().is_err());

        args.rows = Some(5);
        args.source = "  ".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_output_dir() {
        let mut args = make_args();
        args.output = Some(PathBuf::from("no/such/dir/report.md"));
        assert!(args.validate().is_err());

        args.output = Some(PathBuf::from("report.md"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
