//! RPP Explorer - Swiss renewable power plant capacity explorer
//!
//! A CLI tool that loads the Swiss renewable power plant table, aggregates
//! installed capacity by canton and energy source, and prints the data
//! behind the dashboard charts as Markdown or JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing input file, parse failure, invalid arguments)
//!   2 - A requested view was empty and --fail-on-empty was set

mod analysis;
mod cantons;
mod cli;
mod config;
mod data;
mod error;
mod models;
mod report;
mod session;

use analysis::{build_view, View, ViewSettings};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, ConfigOrigin, CONFIG_FILE};
use data::{preview_csv, Boundaries, DatasetCache};
use error::DataError;
use report::{Report, ReportMetadata};
use session::{Response, Session, UiEvent};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is resolved first so that `[general] verbose` can raise the log level.
    let (mut config, origin) = match Config::resolve(args.config.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("RPP Explorer v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match origin {
        ConfigOrigin::File(path) => info!("Loaded config from {}", path.display()),
        ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
        ConfigOrigin::Invalid(e) => warn!("Failed to load config: {:#}", e),
    }

    match run(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .rpp-explorer.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to point at your data files.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so that reports printed to stdout stay clean.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the requested views. Returns exit code (0 or 2).
fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    if args.preview.is_some() {
        return handle_preview(&config, &args);
    }

    // Load the plant table once; every view below shares this snapshot.
    let mut cache = DatasetCache::new(config.load_options(!args.quiet));
    let dataset = cache
        .get_or_load(&config.data.plants)
        .with_context(|| {
            format!(
                "Failed to load plant data from {}",
                config.data.plants.display()
            )
        })?;

    if dataset.is_empty() {
        warn!("{} contains no plants", config.data.plants.display());
    }

    let settings = ViewSettings {
        level: config.pipeline.source_level,
        bubble_size_max: config.report.bubble_size_max,
    };

    let boundaries = if args.explore || args.view.needs_boundaries() {
        load_boundaries(&args, &config)?
    } else {
        None
    };

    if args.explore {
        let session = Session::new(cache, dataset, boundaries.map(Arc::new), settings);
        return run_explore(session, args.format);
    }

    let data_preview = if args.show_data {
        Some(
            preview_csv(&config.data.plants, config.report.preview_rows)
                .context("Failed to preview plant data")?,
        )
    } else {
        None
    };

    let views: Vec<View> = args
        .view
        .kinds()
        .into_iter()
        .map(|kind| {
            build_view(
                kind,
                dataset.records(),
                args.selection_for(kind),
                boundaries.as_ref(),
                &settings,
            )
        })
        .collect();

    let report = Report {
        metadata: ReportMetadata {
            dataset: config.data.plants.display().to_string(),
            boundaries: boundaries
                .as_ref()
                .map(|b| b.path().display().to_string()),
            generated_at: Utc::now(),
            records: dataset.len(),
            total_capacity: dataset.total_capacity(settings.level),
            source_level: settings.level,
            unmapped_cantons: dataset.unmapped_codes().clone(),
        },
        data_preview,
        views,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    emit(&output, args.output.as_deref())?;

    info!(
        "Built {} view(s) from {} plants in {:.2}s",
        report.views.len(),
        dataset.len(),
        start_time.elapsed().as_secs_f64()
    );

    if args.fail_on_empty {
        let empty: Vec<&str> = report
            .views
            .iter()
            .filter(|v| v.is_empty())
            .map(View::title)
            .collect();

        if !empty.is_empty() {
            eprintln!(
                "\n⛔ Empty view(s): {}. Failing (exit code 2).",
                empty.join("; ")
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Handle --preview: print the head of a CSV file and exit.
fn handle_preview(config: &Config, args: &Args) -> Result<i32> {
    let path = &config.data.preview;
    info!("Previewing {}", path.display());

    let preview = preview_csv(path, config.report.preview_rows)
        .with_context(|| format!("Failed to preview {}", path.display()))?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json(&preview)?,
        OutputFormat::Markdown => report::generate_preview_markdown(&preview),
    };

    emit(&output, args.output.as_deref())?;
    Ok(0)
}

/// Handle --explore: one event per stdin line until `quit` or end of input.
fn run_explore(mut session: Session, format: OutputFormat) -> Result<i32> {
    println!(
        "🔎 Exploring {} plants from {}",
        session.dataset().len(),
        session.dataset().path().display()
    );
    println!("{}\n", session::HELP);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let event = match line.parse::<UiEvent>() {
            Ok(event) => event,
            Err(msg) => {
                eprintln!("⚠️  {}", msg);
                continue;
            }
        };

        match session.handle(event) {
            Ok(Response::View(view)) => {
                let rendered = match format {
                    OutputFormat::Json => report::generate_json(&*view)?,
                    OutputFormat::Markdown => report::generate_view_markdown(&view),
                };
                println!("{}", rendered);
            }
            Ok(Response::Loaded { path, records }) => {
                println!("✅ Loaded {} plants from {}", records, path.display());
            }
            Ok(Response::Help(text)) => println!("{}", text),
            Ok(Response::Quit) => break,
            Err(e) => eprintln!("❌ {:#}", e),
        }
    }

    Ok(0)
}

/// Write output to a file, or to stdout when no file is given.
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            println!("✅ Output saved to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Load the boundary file for the map view.
///
/// A missing file is only fatal when it was named on the command line;
/// otherwise the map is built without boundary checks.
fn load_boundaries(args: &Args, config: &Config) -> Result<Option<Boundaries>> {
    let path = &config.data.boundaries;

    match Boundaries::load(path, &config.data.boundary_key) {
        Ok(boundaries) => {
            info!(
                "Loaded {} canton boundaries from {}",
                boundaries.feature_count(),
                path.display()
            );
            Ok(Some(boundaries))
        }
        Err(DataError::Open { .. }) if args.boundaries.is_none() => {
            warn!(
                "Boundary file {} not found; map regions are not checked against boundaries",
                path.display()
            );
            Ok(None)
        }
        Err(e) => Err(e)
            .with_context(|| format!("Failed to load boundaries from {}", path.display())),
    }
}
