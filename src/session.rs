//! Interactive exploration session.
//!
//! Each user interaction is a [`UiEvent`]. Handling an event runs the
//! aggregation pipeline once over the session's dataset snapshot and
//! returns the resulting view; nothing else is recomputed.

use crate::analysis::{build_view, View, ViewKind, ViewSettings};
use crate::data::{Boundaries, Dataset, DatasetCache};
use crate::models::ALL;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// One user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Show a chart for a selection (`"All"` for no filter).
    Select { view: ViewKind, selection: String },
    /// Switch to another plant file.
    Load(PathBuf),
    Help,
    Quit,
}

impl FromStr for UiEvent {
    type Err = String;

    /// Parse a command line such as `bar Wind`, `pie St. Gallen` or `load data.csv`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        let selection = (if rest.is_empty() { ALL } else { rest }).to_string();

        let view = match command.to_lowercase().as_str() {
            "bar" => ViewKind::Bar,
            "map" => ViewKind::Map,
            "bubble" => ViewKind::Bubble,
            "pie" => ViewKind::Pie,
            "options" => ViewKind::Options,
            "load" if !rest.is_empty() => return Ok(UiEvent::Load(PathBuf::from(rest))),
            "load" => return Err("Usage: load <plants.csv>".to_string()),
            "help" | "?" => return Ok(UiEvent::Help),
            "quit" | "exit" | "q" => return Ok(UiEvent::Quit),
            "" => return Err("Empty command".to_string()),
            other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
        };

        Ok(UiEvent::Select { view, selection })
    }
}

/// Outcome of handling an event.
#[derive(Debug)]
pub enum Response {
    View(Box<View>),
    Loaded { path: PathBuf, records: usize },
    Help(&'static str),
    Quit,
}

pub const HELP: &str = "\
Commands:
  bar [SOURCE]      capacity by canton stacked by energy source
  map [SOURCE]      capacity per canton for the choropleth
  bubble [SOURCE]   individual plants with coordinates
  pie [CANTON]      energy source shares for a canton
  options           list selectable sources and cantons
  load FILE         switch to another plant CSV
  quit              leave the session
A missing selection means All.";

/// Holds the current dataset snapshot and answers events.
pub struct Session {
    cache: DatasetCache,
    dataset: Arc<Dataset>,
    boundaries: Option<Arc<Boundaries>>,
    settings: ViewSettings,
}

impl Session {
    pub fn new(
        cache: DatasetCache,
        dataset: Arc<Dataset>,
        boundaries: Option<Arc<Boundaries>>,
        settings: ViewSettings,
    ) -> Self {
        Self {
            cache,
            dataset,
            boundaries,
            settings,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Handle one event.
    ///
    /// Only `Load` can fail; a failed load leaves the current dataset in place.
    pub fn handle(&mut self, event: UiEvent) -> Result<Response> {
        debug!("Handling event: {:?}", event);

        match event {
            UiEvent::Select { view, selection } => {
                let built = build_view(
                    view,
                    self.dataset.records(),
                    &selection,
                    self.boundaries.as_deref(),
                    &self.settings,
                );
                Ok(Response::View(Box::new(built)))
            }
            UiEvent::Load(path) => {
                let dataset = self
                    .cache
                    .get_or_load(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                info!(
                    "Session switched to {} ({} dataset(s) cached)",
                    path.display(),
                    self.cache.len()
                );
                let records = dataset.len();
                self.dataset = dataset;
                Ok(Response::Loaded { path, records })
            }
            UiEvent::Help => Ok(Response::Help(HELP)),
            UiEvent::Quit => Ok(Response::Quit),
        }
    }
}
