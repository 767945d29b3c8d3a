//! Input files: plant table, canton boundaries and raw CSV previews.

pub mod boundary;
pub mod cache;
pub mod loader;
pub mod preview;

pub use boundary::Boundaries;
pub use cache::DatasetCache;
pub use loader::{Dataset, LoadOptions, UnmappedPolicy};
pub use preview::{preview_csv, CsvPreview};
