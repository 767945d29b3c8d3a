//! Analysis modules.
//!
//! The aggregation pipeline and the chart datasets built on top of it.

pub mod aggregator;
pub mod views;

pub use aggregator::*;
pub use views::{build_view, View, ViewKind, ViewSettings};
