//! Data module - metric table, synthetic generation and caching

mod cache;
mod generator;
pub mod table;

pub use cache::{Clock, GeneratedTableSource, SystemClock, TableCache, TableSource, DEFAULT_TTL};
pub use generator::{generate, MetricGenerator};
pub use table::{Metric, MetricRow, MetricTable, Observation, TableError};
