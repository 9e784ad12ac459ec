//! Forecast module - trend fitting and chart table composition

mod composer;
mod regression;

pub use composer::{compose, CompositeRow, CompositeTable};
pub use regression::{least_squares, ForecastError, ForecastRow, Forecaster, LinearFit};
