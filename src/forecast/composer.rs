//! View Composer Module
//! Merges historical rows and forecast rows into one chart-ready table.

use super::regression::ForecastRow;
use crate::data::table::COLUMNS;
use crate::data::MetricTable;
use polars::prelude::PolarsError;
use std::collections::{BTreeMap, BTreeSet};

/// One row of the composite table.
///
/// Forecast rows are sparse: they only carry the metrics that were forecast
/// for their year.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeRow {
    pub year: i32,
    pub values: BTreeMap<String, f64>,
    pub is_forecast: bool,
}

impl CompositeRow {
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

/// Historical rows followed by forecast rows, year ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeTable {
    rows: Vec<CompositeRow>,
    selected: Vec<String>,
}

impl CompositeTable {
    pub fn rows(&self) -> &[CompositeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metrics the user chose to chart.
    pub fn selected_metrics(&self) -> &[String] {
        &self.selected
    }

    pub fn historical_len(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_forecast).count()
    }

    pub fn forecast_years(&self) -> Vec<i32> {
        self.rows
            .iter()
            .filter(|r| r.is_forecast)
            .map(|r| r.year)
            .collect()
    }

    /// Every (year, value) point of a metric, historical and forecast.
    pub fn series(&self, metric: &str) -> Vec<(i32, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.value(metric).map(|v| (r.year, v)))
            .collect()
    }

    pub fn historical_series(&self, metric: &str) -> Vec<(i32, f64)> {
        self.rows
            .iter()
            .filter(|r| !r.is_forecast)
            .filter_map(|r| r.value(metric).map(|v| (r.year, v)))
            .collect()
    }

    /// Forecast points of a metric, prefixed with the last historical point
    /// so a chart can draw the projection as a continuation.
    /// Empty when the metric was not forecast.
    pub fn forecast_series(&self, metric: &str) -> Vec<(i32, f64)> {
        let projected: Vec<(i32, f64)> = self
            .rows
            .iter()
            .filter(|r| r.is_forecast)
            .filter_map(|r| r.value(metric).map(|v| (r.year, v)))
            .collect();
        if projected.is_empty() {
            return projected;
        }

        let mut series: Vec<(i32, f64)> = self
            .historical_series(metric)
            .last()
            .copied()
            .into_iter()
            .collect();
        series.extend(projected);
        series
    }

    /// Smallest and largest year across all rows.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let first = self.rows.first()?.year;
        let last = self.rows.last()?.year;
        Some((first, last))
    }
}

/// Merge the historical table with per-metric forecasts.
///
/// Historical rows are copied unmodified; each distinct forecast year
/// becomes one row holding only the metrics forecast for that year.
pub fn compose(
    table: &MetricTable,
    forecasts: &BTreeMap<String, Vec<ForecastRow>>,
    selected: &BTreeSet<String>,
) -> Result<CompositeTable, PolarsError> {
    let mut rows: Vec<CompositeRow> = table
        .rows()?
        .into_iter()
        .map(|row| CompositeRow {
            year: row.year,
            values: COLUMNS
                .iter()
                .filter_map(|&col| row.value(col).map(|v| (col.to_string(), v)))
                .collect(),
            is_forecast: false,
        })
        .collect();

    let mut projected: BTreeMap<i32, BTreeMap<String, f64>> = BTreeMap::new();
    for forecast_rows in forecasts.values() {
        for forecast in forecast_rows {
            let values = projected.entry(forecast.year).or_default();
            for (metric, value) in &forecast.values {
                values.insert(metric.clone(), *value);
            }
        }
    }

    rows.extend(projected.into_iter().map(|(year, values)| CompositeRow {
        year,
        values,
        is_forecast: true,
    }));

    Ok(CompositeTable {
        rows,
        selected: selected.iter().cloned().collect(),
    })
}
