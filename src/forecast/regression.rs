//! Trend Forecast Module
//! Ordinary least squares fit of a metric against year, projected forward.

use crate::data::table::YEAR;
use crate::data::MetricTable;
use polars::prelude::PolarsError;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Need at least 2 data points to fit a trend line, found {points}")]
    InsufficientData { points: usize },
    #[error("Unknown metric column: {0}")]
    UnknownMetric(String),
    #[error("Forecast horizon must be at least one year and end at a representable year")]
    InvalidHorizon,
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Fitted line `value = slope * year + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub points: usize,
}

impl LinearFit {
    pub fn predict(&self, year: i32) -> f64 {
        self.slope * year as f64 + self.intercept
    }
}

/// Predicted metric values for one future year.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub year: i32,
    pub values: BTreeMap<String, f64>,
}

impl ForecastRow {
    /// Forecast rows are never historical.
    pub fn is_forecast(&self) -> bool {
        true
    }

    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

/// Least squares slope and intercept, `None` when x has no spread.
pub fn least_squares(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() < 2 || xs.len() != ys.len() {
        return None;
    }

    let x_var = xs.variance();
    if x_var == 0.0 || x_var.is_nan() {
        return None;
    }

    let slope = xs.covariance(ys) / x_var;
    let intercept = ys.mean() - slope * xs.mean();
    Some((slope, intercept))
}

/// Fits and projects trend lines over a metric table.
pub struct Forecaster;

impl Forecaster {
    /// Fit `metric` against year over every non-null row of the table.
    pub fn fit(table: &MetricTable, metric: &str) -> Result<LinearFit, ForecastError> {
        if !table.is_numeric_column(metric) {
            return Err(ForecastError::UnknownMetric(metric.to_string()));
        }

        let years = table.numeric_values(YEAR)?;
        let values = table.numeric_values(metric)?;

        let (xs, ys): (Vec<f64>, Vec<f64>) = years
            .into_iter()
            .zip(values)
            .filter_map(|(x, y)| match (x, y) {
                (Some(x), Some(y)) if y.is_finite() => Some((x, y)),
                _ => None,
            })
            .unzip();

        let points = xs.len();
        let (slope, intercept) =
            least_squares(&xs, &ys).ok_or(ForecastError::InsufficientData { points })?;

        debug!(metric, slope, intercept, points, "fitted trend line");
        Ok(LinearFit {
            slope,
            intercept,
            points,
        })
    }

    /// Predict `metric` for the `horizon` years after the last table year.
    pub fn forecast(
        table: &MetricTable,
        metric: &str,
        horizon: usize,
    ) -> Result<Vec<ForecastRow>, ForecastError> {
        let horizon = i32::try_from(horizon).map_err(|_| ForecastError::InvalidHorizon)?;
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon);
        }

        let fit = Self::fit(table, metric)?;
        let last_year = table
            .last_year()
            .ok_or(ForecastError::InsufficientData { points: 0 })?;
        // the final forecast year must still be a valid year
        last_year
            .checked_add(horizon)
            .ok_or(ForecastError::InvalidHorizon)?;

        Ok((1..=horizon)
            .map(|offset| {
                let year = last_year + offset;
                ForecastRow {
                    year,
                    values: BTreeMap::from([(metric.to_string(), fit.predict(year))]),
                }
            })
            .collect())
    }

    /// Forecast several metrics independently, keyed by metric column.
    pub fn forecast_many(
        table: &MetricTable,
        metrics: &[String],
        horizon: usize,
    ) -> Result<BTreeMap<String, Vec<ForecastRow>>, ForecastError> {
        metrics
            .iter()
            .map(|metric| Ok((metric.clone(), Self::forecast(table, metric, horizon)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{DEBT_RATIO, NET_PROFIT, PROFIT_YOY_PCT, REVENUE};
    use crate::data::Observation;

    fn revenue_table(revenue: &[i64]) -> MetricTable {
        let observations: Vec<Observation> = revenue
            .iter()
            .enumerate()
            .map(|(i, &r)| Observation {
                year: 2018 + i as i32,
                revenue: r,
                net_profit: 20 + i as i64,
                debt_ratio: 30.0,
                earnings_per_share: 2.0,
            })
            .collect();
        MetricTable::from_observations(&observations).unwrap()
    }

    /// Closed-form OLS from raw sums.
    fn reference_ols(xs: &[f64], ys: &[f64]) -> (f64, f64) {
        let n = xs.len() as f64;
        let sx: f64 = xs.iter().sum();
        let sy: f64 = ys.iter().sum();
        let sxx: f64 = xs.iter().map(|x| x * x).sum();
        let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
        let slope = (n * sxy - sx * sy) / (n * sxx - sx * sx);
        (slope, (sy - slope * sx) / n)
    }

    #[test]
    fn matches_independent_ols() {
        let revenue = [100, 110, 121, 133, 146, 160, 176];
        let table = revenue_table(&revenue);

        let rows = Forecaster::forecast(&table, REVENUE, 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2025);
        assert!(rows[0].is_forecast());

        // centre years so the reference does not lose precision
        let xs: Vec<f64> = (0..7).map(|i| i as f64).collect();
        let ys: Vec<f64> = revenue.iter().map(|&r| r as f64).collect();
        let (slope, intercept) = reference_ols(&xs, &ys);
        let expected = slope * 7.0 + intercept;

        let predicted = rows[0].value(REVENUE).unwrap();
        assert!(((predicted - expected) / expected).abs() < 1e-6);
    }

    #[test]
    fn exact_line_is_recovered() {
        let table = revenue_table(&[100, 105, 110, 115]);
        let fit = Forecaster::fit(&table, REVENUE).unwrap();
        assert!((fit.slope - 5.0).abs() < 1e-9);
        assert!((fit.predict(2022) - 120.0).abs() < 1e-6);
        assert_eq!(fit.points, 4);
    }

    #[test]
    fn horizon_extends_consecutive_years() {
        let table = revenue_table(&[100, 105, 110, 115]);
        let rows = Forecaster::forecast(&table, REVENUE, 3).unwrap();
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2022, 2023, 2024]);
        assert!((rows[2].value(REVENUE).unwrap() - 130.0).abs() < 1e-6);
    }

    #[test]
    fn single_row_is_insufficient() {
        let table = revenue_table(&[100]);
        let err = Forecaster::forecast(&table, REVENUE, 1).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { points: 1 }));
    }

    #[test]
    fn empty_table_is_insufficient() {
        let table = revenue_table(&[]);
        let err = Forecaster::forecast(&table, REVENUE, 1).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { points: 0 }));
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let table = revenue_table(&[100, 110]);
        let err = Forecaster::forecast(&table, "dividends", 1).unwrap_err();
        assert!(matches!(err, ForecastError::UnknownMetric(ref m) if m == "dividends"));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let table = revenue_table(&[100, 110]);
        let err = Forecaster::forecast(&table, REVENUE, 0).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidHorizon));
    }

    #[test]
    fn oversized_horizon_is_rejected() {
        let table = revenue_table(&[100, 110]);
        let err = Forecaster::forecast(&table, REVENUE, u32::MAX as usize + 2).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidHorizon));

        let err = Forecaster::forecast(&table, REVENUE, i32::MAX as usize).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidHorizon));
    }

    #[test]
    fn null_points_are_skipped() {
        // first growth value is missing, two remain
        let table = revenue_table(&[100, 110, 121]);
        let fit = Forecaster::fit(&table, PROFIT_YOY_PCT).unwrap();
        assert_eq!(fit.points, 2);

        let short = revenue_table(&[100, 110]);
        let err = Forecaster::fit(&short, PROFIT_YOY_PCT).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { points: 1 }));
    }

    #[test]
    fn forecasts_each_metric() {
        let table = revenue_table(&[100, 110, 120]);
        let metrics = vec![REVENUE.to_string(), NET_PROFIT.to_string(), DEBT_RATIO.to_string()];
        let all = Forecaster::forecast_many(&table, &metrics, 1).unwrap();

        assert_eq!(all.len(), 3);
        assert!((all[NET_PROFIT][0].value(NET_PROFIT).unwrap() - 23.0).abs() < 1e-6);
        assert!((all[DEBT_RATIO][0].value(DEBT_RATIO).unwrap() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn least_squares_needs_spread() {
        assert_eq!(least_squares(&[1.0, 1.0], &[2.0, 3.0]), None);
        assert_eq!(least_squares(&[1.0], &[2.0]), None);
        let (slope, intercept) = least_squares(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
    }
}
