//! Synthetic Data Generator Module
//! Produces random yearly financial metrics for the dashboard.

use super::table::{MetricTable, Observation, TableError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::{Range, RangeInclusive};
use tracing::debug;

/// Integer bounds are inclusive: 150 and 50 can be drawn.
pub const REVENUE_RANGE: RangeInclusive<i64> = 80..=150;
pub const NET_PROFIT_RANGE: RangeInclusive<i64> = 10..=50;
pub const DEBT_RATIO_RANGE: Range<f64> = 20.0..60.0;
pub const EPS_RANGE: Range<f64> = 1.5..4.5;

/// Draws uniformly distributed metrics for each year of a range.
pub struct MetricGenerator {
    rng: StdRng,
}

impl Default for MetricGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricGenerator {
    /// Generator seeded from OS entropy, every session differs.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible tables.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate one row per year in `[year_start, year_end]`.
    ///
    /// An inverted range yields an empty table.
    pub fn generate(&mut self, year_start: i32, year_end: i32) -> Result<MetricTable, TableError> {
        let observations: Vec<Observation> = (year_start..=year_end)
            .map(|year| Observation {
                year,
                revenue: self.rng.gen_range(REVENUE_RANGE),
                net_profit: self.rng.gen_range(NET_PROFIT_RANGE),
                debt_ratio: self.rng.gen_range(DEBT_RATIO_RANGE),
                earnings_per_share: self.rng.gen_range(EPS_RANGE),
            })
            .collect();

        debug!(year_start, year_end, rows = observations.len(), "generated metric table");
        MetricTable::from_observations(&observations)
    }
}

/// Generate a table with a fresh entropy-seeded generator.
pub fn generate(year_start: i32, year_end: i32) -> Result<MetricTable, TableError> {
    MetricGenerator::new().generate(year_start, year_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{DEBT_RATIO, EARNINGS_PER_SHARE};

    #[test]
    fn years_span_requested_range() {
        let table = MetricGenerator::with_seed(7).generate(2018, 2024).unwrap();
        assert_eq!(table.years(), (2018..=2024).collect::<Vec<_>>());
    }

    #[test]
    fn values_stay_in_range() {
        let table = MetricGenerator::with_seed(42).generate(1990, 2030).unwrap();
        for row in table.rows().unwrap() {
            assert!(REVENUE_RANGE.contains(&row.revenue));
            assert!(NET_PROFIT_RANGE.contains(&row.net_profit));
            assert!(DEBT_RATIO_RANGE.contains(&row.debt_ratio));
            assert!(EPS_RANGE.contains(&row.earnings_per_share));
        }
    }

    #[test]
    fn integer_bounds_are_inclusive() {
        let rows = MetricGenerator::with_seed(8).generate(1, 3000).unwrap().rows().unwrap();
        let revenue: Vec<i64> = rows.iter().map(|r| r.revenue).collect();
        let profit: Vec<i64> = rows.iter().map(|r| r.net_profit).collect();

        assert_eq!(revenue.iter().min(), Some(REVENUE_RANGE.start()));
        assert_eq!(revenue.iter().max(), Some(REVENUE_RANGE.end()));
        assert_eq!(profit.iter().min(), Some(NET_PROFIT_RANGE.start()));
        assert_eq!(profit.iter().max(), Some(NET_PROFIT_RANGE.end()));
    }

    #[test]
    fn growth_matches_formula() {
        let rows = MetricGenerator::with_seed(3).generate(2018, 2024).unwrap().rows().unwrap();
        assert!(rows[0].revenue_yoy_pct.is_none());
        for pair in rows.windows(2) {
            let expected =
                (pair[1].revenue - pair[0].revenue) as f64 / pair[0].revenue as f64 * 100.0;
            assert!((pair[1].revenue_yoy_pct.unwrap() - expected).abs() < 1e-9);
            let expected =
                (pair[1].net_profit - pair[0].net_profit) as f64 / pair[0].net_profit as f64 * 100.0;
            assert!((pair[1].profit_yoy_pct.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn same_seed_same_table() {
        let a = MetricGenerator::with_seed(11).generate(2018, 2024).unwrap();
        let b = MetricGenerator::with_seed(11).generate(2018, 2024).unwrap();
        assert_eq!(a.rows().unwrap(), b.rows().unwrap());
        assert_eq!(
            a.numeric_values(DEBT_RATIO).unwrap(),
            b.numeric_values(DEBT_RATIO).unwrap()
        );
        assert_eq!(
            a.numeric_values(EARNINGS_PER_SHARE).unwrap(),
            b.numeric_values(EARNINGS_PER_SHARE).unwrap()
        );
    }

    #[test]
    fn inverted_range_is_empty() {
        let table = MetricGenerator::with_seed(1).generate(2024, 2018).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn single_year() {
        let table = generate(2024, 2024).unwrap();
        assert_eq!(table.height(), 1);
    }
}
