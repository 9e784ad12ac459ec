//! Metric Table Module
//! Immutable yearly metric table backed by a Polars DataFrame.

use polars::prelude::*;
use thiserror::Error;

pub const YEAR: &str = "year";
pub const REVENUE: &str = "revenue";
pub const NET_PROFIT: &str = "net_profit";
pub const DEBT_RATIO: &str = "debt_ratio";
pub const EARNINGS_PER_SHARE: &str = "earnings_per_share";
pub const REVENUE_YOY_PCT: &str = "revenue_yoy_pct";
pub const PROFIT_YOY_PCT: &str = "profit_yoy_pct";

/// Column order of every metric table.
pub const COLUMNS: [&str; 7] = [
    YEAR,
    REVENUE,
    NET_PROFIT,
    DEBT_RATIO,
    EARNINGS_PER_SHARE,
    REVENUE_YOY_PCT,
    PROFIT_YOY_PCT,
];

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Years must be contiguous and ascending, found {next} after {prev}")]
    NonContiguousYears { prev: i32, next: i32 },
}

/// One of the four base metrics a user can chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Revenue,
    NetProfit,
    DebtRatio,
    EarningsPerShare,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Revenue,
        Metric::NetProfit,
        Metric::DebtRatio,
        Metric::EarningsPerShare,
    ];

    /// Column name in the metric table.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Revenue => REVENUE,
            Metric::NetProfit => NET_PROFIT,
            Metric::DebtRatio => DEBT_RATIO,
            Metric::EarningsPerShare => EARNINGS_PER_SHARE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue",
            Metric::NetProfit => "Net Profit",
            Metric::DebtRatio => "Debt Ratio",
            Metric::EarningsPerShare => "Earnings per Share",
        }
    }

    /// Short explanation shown in the metric glossary.
    pub fn description(self) -> &'static str {
        match self {
            Metric::Revenue => "Total income from the core business",
            Metric::NetProfit => "Earnings left after all costs and expenses",
            Metric::DebtRatio => "Total liabilities / total assets × 100%",
            Metric::EarningsPerShare => "Net profit / shares outstanding",
        }
    }

    pub fn from_column(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.column() == name)
    }
}

/// Source fields of one year, before derived columns are computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub year: i32,
    pub revenue: i64,
    pub net_profit: i64,
    pub debt_ratio: f64,
    pub earnings_per_share: f64,
}

/// One year of the metric table, including derived growth columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub year: i32,
    pub revenue: i64,
    pub net_profit: i64,
    pub debt_ratio: f64,
    pub earnings_per_share: f64,
    pub revenue_yoy_pct: Option<f64>,
    pub profit_yoy_pct: Option<f64>,
}

impl MetricRow {
    /// Value of a column as a float, `None` for unknown columns and missing values.
    pub fn value(&self, column: &str) -> Option<f64> {
        match column {
            YEAR => Some(self.year as f64),
            REVENUE => Some(self.revenue as f64),
            NET_PROFIT => Some(self.net_profit as f64),
            DEBT_RATIO => Some(self.debt_ratio),
            EARNINGS_PER_SHARE => Some(self.earnings_per_share),
            REVENUE_YOY_PCT => self.revenue_yoy_pct,
            PROFIT_YOY_PCT => self.profit_yoy_pct,
            _ => None,
        }
    }
}

/// Year-over-year change in percent. `None` when the previous value is zero.
pub fn yoy_pct(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

fn yoy_column(values: &[i64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(
        values
            .windows(2)
            .map(|pair| yoy_pct(pair[0] as f64, pair[1] as f64)),
    );
    out
}

/// Yearly metrics ordered by contiguous, strictly increasing year.
///
/// The growth columns are always derived from the revenue and profit columns
/// at construction; the table is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct MetricTable {
    df: DataFrame,
}

impl MetricTable {
    /// Build a table from observations, deriving the YoY columns.
    pub fn from_observations(observations: &[Observation]) -> Result<Self, TableError> {
        for pair in observations.windows(2) {
            if pair[1].year != pair[0].year + 1 {
                return Err(TableError::NonContiguousYears {
                    prev: pair[0].year,
                    next: pair[1].year,
                });
            }
        }

        let years: Vec<i32> = observations.iter().map(|o| o.year).collect();
        let revenue: Vec<i64> = observations.iter().map(|o| o.revenue).collect();
        let net_profit: Vec<i64> = observations.iter().map(|o| o.net_profit).collect();
        let debt_ratio: Vec<f64> = observations.iter().map(|o| o.debt_ratio).collect();
        let eps: Vec<f64> = observations
            .iter()
            .map(|o| o.earnings_per_share)
            .collect();
        let revenue_yoy = yoy_column(&revenue);
        let profit_yoy = yoy_column(&net_profit);

        let df = DataFrame::new(vec![
            Column::new(YEAR.into(), years),
            Column::new(REVENUE.into(), revenue),
            Column::new(NET_PROFIT.into(), net_profit),
            Column::new(DEBT_RATIO.into(), debt_ratio),
            Column::new(EARNINGS_PER_SHARE.into(), eps),
            Column::new(REVENUE_YOY_PCT.into(), revenue_yoy),
            Column::new(PROFIT_YOY_PCT.into(), profit_yoy),
        ])?;

        Ok(Self { df })
    }

    /// Underlying DataFrame, read-only.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Check whether a column exists and holds numbers.
    pub fn is_numeric_column(&self, column: &str) -> bool {
        self.df
            .column(column)
            .map(|col| {
                matches!(
                    col.dtype(),
                    DataType::Float32
                        | DataType::Float64
                        | DataType::Int8
                        | DataType::Int16
                        | DataType::Int32
                        | DataType::Int64
                        | DataType::UInt8
                        | DataType::UInt16
                        | DataType::UInt32
                        | DataType::UInt64
                )
            })
            .unwrap_or(false)
    }

    /// Values of a numeric column cast to f64, nulls preserved.
    pub fn numeric_values(&self, column: &str) -> Result<Vec<Option<f64>>, PolarsError> {
        let values = self.df.column(column)?.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }

    pub fn years(&self) -> Vec<i32> {
        self.df
            .column(YEAR)
            .ok()
            .and_then(|col| col.i32().ok().map(|ca| ca.into_iter().flatten().collect()))
            .unwrap_or_default()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years().first().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years().last().copied()
    }

    /// Materialize all rows in year order.
    pub fn rows(&self) -> Result<Vec<MetricRow>, PolarsError> {
        let years = self.df.column(YEAR)?.i32()?.clone();
        let revenue = self.df.column(REVENUE)?.i64()?.clone();
        let net_profit = self.df.column(NET_PROFIT)?.i64()?.clone();
        let debt_ratio = self.df.column(DEBT_RATIO)?.f64()?.clone();
        let eps = self.df.column(EARNINGS_PER_SHARE)?.f64()?.clone();
        let revenue_yoy = self.df.column(REVENUE_YOY_PCT)?.f64()?.clone();
        let profit_yoy = self.df.column(PROFIT_YOY_PCT)?.f64()?.clone();

        Ok((0..self.df.height())
            .map(|i| MetricRow {
                year: years.get(i).unwrap_or_default(),
                revenue: revenue.get(i).unwrap_or_default(),
                net_profit: net_profit.get(i).unwrap_or_default(),
                debt_ratio: debt_ratio.get(i).unwrap_or(f64::NAN),
                earnings_per_share: eps.get(i).unwrap_or(f64::NAN),
                revenue_yoy_pct: revenue_yoy.get(i),
                profit_yoy_pct: profit_yoy.get(i),
            })
            .collect())
    }

    /// Latest historical row, if any.
    pub fn latest(&self) -> Result<Option<MetricRow>, PolarsError> {
        Ok(self.rows()?.pop())
    }
}
