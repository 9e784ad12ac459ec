//! Dashboard View Module
//! One render pass of the dashboard: controls in, chart-ready data out.

use crate::data::table::{NET_PROFIT, REVENUE};
use crate::data::{Metric, MetricRow, MetricTable};
use crate::export::ExportWorkbook;
use crate::forecast::{compose, CompositeTable, ForecastError, ForecastRow, Forecaster};
use polars::prelude::PolarsError;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// User-facing dashboard controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    /// Metric columns to chart, any of the four base metrics.
    pub selected_metrics: BTreeSet<String>,
    pub show_growth: bool,
    pub forecast_enabled: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            selected_metrics: [REVENUE, NET_PROFIT].iter().map(|m| m.to_string()).collect(),
            show_growth: true,
            forecast_enabled: true,
        }
    }
}

/// Which metrics get projected, and how far.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSettings {
    pub metrics: Vec<String>,
    pub horizon: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            metrics: vec![REVENUE.to_string(), NET_PROFIT.to_string()],
            horizon: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(msg) | Notice::Warning(msg) => msg,
        }
    }
}

/// Latest value of a metric with its year-over-year delta.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub title: String,
    pub metric: Metric,
    pub value: f64,
    pub delta_pct: Option<f64>,
}

impl SummaryCard {
    pub fn formatted_value(&self) -> String {
        match self.metric {
            Metric::Revenue | Metric::NetProfit => format!("{:.0} bn", self.value),
            Metric::DebtRatio => format!("{:.1} %", self.value),
            Metric::EarningsPerShare => format!("{:.2} / share", self.value),
        }
    }

    pub fn formatted_delta(&self) -> Option<String> {
        self.delta_pct.map(|d| format!("{:+.1}%", d))
    }
}

/// Growth percentages of one year for the grouped bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthPoint {
    pub year: i32,
    pub revenue_yoy_pct: Option<f64>,
    pub profit_yoy_pct: Option<f64>,
}

/// Summary cards for the latest historical row.
pub fn summary_cards(latest: &MetricRow) -> Vec<SummaryCard> {
    vec![
        SummaryCard {
            title: "Revenue (latest)".to_string(),
            metric: Metric::Revenue,
            value: latest.revenue as f64,
            delta_pct: latest.revenue_yoy_pct,
        },
        SummaryCard {
            title: "Net Profit (latest)".to_string(),
            metric: Metric::NetProfit,
            value: latest.net_profit as f64,
            delta_pct: latest.profit_yoy_pct,
        },
        SummaryCard {
            title: "Debt Ratio".to_string(),
            metric: Metric::DebtRatio,
            value: latest.debt_ratio,
            delta_pct: None,
        },
        SummaryCard {
            title: "Earnings per Share".to_string(),
            metric: Metric::EarningsPerShare,
            value: latest.earnings_per_share,
            delta_pct: None,
        },
    ]
}

pub fn growth_series(rows: &[MetricRow]) -> Vec<GrowthPoint> {
    rows.iter()
        .map(|r| GrowthPoint {
            year: r.year,
            revenue_yoy_pct: r.revenue_yoy_pct,
            profit_yoy_pct: r.profit_yoy_pct,
        })
        .collect()
}

/// Everything the presentation layer draws for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub composite: CompositeTable,
    pub selected: Vec<Metric>,
    pub forecasts: BTreeMap<String, Vec<ForecastRow>>,
    pub cards: Vec<SummaryCard>,
    pub growth: Option<Vec<GrowthPoint>>,
    pub rows: Vec<MetricRow>,
    pub notice: Option<Notice>,
}

impl DashboardView {
    /// Recompute forecasts and the composite table for the given controls.
    ///
    /// Forecast failures never abort the pass: the view falls back to
    /// historical data and carries a warning notice instead.
    pub fn build(
        table: &MetricTable,
        controls: &Controls,
        settings: &ForecastSettings,
    ) -> Result<Self, PolarsError> {
        let mut selected: Vec<Metric> = controls
            .selected_metrics
            .iter()
            .filter_map(|name| {
                let metric = Metric::from_column(name);
                if metric.is_none() {
                    warn!(metric = %name, "ignoring unknown metric selection");
                }
                metric
            })
            .collect();
        selected.sort();
        let selected_columns: BTreeSet<String> =
            selected.iter().map(|m| m.column().to_string()).collect();

        let (forecasts, notice) = if controls.forecast_enabled {
            match Forecaster::forecast_many(table, &settings.metrics, settings.horizon) {
                Ok(forecasts) => {
                    let notice = Notice::Info(format!(
                        "Trend forecast enabled: projecting {} for the next {} year(s)",
                        Self::metric_labels(&settings.metrics),
                        settings.horizon
                    ));
                    (forecasts, Some(notice))
                }
                Err(ForecastError::PolarsError(e)) => return Err(e),
                Err(e) => {
                    warn!(error = %e, "forecast unavailable, showing historical data only");
                    let notice =
                        Notice::Warning(format!("Forecast unavailable, showing history only: {}", e));
                    (BTreeMap::new(), Some(notice))
                }
            }
        } else {
            (BTreeMap::new(), None)
        };

        let composite = compose(table, &forecasts, &selected_columns)?;
        let rows = table.rows()?;
        let cards = rows.last().map(summary_cards).unwrap_or_default();
        let growth = controls.show_growth.then(|| growth_series(&rows));

        debug!(
            rows = composite.len(),
            forecast_rows = composite.forecast_years().len(),
            selected = selected.len(),
            "dashboard view rebuilt"
        );

        Ok(Self {
            composite,
            selected,
            forecasts,
            cards,
            growth,
            rows,
            notice,
        })
    }

    /// Report workbook: raw data, plus the forecast sheet when forecasts exist.
    pub fn export_workbook(&self, table: &MetricTable) -> Result<ExportWorkbook, PolarsError> {
        let forecasts = (!self.forecasts.is_empty()).then_some(&self.forecasts);
        ExportWorkbook::build(table, forecasts)
    }

    fn metric_labels(metrics: &[String]) -> String {
        metrics
            .iter()
            .map(|m| {
                Metric::from_column(m)
                    .map(|metric| metric.label().to_lowercase())
                    .unwrap_or_else(|| m.clone())
            })
            .collect::<Vec<_>>()
            .join(" and ")
    }
}
