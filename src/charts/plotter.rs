//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use crate::charts::{series_rgb, GROWTH_PROFIT_RGB, GROWTH_REVENUE_RGB};
use crate::data::Metric;
use crate::forecast::CompositeTable;
use crate::view::GrowthPoint;
use egui::Color32;
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoints, Points};

/// Offset of each bar from its year tick in the grouped growth chart.
const BAR_OFFSET: f64 = 0.2;
const BAR_WIDTH: f64 = 0.38;

/// Creates dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        let (r, g, b) = series_rgb(index);
        Color32::from_rgb(r, g, b)
    }

    fn year_formatter(mark: egui_plot::GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
        if (mark.value - mark.value.round()).abs() < 1e-6 {
            format!("{:.0}", mark.value)
        } else {
            String::new()
        }
    }

    fn to_points(series: &[(i32, f64)]) -> PlotPoints {
        series.iter().map(|&(year, v)| [year as f64, v]).collect()
    }

    /// Draw the multi-series trend chart.
    /// Historical values are solid with markers, projections dashed.
    pub fn draw_trend_chart(ui: &mut egui::Ui, composite: &CompositeTable, metrics: &[Metric]) {
        Plot::new("trend_chart")
            .height(320.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label("Value")
            .x_axis_formatter(Self::year_formatter)
            .show(ui, |plot_ui| {
                for (idx, metric) in metrics.iter().enumerate() {
                    let color = Self::series_color(idx);
                    let history = composite.historical_series(metric.column());
                    let projection = composite.forecast_series(metric.column());

                    plot_ui.line(
                        Line::new(Self::to_points(&history))
                            .color(color)
                            .width(2.0)
                            .name(metric.label()),
                    );
                    plot_ui.points(
                        Points::new(Self::to_points(&history))
                            .radius(3.5)
                            .color(color)
                            .name(metric.label()),
                    );

                    if projection.len() > 1 {
                        let forecast_name = format!("{} (forecast)", metric.label());
                        plot_ui.line(
                            Line::new(Self::to_points(&projection))
                                .color(color)
                                .width(2.0)
                                .style(LineStyle::dashed_loose())
                                .name(&forecast_name),
                        );
                        plot_ui.points(
                            Points::new(Self::to_points(&projection[1..]))
                                .radius(4.0)
                                .filled(false)
                                .color(color)
                                .name(&forecast_name),
                        );
                    }
                }
            });
    }

    /// Draw revenue and profit growth as grouped bars per year.
    pub fn draw_growth_chart(ui: &mut egui::Ui, growth: &[GrowthPoint]) {
        let bars = |offset: f64, pick: fn(&GrowthPoint) -> Option<f64>| -> Vec<Bar> {
            growth
                .iter()
                .filter_map(|p| {
                    pick(p).map(|v| {
                        Bar::new(p.year as f64 + offset, v)
                            .width(BAR_WIDTH)
                            .name(format!("{} {:.1}%", p.year, v))
                    })
                })
                .collect()
        };

        let (r, g, b) = GROWTH_REVENUE_RGB;
        let revenue = BarChart::new(bars(-BAR_OFFSET, |p| p.revenue_yoy_pct))
            .color(Color32::from_rgb(r, g, b))
            .name("Revenue YoY (%)");
        let (r, g, b) = GROWTH_PROFIT_RGB;
        let profit = BarChart::new(bars(BAR_OFFSET, |p| p.profit_yoy_pct))
            .color(Color32::from_rgb(r, g, b))
            .name("Profit YoY (%)");

        Plot::new("growth_chart")
            .height(240.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label("YoY (%)")
            .x_axis_formatter(Self::year_formatter)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(revenue);
                plot_ui.bar_chart(profit);
            });
    }
}
