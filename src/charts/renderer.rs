//! Static Chart Renderer
//! Renders the dashboard charts to PNG images with plotters.
//!
//! Layout matches the interactive charts: trend lines with a faded forecast
//! continuation, and grouped growth bars per year.

use crate::charts::{series_rgb, GROWTH_PROFIT_RGB, GROWTH_REVENUE_RGB};
use crate::data::Metric;
use crate::forecast::CompositeTable;
use crate::view::GrowthPoint;
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Drawing(String),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("No data to draw")]
    Empty,
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the trend chart for the given metrics as PNG bytes.
    pub fn render_trend_png(
        composite: &CompositeTable,
        metrics: &[Metric],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let values: Vec<f64> = metrics
            .iter()
            .flat_map(|m| composite.series(m.column()))
            .map(|(_, v)| v)
            .collect();
        let (first_year, last_year) = composite.year_bounds().ok_or(RenderError::Empty)?;
        if values.is_empty() {
            return Err(RenderError::Empty);
        }
        let (y_min, y_max) = Self::padded_range(&values);
        let x_range = (first_year as f64 - 0.5)..(last_year as f64 + 0.5);

        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Key Financial Metrics", ("sans-serif", 26).into_font())
                .margin(12)
                .x_label_area_size(36)
                .y_label_area_size(56)
                .build_cartesian_2d(x_range, y_min..y_max)
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .x_desc("Year")
                .y_desc("Value")
                .x_labels((last_year - first_year + 1).max(2) as usize)
                .x_label_formatter(&|x| format!("{:.0}", x))
                .draw()
                .map_err(drawing)?;

            for (idx, metric) in metrics.iter().enumerate() {
                let color = rgb(series_rgb(idx));
                let history: Vec<(f64, f64)> = composite
                    .historical_series(metric.column())
                    .into_iter()
                    .map(|(x, y)| (x as f64, y))
                    .collect();
                let projection: Vec<(f64, f64)> = composite
                    .forecast_series(metric.column())
                    .into_iter()
                    .map(|(x, y)| (x as f64, y))
                    .collect();

                chart
                    .draw_series(LineSeries::new(history.clone(), color.stroke_width(2)))
                    .map_err(drawing)?
                    .label(metric.label())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                    });
                chart
                    .draw_series(history.iter().map(|&p| Circle::new(p, 3, color.filled())))
                    .map_err(drawing)?;

                if projection.len() > 1 {
                    chart
                        .draw_series(LineSeries::new(projection.clone(), color.mix(0.5).stroke_width(2)))
                        .map_err(drawing)?;
                    chart
                        .draw_series(
                            projection[1..]
                                .iter()
                                .map(|&p| Circle::new(p, 4, color.stroke_width(2))),
                        )
                        .map_err(drawing)?;
                }
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(&BLACK)
                .draw()
                .map_err(drawing)?;

            root.present().map_err(drawing)?;
        }

        Self::encode_png(buffer, width, height)
    }

    /// Render revenue and profit growth as grouped bars, PNG bytes.
    pub fn render_growth_png(
        growth: &[GrowthPoint],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut values: Vec<f64> = growth
            .iter()
            .flat_map(|p| [p.revenue_yoy_pct, p.profit_yoy_pct])
            .flatten()
            .collect();
        if values.is_empty() {
            return Err(RenderError::Empty);
        }
        // keep the zero baseline in view
        values.push(0.0);
        let (y_min, y_max) = Self::padded_range(&values);

        let first_year = growth.first().map(|p| p.year).unwrap_or_default();
        let last_year = growth.last().map(|p| p.year).unwrap_or_default();
        let x_range = (first_year as f64 - 0.5)..(last_year as f64 + 0.5);

        let revenue_color = rgb(GROWTH_REVENUE_RGB);
        let profit_color = rgb(GROWTH_PROFIT_RGB);

        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Revenue & Profit YoY Change (%)", ("sans-serif", 26).into_font())
                .margin(12)
                .x_label_area_size(36)
                .y_label_area_size(56)
                .build_cartesian_2d(x_range, y_min..y_max)
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .x_desc("Year")
                .y_desc("YoY (%)")
                .x_labels((last_year - first_year + 1).max(2) as usize)
                .x_label_formatter(&|x| format!("{:.0}", x))
                .draw()
                .map_err(drawing)?;

            let bar = |year: i32, offset: f64, value: f64, color: RGBColor| {
                let x = year as f64 + offset;
                Rectangle::new([(x - 0.18, 0.0), (x + 0.18, value)], color.filled())
            };

            chart
                .draw_series(growth.iter().filter_map(|p| {
                    p.revenue_yoy_pct
                        .map(|v| bar(p.year, -0.2, v, revenue_color))
                }))
                .map_err(drawing)?
                .label("Revenue YoY (%)")
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], revenue_color.filled()));

            chart
                .draw_series(growth.iter().filter_map(|p| {
                    p.profit_yoy_pct
                        .map(|v| bar(p.year, 0.2, v, profit_color))
                }))
                .map_err(drawing)?
                .label("Profit YoY (%)")
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], profit_color.filled()));

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(&BLACK)
                .draw()
                .map_err(drawing)?;

            root.present().map_err(drawing)?;
        }

        Self::encode_png(buffer, width, height)
    }

    /// Value range with 10% headroom on both sides.
    pub fn padded_range(values: &[f64]) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }

        let span = max - min;
        let pad = if span > 0.0 { span * 0.1 } else { max.abs().max(1.0) * 0.1 };
        (min - pad, max + pad)
    }

    fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let img = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Drawing("bitmap buffer size mismatch".to_string()))?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MetricGenerator;
    use crate::view::{growth_series, Controls, DashboardView, ForecastSettings};

    fn view() -> DashboardView {
        let table = MetricGenerator::with_seed(4).generate(2018, 2024).unwrap();
        DashboardView::build(&table, &Controls::default(), &ForecastSettings::default()).unwrap()
    }

    /// Decoded PNG dimensions; `None` when the host has no usable font.
    fn png_size(result: Result<Vec<u8>, RenderError>) -> Option<(u32, u32)> {
        match result {
            Ok(bytes) => {
                assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
                let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
                Some((img.width(), img.height()))
            }
            Err(RenderError::Drawing(msg)) => {
                eprintln!("chart text could not be drawn, skipping: {}", msg);
                None
            }
            Err(e) => panic!("unexpected render error: {}", e),
        }
    }

    #[test]
    fn trend_chart_renders_png_of_requested_size() {
        let view = view();
        assert_eq!(view.composite.forecast_years(), vec![2025]);
        let result = StaticChartRenderer::render_trend_png(&view.composite, &view.selected, 800, 450);
        if let Some(size) = png_size(result) {
            assert_eq!(size, (800, 450));
        }
    }

    #[test]
    fn growth_chart_renders_png_of_requested_size() {
        let view = view();
        let growth = view.growth.clone().unwrap_or_else(|| growth_series(&view.rows));
        let result = StaticChartRenderer::render_growth_png(&growth, 640, 320);
        if let Some(size) = png_size(result) {
            assert_eq!(size, (640, 320));
        }
    }

    #[test]
    fn padded_range_adds_headroom() {
        let (lo, hi) = StaticChartRenderer::padded_range(&[10.0, 20.0]);
        assert!((lo - 9.0).abs() < 1e-9);
        assert!((hi - 21.0).abs() < 1e-9);
    }

    #[test]
    fn padded_range_handles_flat_and_empty() {
        let (lo, hi) = StaticChartRenderer::padded_range(&[5.0, 5.0]);
        assert!(lo < 5.0 && hi > 5.0);
        assert_eq!(StaticChartRenderer::padded_range(&[]), (0.0, 1.0));
        assert_eq!(StaticChartRenderer::padded_range(&[f64::NAN]), (0.0, 1.0));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let composite = CompositeTable::default();
        assert!(matches!(
            StaticChartRenderer::render_trend_png(&composite, &[Metric::Revenue], 640, 480),
            Err(RenderError::Empty)
        ));
        assert!(matches!(
            StaticChartRenderer::render_growth_png(&[], 640, 480),
            Err(RenderError::Empty)
        ));
    }
}
