//! Finance Dashboard - Key Financial Metrics & Trend Forecast
//!
//! Desktop dashboard over a synthetic yearly metric table.

use anyhow::{anyhow, Context};
use eframe::egui;
use finance_dashboard::config::DashboardConfig;
use finance_dashboard::data::{GeneratedTableSource, MetricGenerator, TableCache};
use finance_dashboard::gui::FinanceDashboardApp;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("finance_dashboard=info")),
        )
        .init();

    let config = DashboardConfig::load().context("failed to load dashboard configuration")?;
    info!(
        year_start = config.year_start,
        year_end = config.year_end,
        ttl_secs = config.cache_ttl_secs,
        "starting finance dashboard"
    );

    let generator = match config.seed {
        Some(seed) => MetricGenerator::with_seed(seed),
        None => MetricGenerator::new(),
    };
    let source = GeneratedTableSource::new(generator, config.year_start, config.year_end);
    let cache = TableCache::new(source, config.cache_ttl());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Finance Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Finance Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(FinanceDashboardApp::new(cc, &config, cache)))),
    )
    .map_err(|e| anyhow!("failed to start dashboard window: {}", e))
}
