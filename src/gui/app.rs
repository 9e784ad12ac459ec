//! Finance Dashboard Main Application
//! Main window with control panel and dashboard panel.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{GeneratedTableSource, MetricTable, TableCache};
use crate::export::XlsxWriter;
use crate::gui::{ControlPanel, ControlPanelAction, DashboardPanel};
use crate::view::{DashboardView, ForecastSettings};
use anyhow::{Context, Result};
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

const CHART_PNG_WIDTH: u32 = 1400;
const CHART_PNG_HEIGHT: u32 = 800;

/// Main application window.
pub struct FinanceDashboardApp {
    cache: TableCache<GeneratedTableSource>,
    settings: ForecastSettings,
    control_panel: ControlPanel,
    dashboard_panel: DashboardPanel,
    table: Option<Arc<MetricTable>>,
    view: Option<DashboardView>,
}

impl FinanceDashboardApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: &DashboardConfig,
        cache: TableCache<GeneratedTableSource>,
    ) -> Self {
        Self {
            cache,
            settings: config.forecast_settings(),
            control_panel: ControlPanel::new(config.controls()),
            dashboard_panel: DashboardPanel::new(),
            table: None,
            view: None,
        }
    }

    /// Pick up the cached table and rebuild the view when it was regenerated.
    fn sync_table(&mut self) {
        match self.cache.get() {
            Ok(table) => {
                let changed = self
                    .table
                    .as_ref()
                    .map_or(true, |current| !Arc::ptr_eq(current, &table));
                if changed {
                    self.table = Some(table);
                    self.rebuild_view();
                }
            }
            Err(e) => {
                error!(error = %e, "failed to load metric table");
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    fn rebuild_view(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        match DashboardView::build(&table, &self.control_panel.controls, &self.settings) {
            Ok(view) => {
                self.view = Some(view);
                self.control_panel.export_enabled = true;
            }
            Err(e) => {
                error!(error = %e, "failed to build dashboard view");
                self.view = None;
                self.control_panel.export_enabled = false;
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    fn handle_refresh(&mut self) {
        match self.cache.refresh() {
            Ok(table) => {
                self.table = Some(table);
                self.rebuild_view();
                self.control_panel.set_status("Data regenerated");
            }
            Err(e) => {
                error!(error = %e, "refresh failed");
                self.control_panel.set_status(format!("Error: {}", e));
            }
        }
    }

    fn handle_export_xlsx(&mut self) {
        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("Excel Workbook", &["xlsx"])
            .set_file_name("financial_metrics.xlsx")
            .save_file()
        else {
            return;
        };

        match self.export_xlsx(&output_path) {
            Ok(sheets) => {
                self.control_panel.set_status(format!(
                    "Exported {} sheet(s) to {}",
                    sheets,
                    output_path.display()
                ));
                self.open_if_requested(&output_path);
            }
            Err(e) => {
                error!(error = ?e, "excel export failed");
                self.control_panel
                    .set_status(format!("Export failed: {:#}", e));
            }
        }
    }

    fn export_xlsx(&self, output_path: &Path) -> Result<usize> {
        let (table, view) = self.current().context("no dashboard data to export")?;
        let workbook = view
            .export_workbook(table)
            .context("failed to assemble workbook")?;
        XlsxWriter::write_to_path(&workbook, output_path)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        Ok(workbook.sheets.len())
    }

    fn handle_export_png(&mut self) {
        let Some(output_path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("financial_trend.png")
            .save_file()
        else {
            return;
        };

        match self.export_png(&output_path) {
            Ok(written) => {
                let names: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
                self.control_panel
                    .set_status(format!("Saved {}", names.join(", ")));
                self.open_if_requested(&output_path);
            }
            Err(e) => {
                error!(error = ?e, "chart export failed");
                self.control_panel
                    .set_status(format!("Chart export failed: {:#}", e));
            }
        }
    }

    /// Writes the trend chart, plus a `_growth` sibling when growth is shown.
    fn export_png(&self, output_path: &Path) -> Result<Vec<PathBuf>> {
        let (_, view) = self.current().context("no dashboard data to render")?;
        let mut written = Vec::new();

        let trend = StaticChartRenderer::render_trend_png(
            &view.composite,
            &view.selected,
            CHART_PNG_WIDTH,
            CHART_PNG_HEIGHT,
        )
        .context("failed to render trend chart")?;
        std::fs::write(output_path, trend)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        written.push(output_path.to_path_buf());

        if let Some(growth) = &view.growth {
            let growth_path = Self::sibling_path(output_path, "growth");
            let bytes = StaticChartRenderer::render_growth_png(
                growth,
                CHART_PNG_WIDTH,
                CHART_PNG_HEIGHT / 2,
            )
            .context("failed to render growth chart")?;
            std::fs::write(&growth_path, bytes)
                .with_context(|| format!("failed to write {}", growth_path.display()))?;
            written.push(growth_path);
        }

        info!(files = written.len(), "charts saved");
        Ok(written)
    }

    fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "chart".to_string());
        path.with_file_name(format!("{}_{}.png", stem, suffix))
    }

    fn current(&self) -> Option<(&MetricTable, &DashboardView)> {
        Some((self.table.as_deref()?, self.view.as_ref()?))
    }

    fn open_if_requested(&mut self, path: &Path) {
        if self.control_panel.open_after_export {
            if let Err(e) = open::that(path) {
                error!(error = %e, "failed to open exported file");
            }
        }
    }

    /// Time until the cached table expires, used to schedule the next repaint.
    fn until_expiry(&self) -> Option<Duration> {
        self.cache
            .expires_at()
            .map(|at| at.saturating_duration_since(Instant::now()))
    }
}

impl eframe::App for FinanceDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_table();

        if let Some(wait) = self.until_expiry() {
            ctx.request_repaint_after(wait + Duration::from_millis(50));
        }

        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::ControlsChanged => self.rebuild_view(),
                        ControlPanelAction::RefreshData => self.handle_refresh(),
                        ControlPanelAction::ExportXlsx => self.handle_export_xlsx(),
                        ControlPanelAction::ExportChartPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.dashboard_panel.show(ui, self.view.as_ref());
        });
    }
}
