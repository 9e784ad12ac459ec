//! Control Panel Widget
//! Left side panel with metric selection, display toggles and export actions.

use crate::data::Metric;
use crate::view::Controls;
use egui::{Color32, RichText};

/// Left side control panel driving the dashboard view.
pub struct ControlPanel {
    pub controls: Controls,
    pub status: String,
    pub open_after_export: bool,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(controls: Controls) -> Self {
        Self {
            controls,
            status: "Ready".to_string(),
            open_after_export: false,
            export_enabled: false,
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📈 Finance Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Key financial metrics & trend forecast")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Metric Selection =====
        ui.label(RichText::new("📊 Metrics").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                for metric in Metric::ALL {
                    let column = metric.column();
                    let mut checked = self.controls.selected_metrics.contains(column);
                    if ui
                        .checkbox(&mut checked, metric.label())
                        .on_hover_text(metric.description())
                        .changed()
                    {
                        if checked {
                            self.controls.selected_metrics.insert(column.to_string());
                        } else {
                            self.controls.selected_metrics.remove(column);
                        }
                        action = ControlPanelAction::ControlsChanged;
                    }
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Display Options =====
        ui.label(RichText::new("⚙️ Display").size(14.0).strong());
        ui.add_space(5.0);

        if ui
            .checkbox(&mut self.controls.show_growth, "Show YoY growth")
            .changed()
        {
            action = ControlPanelAction::ControlsChanged;
        }
        if ui
            .checkbox(&mut self.controls.forecast_enabled, "Enable trend forecast")
            .changed()
        {
            action = ControlPanelAction::ControlsChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            let refresh = egui::Button::new(RichText::new("🔄 Refresh Data").size(16.0))
                .min_size(egui::vec2(200.0, 35.0));
            if ui.add(refresh).clicked() {
                action = ControlPanelAction::RefreshData;
            }

            ui.add_space(8.0);

            ui.add_enabled_ui(self.export_enabled, |ui| {
                let xlsx_button = egui::Button::new(RichText::new("📄 Export Excel").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(xlsx_button).clicked() {
                    action = ControlPanelAction::ExportXlsx;
                }

                ui.add_space(4.0);

                let png_button = egui::Button::new(RichText::new("🖼 Save Chart PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(png_button).clicked() {
                    action = ControlPanelAction::ExportChartPng;
                }
            });

            ui.checkbox(&mut self.open_after_export, "Open file after export");
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") || self.status.contains("failed") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exported") || self.status.contains("Saved") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    ControlsChanged,
    RefreshData,
    ExportXlsx,
    ExportChartPng,
}
