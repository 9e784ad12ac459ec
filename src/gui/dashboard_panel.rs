//! Dashboard Panel Widget
//! Central scrollable panel: charts, summary cards, glossary and raw data.

use crate::charts::ChartPlotter;
use crate::data::table::COLUMNS;
use crate::data::Metric;
use crate::view::{DashboardView, Notice, SummaryCard};
use egui::{Color32, RichText, ScrollArea};

const CARD_WIDTH: f32 = 200.0;
const SECTION_SPACING: f32 = 15.0;

/// Draws the current dashboard view.
#[derive(Default)]
pub struct DashboardPanel;

impl DashboardPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ui: &mut egui::Ui, view: Option<&DashboardView>) {
        let Some(view) = view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if let Some(notice) = &view.notice {
                    Self::draw_notice(ui, notice);
                    ui.add_space(8.0);
                }

                ui.label(RichText::new("Key Financial Metrics").size(18.0).strong());
                if view.selected.is_empty() {
                    ui.label(RichText::new("Select at least one metric").color(Color32::GRAY));
                } else {
                    ChartPlotter::draw_trend_chart(ui, &view.composite, &view.selected);
                }
                ui.add_space(SECTION_SPACING);

                if let Some(growth) = &view.growth {
                    ui.label(
                        RichText::new("Revenue & Profit YoY Change (%)")
                            .size(18.0)
                            .strong(),
                    );
                    ChartPlotter::draw_growth_chart(ui, growth);
                    ui.add_space(SECTION_SPACING);
                }

                ui.horizontal_wrapped(|ui| {
                    for card in &view.cards {
                        Self::draw_card(ui, card);
                        ui.add_space(10.0);
                    }
                });
                ui.add_space(SECTION_SPACING);

                Self::draw_glossary(ui);
                ui.add_space(SECTION_SPACING);

                egui::CollapsingHeader::new("Raw data")
                    .default_open(false)
                    .show(ui, |ui| Self::draw_raw_table(ui, view));
            });
    }

    fn draw_notice(ui: &mut egui::Ui, notice: &Notice) {
        let (icon, color) = match notice {
            Notice::Info(_) => ("ℹ", Color32::from_rgb(100, 149, 237)),
            Notice::Warning(_) => ("⚠", Color32::from_rgb(255, 193, 7)),
        };
        egui::Frame::none()
            .rounding(5.0)
            .stroke(egui::Stroke::new(1.0, color))
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(format!("{} {}", icon, notice.message())).color(color));
            });
    }

    fn draw_card(ui: &mut egui::Ui, card: &SummaryCard) {
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.vertical(|ui| {
                    ui.label(RichText::new(&card.title).size(13.0).color(Color32::GRAY));
                    ui.label(RichText::new(card.formatted_value()).size(22.0).strong());
                    if let Some(delta) = card.formatted_delta() {
                        let color = if card.delta_pct.unwrap_or_default() >= 0.0 {
                            Color32::from_rgb(40, 167, 69)
                        } else {
                            Color32::from_rgb(220, 53, 69)
                        };
                        ui.label(RichText::new(delta).size(13.0).color(color));
                    }
                });
            });
    }

    fn draw_glossary(ui: &mut egui::Ui) {
        ui.label(RichText::new("Metric glossary").size(14.0).strong());
        for metric in Metric::ALL {
            ui.horizontal_wrapped(|ui| {
                ui.label(RichText::new(metric.label()).strong());
                ui.label(metric.description());
            });
        }
    }

    fn draw_raw_table(ui: &mut egui::Ui, view: &DashboardView) {
        egui::Grid::new("raw_data_grid")
            .striped(true)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                for column in COLUMNS {
                    ui.label(RichText::new(column).strong());
                }
                ui.end_row();

                for row in &view.rows {
                    for column in COLUMNS {
                        let text = match row.value(column) {
                            Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
                            Some(v) => format!("{:.2}", v),
                            None => "-".to_string(),
                        };
                        ui.label(text);
                    }
                    ui.end_row();
                }
            });
    }
}
