//! GUI module - User interface components

mod app;
mod control_panel;
mod dashboard_panel;

pub use app::FinanceDashboardApp;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use dashboard_panel::DashboardPanel;
