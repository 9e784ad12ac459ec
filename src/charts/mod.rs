//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};

/// Series palette shared by the interactive and static charts (RGB).
pub const PALETTE: [(u8, u8, u8); 8] = [
    (102, 194, 165), // Green
    (252, 141, 98),  // Orange
    (141, 160, 203), // Blue
    (231, 138, 195), // Pink
    (166, 216, 84),  // Lime
    (255, 217, 47),  // Yellow
    (229, 196, 148), // Sand
    (179, 179, 179), // Grey
];

pub const GROWTH_REVENUE_RGB: (u8, u8, u8) = (52, 152, 219);
pub const GROWTH_PROFIT_RGB: (u8, u8, u8) = (231, 76, 60);

pub fn series_rgb(index: usize) -> (u8, u8, u8) {
    PALETTE[index % PALETTE.len()]
}
