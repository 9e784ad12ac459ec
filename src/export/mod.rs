//! Export module - report workbook model and XLSX writer

mod workbook;
mod xlsx;

pub use workbook::{CellValue, ExportWorkbook, Sheet, FORECAST_SHEET, RAW_DATA_SHEET};
pub use xlsx::{ExportError, XlsxWriter};
