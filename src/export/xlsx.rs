//! XLSX Report Writer Module
//! Writes an export workbook as an Excel spreadsheet with rust_xlsxwriter.
//!
//! The document creation date is pinned, so identical workbooks produce
//! identical bytes.

use super::workbook::{CellValue, ExportWorkbook, Sheet};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, Worksheet, XlsxError};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("Workbook has no sheets")]
    NoSheets,
}

/// XLSX writer for exported reports
pub struct XlsxWriter;

impl XlsxWriter {
    /// Serialize the workbook into XLSX bytes.
    pub fn write_to_bytes(workbook: &ExportWorkbook) -> Result<Vec<u8>, ExportError> {
        if workbook.sheets.is_empty() {
            return Err(ExportError::NoSheets);
        }

        let mut book = Workbook::new();
        let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
        let properties = DocProperties::new()
            .set_title("Financial Analysis Report")
            .set_author("Finance Dashboard")
            .set_creation_datetime(&created);
        book.set_properties(&properties);

        let header_format = Format::new().set_bold();
        for sheet in &workbook.sheets {
            book.push_worksheet(Self::worksheet(sheet, &header_format)?);
        }

        Ok(book.save_to_buffer()?)
    }

    /// Write the workbook to a file.
    pub fn write_to_path(workbook: &ExportWorkbook, output_path: &Path) -> Result<(), ExportError> {
        let bytes = Self::write_to_bytes(workbook)?;
        fs::write(output_path, &bytes)?;

        info!(
            path = %output_path.display(),
            sheets = workbook.sheets.len(),
            bytes = bytes.len(),
            "XLSX report written"
        );
        Ok(())
    }

    fn worksheet(sheet: &Sheet, header_format: &Format) -> Result<Worksheet, XlsxError> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(&sheet.name)?;

        for (col, title) in sheet.header.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, title, header_format)?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let r = row_idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    CellValue::Integer(v) => {
                        worksheet.write_number(r, col as u16, *v as f64)?;
                    }
                    CellValue::Number(v) if v.is_finite() => {
                        worksheet.write_number(r, col as u16, *v)?;
                    }
                    // Missing and non-finite values stay blank
                    _ => {}
                }
            }
        }

        Ok(worksheet)
    }
}
