//! Export Workbook Module
//! Plain sheet/row model of the downloadable report.

use crate::data::MetricTable;
use crate::forecast::ForecastRow;
use polars::prelude::*;
use std::collections::BTreeMap;

pub const RAW_DATA_SHEET: &str = "raw data";
pub const FORECAST_SHEET: &str = "AI forecast";

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Empty,
}

impl From<AnyValue<'_>> for CellValue {
    fn from(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Int8(v) => CellValue::Integer(v as i64),
            AnyValue::Int16(v) => CellValue::Integer(v as i64),
            AnyValue::Int32(v) => CellValue::Integer(v as i64),
            AnyValue::Int64(v) => CellValue::Integer(v),
            AnyValue::UInt8(v) => CellValue::Integer(v as i64),
            AnyValue::UInt16(v) => CellValue::Integer(v as i64),
            AnyValue::UInt32(v) => CellValue::Integer(v as i64),
            AnyValue::Float32(v) => CellValue::Number(v as f64),
            AnyValue::Float64(v) => CellValue::Number(v),
            _ => CellValue::Empty,
        }
    }
}

/// One worksheet: a header row followed by data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Ordered worksheets of an exported report.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportWorkbook {
    pub sheets: Vec<Sheet>,
}

impl ExportWorkbook {
    /// Raw data sheet, plus the forecast sheet when forecasts are given and non-empty.
    pub fn build(
        table: &MetricTable,
        forecasts: Option<&BTreeMap<String, Vec<ForecastRow>>>,
    ) -> Result<Self, PolarsError> {
        let mut sheets = vec![Self::raw_data_sheet(table)?];
        if let Some(sheet) = forecasts.and_then(Self::forecast_sheet) {
            sheets.push(sheet);
        }
        Ok(Self { sheets })
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Every column of the table, rows in year order.
    pub fn raw_data_sheet(table: &MetricTable) -> Result<Sheet, PolarsError> {
        let df = table.frame();
        let header = table.column_names();

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let row = df
                .get_columns()
                .iter()
                .map(|col| col.get(i).map(CellValue::from))
                .collect::<PolarsResult<Vec<CellValue>>>()?;
            rows.push(row);
        }

        Ok(Sheet {
            name: RAW_DATA_SHEET.to_string(),
            header,
            rows,
        })
    }

    /// Year plus one column per forecast metric. `None` when nothing was forecast.
    pub fn forecast_sheet(forecasts: &BTreeMap<String, Vec<ForecastRow>>) -> Option<Sheet> {
        let metrics: Vec<&String> = forecasts
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(metric, _)| metric)
            .collect();
        if metrics.is_empty() {
            return None;
        }

        let mut by_year: BTreeMap<i32, BTreeMap<&str, f64>> = BTreeMap::new();
        for (metric, rows) in forecasts {
            for row in rows {
                if let Some(value) = row.value(metric) {
                    by_year.entry(row.year).or_default().insert(metric.as_str(), value);
                }
            }
        }

        let mut header = vec!["year".to_string()];
        header.extend(metrics.iter().map(|m| m.to_string()));

        let rows = by_year
            .into_iter()
            .map(|(year, values)| {
                let mut row = vec![CellValue::Integer(year as i64)];
                row.extend(metrics.iter().map(|m| {
                    values
                        .get(m.as_str())
                        .map(|v| CellValue::Number(*v))
                        .unwrap_or(CellValue::Empty)
                }));
                row
            })
            .collect();

        Some(Sheet {
            name: FORECAST_SHEET.to_string(),
            header,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{COLUMNS, NET_PROFIT, REVENUE};
    use crate::data::MetricGenerator;
    use crate::forecast::Forecaster;

    #[test]
    fn raw_sheet_mirrors_table() {
        let table = MetricGenerator::with_seed(21).generate(2018, 2024).unwrap();
        let sheet = ExportWorkbook::raw_data_sheet(&table).unwrap();
        let rows = table.rows().unwrap();

        assert_eq!(sheet.name, RAW_DATA_SHEET);
        assert_eq!(sheet.header, COLUMNS.map(String::from).to_vec());
        assert_eq!(sheet.rows.len(), rows.len());
        for (cells, row) in sheet.rows.iter().zip(&rows) {
            assert_eq!(cells[0], CellValue::Integer(row.year as i64));
            assert_eq!(cells[1], CellValue::Integer(row.revenue));
            assert_eq!(cells[3], CellValue::Number(row.debt_ratio));
        }
        assert_eq!(sheet.rows[0][5], CellValue::Empty);
        assert_eq!(sheet.rows[0][6], CellValue::Empty);
        assert!(matches!(sheet.rows[1][5], CellValue::Number(_)));
    }

    #[test]
    fn forecast_sheet_has_one_column_per_metric() {
        let table = MetricGenerator::with_seed(21).generate(2018, 2024).unwrap();
        let metrics = vec![REVENUE.to_string(), NET_PROFIT.to_string()];
        let fc = Forecaster::forecast_many(&table, &metrics, 1).unwrap();

        let workbook = ExportWorkbook::build(&table, Some(&fc)).unwrap();
        assert_eq!(workbook.sheets.len(), 2);

        let sheet = workbook.sheet(FORECAST_SHEET).unwrap();
        assert_eq!(sheet.header, vec!["year", NET_PROFIT, REVENUE]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0][0], CellValue::Integer(2025));
        assert_eq!(
            sheet.rows[0][2],
            CellValue::Number(fc[REVENUE][0].value(REVENUE).unwrap())
        );
    }

    #[test]
    fn no_forecast_sheet_without_forecasts() {
        let table = MetricGenerator::with_seed(21).generate(2018, 2024).unwrap();

        let workbook = ExportWorkbook::build(&table, None).unwrap();
        assert_eq!(workbook.sheets.len(), 1);
        assert!(workbook.sheet(RAW_DATA_SHEET).is_some());

        let empty = BTreeMap::new();
        let workbook = ExportWorkbook::build(&table, Some(&empty)).unwrap();
        assert!(workbook.sheet(FORECAST_SHEET).is_none());
    }
}
