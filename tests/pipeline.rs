use finance_dashboard::config::DashboardConfig;
use finance_dashboard::data::{GeneratedTableSource, Metric, MetricGenerator, TableCache};
use finance_dashboard::export::{CellValue, XlsxWriter, FORECAST_SHEET, RAW_DATA_SHEET};
use finance_dashboard::view::DashboardView;
use std::sync::Arc;

fn seeded_cache(config: &DashboardConfig) -> TableCache<GeneratedTableSource> {
    let source = GeneratedTableSource::new(
        MetricGenerator::with_seed(config.seed.unwrap_or(2024)),
        config.year_start,
        config.year_end,
    );
    TableCache::new(source, config.cache_ttl())
}

#[test]
fn cached_table_flows_into_view_and_export() {
    let config = DashboardConfig {
        seed: Some(99),
        ..DashboardConfig::default()
    };
    let mut cache = seeded_cache(&config);

    let table = cache.get().unwrap();
    assert!(Arc::ptr_eq(&table, &cache.get().unwrap()));
    assert_eq!(table.years(), (2018..=2024).collect::<Vec<_>>());

    let view = DashboardView::build(&table, &config.controls(), &config.forecast_settings()).unwrap();
    assert_eq!(view.selected, vec![Metric::Revenue, Metric::NetProfit]);
    assert_eq!(view.composite.forecast_years(), vec![2025]);
    assert_eq!(view.composite.historical_len(), 7);

    let workbook = view.export_workbook(&table).unwrap();
    let raw = workbook.sheet(RAW_DATA_SHEET).unwrap();
    assert_eq!(raw.rows.len(), 7);
    assert_eq!(raw.rows[0][0], CellValue::Integer(2018));

    let forecast = workbook.sheet(FORECAST_SHEET).unwrap();
    assert_eq!(forecast.header, vec!["year", "net_profit", "revenue"]);
    assert_eq!(forecast.rows.len(), 1);

    let first = XlsxWriter::write_to_bytes(&workbook).unwrap();
    let second = XlsxWriter::write_to_bytes(&workbook).unwrap();
    assert_eq!(first, second);
    assert_eq!(&first[..2], b"PK");
}

#[test]
fn refresh_swaps_table_without_touching_readers() {
    let config = DashboardConfig {
        seed: Some(5),
        ..DashboardConfig::default()
    };
    let mut cache = seeded_cache(&config);

    let before = cache.get().unwrap();
    let snapshot = before.rows().unwrap();
    let after = cache.refresh().unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.rows().unwrap(), snapshot);
    assert!(Arc::ptr_eq(&after, &cache.get().unwrap()));
}

#[test]
fn identical_seeds_export_identical_workbooks() {
    let config = DashboardConfig {
        seed: Some(11),
        ..DashboardConfig::default()
    };

    let export = || {
        let table = seeded_cache(&config).get().unwrap();
        let view =
            DashboardView::build(&table, &config.controls(), &config.forecast_settings()).unwrap();
        XlsxWriter::write_to_bytes(&view.export_workbook(&table).unwrap()).unwrap()
    };

    assert_eq!(export(), export());
}
