//! Parquet panel loading

use crate::common::{month_ends, panel_rows};
use pit_backtest::data::{load_store, ParquetReader, ParquetWriter};
use tempfile::TempDir;

fn write_panels(dir: &TempDir, months: usize) -> (std::path::PathBuf, std::path::PathBuf) {
    let (prices, ratios, names) = panel_rows(months);
    let writer = ParquetWriter::new(dir.path());
    let prices_path = dir.path().join("prices.parquet");
    let ratios_path = dir.path().join("ratios.parquet");
    writer.write_prices(&prices_path, &prices).unwrap();
    writer.write_ratios(&ratios_path, &names, &ratios).unwrap();
    (prices_path, ratios_path)
}

#[test]
fn test_load_store_from_parquet() {
    let dir = TempDir::new().unwrap();
    let (prices_path, ratios_path) = write_panels(&dir, 10);

    let store = load_store(&prices_path, &ratios_path, None).unwrap();
    let (prices, ratios, _) = panel_rows(10);

    assert_eq!(store.prices().len(), prices.len());
    assert_eq!(store.ratios().len(), ratios.len());
    assert_eq!(store.feature_names(), &["pe".to_string(), "pb".to_string()]);
    assert_eq!(store.universe().dates(), month_ends(10).as_slice());
}

#[test]
fn test_load_store_truncates_at_max_date() {
    let dir = TempDir::new().unwrap();
    let (prices_path, ratios_path) = write_panels(&dir, 10);
    let m = month_ends(10);

    let store = load_store(&prices_path, &ratios_path, Some(m[5])).unwrap();
    assert_eq!(store.universe().dates(), &m[..=5]);
    assert!(store.prices().rows().iter().all(|r| r.date <= m[5]));
}

#[test]
fn test_duplicate_rows_fail_loading() {
    let dir = TempDir::new().unwrap();
    let (mut prices, ratios, names) = panel_rows(3);
    prices.push(prices[0].clone());

    let writer = ParquetWriter::new(dir.path());
    let prices_path = dir.path().join("prices.parquet");
    let ratios_path = dir.path().join("ratios.parquet");
    writer.write_prices(&prices_path, &prices).unwrap();
    writer.write_ratios(&ratios_path, &names, &ratios).unwrap();

    let err = load_store(&prices_path, &ratios_path, None).unwrap_err();
    assert!(err.to_string().contains("Duplicate row"));
}

#[test]
fn test_missing_file_reports_path() {
    let err = ParquetReader::new("/nonexistent/prices.parquet")
        .read_prices()
        .unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/prices.parquet"));
}
