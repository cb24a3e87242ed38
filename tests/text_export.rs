//! Text export: delimiter, quoting, line endings and codepage.

use chrono::{NaiveDate, NaiveDateTime};

use shelf::model::{CategoryRef, InventoryItem, RecordView};
use shelf::options::ReportOptions;
use shelf::{ReportEngine, ReportError};

fn frozen_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn record(sku: &str, name: &str) -> RecordView {
    RecordView::from(&InventoryItem {
        id: sku.to_string(),
        sku: sku.to_string(),
        name: name.to_string(),
        price: 12.5,
        stock: 4,
        barcode: Some("4006381333931".to_string()),
        category: Some(CategoryRef {
            name: Some("Acoustic".to_string()),
            path: Some("Guitars > Acoustic".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn options(keys: &[&str]) -> ReportOptions {
    ReportOptions {
        selected_columns: keys.iter().map(|k| k.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn test_header_and_rows_are_quoted_with_crlf() {
    let out = ReportEngine::new()
        .build_text(&[record("A-1", "Capo")], &options(&["sku", "stock"]), frozen_clock())
        .unwrap();
    assert_eq!(out.text, b"\"Sku\";\"Stock\"\r\n\"A-1\";\"4\"\r\n".to_vec());
    assert_eq!(out.media_type, "text/csv; charset=windows-1252");
    assert_eq!(out.suggested_file_name, "Inventory_report_20261015_093000.csv");
}

#[test]
fn test_category_lines_are_joined() {
    let out = ReportEngine::new()
        .build_text(&[record("A-1", "Capo")], &options(&["category"]), frozen_clock())
        .unwrap();
    let text = String::from_utf8(out.text).unwrap();
    assert!(text.contains("\"Acoustic - Guitars > Acoustic\""), "{text}");
}

#[test]
fn test_embedded_quotes_are_doubled() {
    let out = ReportEngine::new()
        .build_text(&[record("A-1", "12\" gig bag")], &options(&["name"]), frozen_clock())
        .unwrap();
    let text = String::from_utf8(out.text).unwrap();
    assert!(text.contains("\"12\"\" gig bag\""), "{text}");
}

#[test]
fn test_output_is_windows_1252() {
    let mut item = record("Ü-1", "Pick");
    item.location = "Regal für Saiten €".to_string();
    let out = ReportEngine::new()
        .build_text(&[item], &options(&["sku", "location"]), frozen_clock())
        .unwrap();
    assert!(out.text.windows(2).any(|w| w == [b'"', 0xDC]));
    assert!(out.text.contains(&0xFC));
    assert!(out.text.contains(&0x80));
    assert!(std::str::from_utf8(&out.text).is_err());
}

#[test]
fn test_synthetic_column_is_empty_and_barcode_raw() {
    let opts = ReportOptions {
        custom_column_title: Some("counted".to_string()),
        ..options(&["sku", "barcode"])
    };
    let out = ReportEngine::new()
        .build_text(&[record("A-1", "Capo")], &opts, frozen_clock())
        .unwrap();
    let text = String::from_utf8(out.text).unwrap();
    let lines: Vec<&str> = text.split("\r\n").collect();
    assert_eq!(lines[0], "\"Sku\";\"Barcode\";\"Counted\"");
    assert_eq!(lines[1], "\"A-1\";\"4006381333931\";\"\"");
}

#[test]
fn test_rows_follow_sort_order() {
    let opts = ReportOptions {
        sort_order: shelf::options::SortOrder::Desc,
        ..options(&["name"])
    };
    let out = ReportEngine::new()
        .build_text(&[record("A-1", "Capo"), record("B-1", "Tuner")], &opts, frozen_clock())
        .unwrap();
    let text = String::from_utf8(out.text).unwrap();
    let tuner = text.find("Tuner").unwrap();
    let capo = text.find("Capo").unwrap();
    assert!(tuner < capo);
}

#[test]
fn test_empty_selection_rejected() {
    let err = ReportEngine::new()
        .build_text(&[], &ReportOptions::default(), frozen_clock())
        .unwrap_err();
    assert!(matches!(err, ReportError::EmptySelection));
}

#[test]
fn test_persist_writes_encoded_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labels.csv");
    let out = ReportEngine::new()
        .build_text(&[record("A-1", "Capo")], &options(&["sku"]), frozen_clock())
        .unwrap();
    out.persist(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), out.text);
}
