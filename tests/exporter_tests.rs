// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use serde_json::json;
use spendbook::error::ExportError;
use spendbook::export::{self, ReportMeta};
use spendbook::fx::FixedRates;
use spendbook::models::{Expense, ExpenseFilter, ExpenseInput};
use spendbook::store::ExpenseStore;
use spendbook::{cli, commands::exporter};
use tempfile::tempdir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn store_with(rows: &[(&str, &str, &str, u32)]) -> ExpenseStore {
    let store = ExpenseStore::open_in_memory().unwrap();
    for (category, description, amount, d) in rows {
        store
            .add(
                &ExpenseInput {
                    category: category.to_string(),
                    description: description.to_string(),
                    amount: amount.to_string(),
                    currency: "USD".into(),
                    date: day(*d),
                },
                &FixedRates::new(),
            )
            .unwrap();
    }
    store
}

fn coffee_and_tea() -> Vec<Expense> {
    store_with(&[("FOOD", "Coffee", "3.5", 1), ("FOOD", "Tea", "2.50", 2)])
        .list(&ExpenseFilter::default())
        .unwrap()
}

#[test]
fn csv_has_header_and_two_decimal_amounts() {
    let mut buf = Vec::new();
    export::write_csv(&mut buf, &coffee_and_tea()).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "Date,Category,Description,Amount,Currency",
            "2024-01-02,FOOD,Tea,2.50,USD",
            "2024-01-01,FOOD,Coffee,3.50,USD",
        ]
    );
}

#[test]
fn csv_quotes_descriptions_with_commas() {
    let rows = store_with(&[("OTHER", "Nails, screws", "1", 1)])
        .list(&ExpenseFilter::default())
        .unwrap();
    let mut buf = Vec::new();
    export::write_csv(&mut buf, &rows).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("\"Nails, screws\""));
}

#[test]
fn json_export_lists_rows() {
    let mut buf = Vec::new();
    export::write_json(&mut buf, &coffee_and_tea()).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(
        parsed[1],
        json!({
            "date": "2024-01-01",
            "category": "FOOD",
            "description": "Coffee",
            "amount": "3.50",
            "currency": "USD"
        })
    );
}

#[test]
fn pdf_report_is_a_complete_document() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("report.pdf");
    let meta = ReportMeta {
        from: day(1),
        to: day(31),
        category: Some("FOOD".into()),
        base_currency: "USD".into(),
    };
    export::pdf_to_path(&out, &meta, &coffee_and_tea()).unwrap();

    let bytes = std::fs::read(&out).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.starts_with("%PDF-"));
    assert!(text.trim_end().ends_with("%%EOF"));
    assert!(text.contains("(Expense Report) Tj"));
    assert!(text.contains("(Period: 2024-01-01 to 2024-01-31) Tj"));
    assert!(text.contains("(Category: FOOD) Tj"));
    assert!(text.contains("(Total Expenses: USD 6.00) Tj"));
    assert!(text.contains("(Coffee) Tj"));
}

#[test]
fn pdf_report_paginates_long_tables() {
    let rows: Vec<Expense> = (0..120)
        .map(|i| Expense {
            id: i,
            category: "FOOD".into(),
            description: format!("Item {i}"),
            amount: rust_decimal::Decimal::ONE,
            currency: "USD".into(),
            date: day(1),
        })
        .collect();
    let meta = ReportMeta {
        from: day(1),
        to: day(1),
        category: None,
        base_currency: "USD".into(),
    };
    let doc = export::render_report(&meta, &rows).unwrap();
    assert!(doc.page_count() > 1);
}

#[test]
fn pdf_report_total_overflow_is_an_error() {
    let rows: Vec<Expense> = (0..2)
        .map(|i| Expense {
            id: i,
            category: "FOOD".into(),
            description: "Huge".into(),
            amount: rust_decimal::Decimal::MAX,
            currency: "USD".into(),
            date: day(1),
        })
        .collect();
    let meta = ReportMeta {
        from: day(1),
        to: day(1),
        category: None,
        base_currency: "USD".into(),
    };
    assert!(matches!(
        export::render_report(&meta, &rows),
        Err(ExportError::Overflow)
    ));

    let dir = tempdir().unwrap();
    let out = dir.path().join("huge.pdf");
    assert!(export::pdf_to_path(&out, &meta, &rows).is_err());
    assert!(!out.exists());
}

#[test]
fn unwritable_destination_is_an_io_error() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("missing").join("out.csv");
    let err = export::csv_to_path(&out, &coffee_and_tea()).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
    assert!(!out.exists());
}

#[test]
fn export_command_filters_by_range_and_category() {
    let store = store_with(&[
        ("FOOD", "Coffee", "3.50", 1),
        ("FOOD", "Tea", "2.50", 2),
        ("HEALTH", "Aspirin", "5", 2),
        ("FOOD", "Late", "9", 20),
    ]);
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "spendbook",
        "export",
        "csv",
        "--out",
        &out_str,
        "--from",
        "2024-01-01",
        "--to",
        "2024-01-10",
        "--category",
        "food",
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&store, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(contents.lines().count(), 3);
    assert!(contents.contains("Coffee"));
    assert!(!contents.contains("Aspirin"));
    assert!(!contents.contains("Late"));
}
