// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use spendbook::error::{FxError, StoreError};
use spendbook::fx::{FixedRates, RateSource, SqliteRates};
use spendbook::models::{ExpenseFilter, ExpenseInput};
use spendbook::store::ExpenseStore;
use spendbook::utils::set_base_currency;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    spendbook::db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO settings(key,value) VALUES('base_currency','USD')",
        [],
    )
    .unwrap();
    conn
}

fn aug(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
}

#[test]
fn fx_triangulation_and_reciprocal() {
    let conn = setup();
    // USD->INR and USD->EUR available
    conn.execute(
        "INSERT INTO fx_rates(date,base,quote,rate) VALUES (?1,?2,?3,?4)",
        params!["2025-08-01", "USD", "INR", "83"],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO fx_rates(date,base,quote,rate) VALUES (?1,?2,?3,?4)",
        params!["2025-08-01", "USD", "EUR", "0.90"],
    )
    .unwrap();
    let rates = SqliteRates::new(&conn);

    // 90 EUR -> USD = 90 / 0.90 = 100 USD; -> INR = 100 * 83 = 8300
    let res = rates
        .convert(aug(15), Decimal::new(9000, 2), "EUR", "INR")
        .unwrap();
    assert_eq!(format!("{:.2}", res.round_dp(2)), "8300.00");

    // Reciprocal: INR -> USD using only USD->INR
    let res2 = rates
        .convert(aug(15), Decimal::new(16600, 2), "INR", "USD")
        .unwrap();
    assert_eq!(format!("{:.2}", res2.round_dp(2)), "2.00");
}

#[test]
fn rate_must_exist_on_or_before_date() {
    let conn = setup();
    conn.execute(
        "INSERT INTO fx_rates(date,base,quote,rate) VALUES ('2025-08-10','USD','GBP','0.80')",
        [],
    )
    .unwrap();
    let rates = SqliteRates::new(&conn);
    assert!(matches!(
        rates.rate(aug(9), "GBP", "USD"),
        Err(FxError::MissingRate { .. })
    ));
    assert_eq!(
        rates.rate(aug(20), "GBP", "USD").unwrap(),
        Decimal::new(125, 2)
    );
}

#[test]
fn latest_rate_wins() {
    let conn = setup();
    spendbook::fx::add_rate(&conn, aug(1), "USD", "EUR", Decimal::new(80, 2)).unwrap();
    spendbook::fx::add_rate(&conn, aug(5), "USD", "EUR", Decimal::new(50, 2)).unwrap();
    let rates = SqliteRates::new(&conn);
    assert_eq!(rates.rate(aug(3), "USD", "EUR").unwrap(), Decimal::new(80, 2));
    assert_eq!(rates.rate(aug(7), "USD", "EUR").unwrap(), Decimal::new(50, 2));
}

fn euro_lunch() -> ExpenseInput {
    ExpenseInput {
        category: "FOOD".into(),
        description: "Lunch".into(),
        amount: "10.00".into(),
        currency: "eur".into(),
        date: aug(2),
    }
}

#[test]
fn add_converts_to_base_currency() {
    let store = ExpenseStore::open_in_memory().unwrap();
    let rates = FixedRates::new().with("USD", "EUR", Decimal::new(80, 2));
    let added = store.add(&euro_lunch(), &rates).unwrap();
    assert!(added.warning.is_none());

    let e = store.get(added.id).unwrap();
    assert_eq!(format!("{:.2}", e.amount), "12.50");
    assert_eq!(e.currency, "EUR");
}

#[test]
fn add_with_stored_rates_converts() {
    let store = ExpenseStore::open_in_memory().unwrap();
    spendbook::fx::add_rate(store.conn(), aug(1), "USD", "EUR", Decimal::new(90, 2)).unwrap();
    let added = store
        .add(&euro_lunch(), &SqliteRates::new(store.conn()))
        .unwrap();
    assert!(added.warning.is_none());
    assert_eq!(format!("{:.2}", added.amount), "11.11");
}

#[test]
fn failed_conversion_stores_raw_amount_with_warning() {
    let store = ExpenseStore::open_in_memory().unwrap();
    let added = store.add(&euro_lunch(), &FixedRates::new()).unwrap();

    let warning = added.warning.expect("expected a conversion warning");
    assert_eq!(warning.currency, "EUR");
    assert!(warning.to_string().contains("using original EUR amount"));

    let rows = store.list(&ExpenseFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, Decimal::from(10));
}

#[test]
fn base_currency_is_configurable() {
    let store = ExpenseStore::open_in_memory().unwrap();
    assert_eq!(store.base_currency().unwrap(), "USD");
    set_base_currency(store.conn(), "EUR").unwrap();

    // EUR entry is now in the base currency: no conversion needed
    let added = store.add(&euro_lunch(), &FixedRates::new()).unwrap();
    assert!(added.warning.is_none());
    assert_eq!(added.amount, Decimal::from(10));
}

#[test]
fn conversion_overflow_falls_back_to_warning() {
    let store = ExpenseStore::open_in_memory().unwrap();
    let rates = FixedRates::new().with("EUR", "USD", Decimal::MAX);
    let mut big = euro_lunch();
    big.amount = "1000000".into();
    let added = store.add(&big, &rates).unwrap();

    assert!(added.warning.is_some());
    assert_eq!(added.amount, Decimal::from(1_000_000));
}

#[test]
fn changing_base_reconverts_stored_amounts() {
    let store = ExpenseStore::open_in_memory().unwrap();
    let mut tea = euro_lunch();
    tea.currency = "USD".into();
    let id = store.add(&tea, &FixedRates::new()).unwrap().id;
    spendbook::fx::add_rate(store.conn(), aug(1), "USD", "JPY", Decimal::from(150)).unwrap();

    let n = store
        .set_base_currency("jpy", &SqliteRates::new(store.conn()))
        .unwrap();
    assert_eq!(n, 1);
    assert_eq!(store.base_currency().unwrap(), "JPY");
    assert_eq!(store.get(id).unwrap().amount, Decimal::from(1500));

    let s = store.summarize(None, aug(2), aug(2)).unwrap();
    assert_eq!(s.total, Decimal::from(1500));
}

#[test]
fn changing_base_without_rates_changes_nothing() {
    let store = ExpenseStore::open_in_memory().unwrap();
    let mut early = euro_lunch();
    early.currency = "USD".into();
    let first = store.add(&early, &FixedRates::new()).unwrap().id;
    let mut late = early.clone();
    late.date = aug(9);
    let second = store.add(&late, &FixedRates::new()).unwrap().id;
    // Only the later expense has a rate available.
    spendbook::fx::add_rate(store.conn(), aug(5), "USD", "JPY", Decimal::from(150)).unwrap();

    let err = store
        .set_base_currency("JPY", &SqliteRates::new(store.conn()))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Conversion(FxError::MissingRate { .. })
    ));
    assert_eq!(store.base_currency().unwrap(), "USD");
    assert_eq!(store.get(first).unwrap().amount, Decimal::from(10));
    assert_eq!(store.get(second).unwrap().amount, Decimal::from(10));
}

#[test]
fn fetch_days_is_bounded() {
    let parse = |days: &str| {
        spendbook::cli::build_cli()
            .try_get_matches_from(["spendbook", "fx", "fetch", "--days", days])
    };
    assert!(parse("30").is_ok());
    assert!(parse("0").is_err());
    assert!(parse("3651").is_err());
    assert!(parse("18446744073709551615").is_err());
}
