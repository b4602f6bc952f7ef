// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::fx::{RateSource, SqliteRates, add_rate, fetch_rates};
use crate::models::SUPPORTED_CURRENCIES;
use crate::store::ExpenseStore;
use crate::utils::{parse_currency, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, bail};
use chrono::Local;
use rusqlite::Connection;

pub fn handle(store: &ExpenseStore, m: &clap::ArgMatches) -> Result<()> {
    let conn = store.conn();
    match m.subcommand() {
        Some(("set-base", sub)) => {
            let ccy = parse_currency(sub.get_one::<String>("currency").unwrap())?;
            let n = store.set_base_currency(&ccy, &SqliteRates::new(conn))?;
            println!("Base currency set to {} ({} expenses converted)", ccy, n);
        }
        Some(("add", sub)) => {
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            let base = parse_currency(sub.get_one::<String>("base").unwrap())?;
            let quote = parse_currency(sub.get_one::<String>("quote").unwrap())?;
            let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            if rate <= rust_decimal::Decimal::ZERO {
                bail!("Rate must be positive, got {}", rate);
            }
            add_rate(conn, date, &base, &quote, rate)?;
            println!("Stored {} 1 {} = {} {}", date, base, rate, quote);
        }
        Some(("fetch", sub)) => {
            let days: u16 = *sub.get_one::<u16>("days").unwrap_or(&120);
            let quotes = wanted_currencies(conn)?;
            let n = fetch_rates(conn, days, &quotes)?;
            println!("FX rates fetched via Frankfurter (ECB): {} new rows.", n);
        }
        Some(("list", _)) => list_rates(conn)?,
        Some(("convert", sub)) => {
            let date = match sub.get_one::<String>("date") {
                Some(d) => parse_date(d)?,
                None => Local::now().date_naive(),
            };
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let from = parse_currency(sub.get_one::<String>("from").unwrap())?;
            let to = parse_currency(sub.get_one::<String>("to").unwrap())?;
            let res = SqliteRates::new(conn).convert(date, amount, &from, &to)?;
            println!("{} {} -> {:.4} {}", amount, from, res, to);
        }
        _ => {}
    }
    Ok(())
}

/// Common entry currencies plus any already used by stored expenses.
fn wanted_currencies(conn: &Connection) -> Result<Vec<String>> {
    let mut out: Vec<String> = SUPPORTED_CURRENCIES.iter().map(|c| c.to_string()).collect();
    let mut stmt = conn.prepare("SELECT DISTINCT currency FROM expenses")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    for row in rows {
        let c = row?;
        if !c.is_empty() && !out.contains(&c) {
            out.push(c);
        }
    }
    Ok(out)
}

fn list_rates(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT date, base, quote, rate FROM fx_rates ORDER BY date DESC, base, quote LIMIT 50",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (d, b, q, r) = row?;
        data.push(vec![d, b, q, r]);
    }
    println!("{}", pretty_table(&["Date", "Base", "Quote", "Rate"], data));
    Ok(())
}
