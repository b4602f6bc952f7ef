// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::fx::SqliteRates;
use crate::models::{Expense, ExpenseFilter, ExpenseInput};
use crate::store::ExpenseStore;
use crate::utils::{align_right, fmt_amount, maybe_print_json, parse_date, pretty_table};
use anyhow::{Context, Result};
use chrono::Local;

pub fn handle(store: &ExpenseStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store.delete(id)?;
            println!("Removed expense {}", id);
        }
        Some(("show", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let e = store.get(id)?;
            let rows = vec![e];
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
                print_table(&rows);
            }
        }
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &ExpenseStore, sub: &clap::ArgMatches) -> Result<()> {
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => c.to_string(),
        None => store.base_currency()?,
    };
    let input = ExpenseInput {
        category: sub.get_one::<String>("category").unwrap().to_string(),
        description: sub.get_one::<String>("description").unwrap().to_string(),
        amount: sub.get_one::<String>("amount").unwrap().to_string(),
        currency,
        date,
    };

    let added = store.add(&input, &SqliteRates::new(store.conn()))?;
    if let Some(w) = &added.warning {
        eprintln!("Warning: {}", w);
    }
    println!(
        "Recorded expense {}: {} {} on {}",
        added.id,
        fmt_amount(&added.amount),
        input.description.trim(),
        date
    );
    Ok(())
}

/// Fields left out keep their current value, like a pre-filled edit form.
fn edit(store: &ExpenseStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let current = store.get(id)?;
    let pick = |key: &str, cur: String| {
        sub.get_one::<String>(key)
            .map(|s| s.to_string())
            .unwrap_or(cur)
    };
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => current.date,
    };
    let input = ExpenseInput {
        category: pick("category", current.category),
        description: pick("description", current.description),
        amount: pick("amount", current.amount.to_string()),
        currency: pick("currency", current.currency),
        date,
    };
    store.update(id, &input)?;
    println!("Updated expense {}", id);
    Ok(())
}

fn list(store: &ExpenseStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(store, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        print_table(&data);
    }
    Ok(())
}

fn print_table(data: &[Expense]) {
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.category.clone(),
                e.description.clone(),
                fmt_amount(&e.amount),
                e.currency.clone(),
                e.date.to_string(),
            ]
        })
        .collect();
    let mut t = pretty_table(
        &["ID", "Type", "Description", "Amount", "Currency", "Date"],
        rows,
    );
    align_right(&mut t, &[0, 3]);
    println!("{}", t);
}

/// Build a filter from `--search`, `--category`, `--from`, `--to` and
/// `--limit`, whichever the subcommand defines.
pub fn filter_from(sub: &clap::ArgMatches) -> Result<ExpenseFilter> {
    let date_arg = |key: &str| -> Result<Option<chrono::NaiveDate>> {
        match sub.try_get_one::<String>(key).ok().flatten() {
            Some(s) => Ok(Some(
                parse_date(s).with_context(|| format!("--{} is not a date", key))?,
            )),
            None => Ok(None),
        }
    };
    Ok(ExpenseFilter {
        search: sub.try_get_one::<String>("search").ok().flatten().cloned(),
        category: sub.try_get_one::<String>("category").ok().flatten().cloned(),
        from: date_arg("from")?,
        to: date_arg("to")?,
        limit: sub.try_get_one::<usize>("limit").ok().flatten().copied(),
    })
}

pub fn query_rows(store: &ExpenseStore, sub: &clap::ArgMatches) -> Result<Vec<Expense>> {
    let filter = filter_from(sub)?;
    Ok(store.list(&filter)?)
}
