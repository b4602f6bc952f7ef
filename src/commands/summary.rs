// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::expenses::filter_from;
use crate::models::Summary;
use crate::store::ExpenseStore;
use crate::utils::{align_right, fmt_amount, fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::{Local, Months, NaiveDate};

/// `--from`/`--to`, defaulting to the month up to today.
pub fn date_range(sub: &clap::ArgMatches) -> Result<(NaiveDate, NaiveDate)> {
    let filter = filter_from(sub)?;
    let to = filter.to.unwrap_or_else(|| Local::now().date_naive());
    let from = filter
        .from
        .unwrap_or_else(|| to.checked_sub_months(Months::new(1)).unwrap_or(to));
    Ok((from, to))
}

pub fn handle(store: &ExpenseStore, sub: &clap::ArgMatches) -> Result<()> {
    let (from, to) = date_range(sub)?;
    let category = sub.get_one::<String>("category").map(String::as_str);
    let summary = store.summarize(category, from, to)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &summary)? {
        return Ok(());
    }
    print_summary(&summary, &store.base_currency()?);
    Ok(())
}

fn print_summary(s: &Summary, base: &str) {
    println!(
        "Expense summary from {} to {} ({})",
        s.from,
        s.to,
        s.category.as_deref().unwrap_or("ALL CATEGORIES")
    );
    println!("Total: {}", fmt_money(&s.total, base));
    println!("Daily average: {}", fmt_money(&s.daily_average, base));
    match &s.top_category {
        Some((cat, amt)) => println!("Top category: {} ({})", cat, fmt_money(amt, base)),
        None => println!("Top category: N/A"),
    }

    let daily: Vec<Vec<String>> = s
        .per_date_totals
        .iter()
        .map(|(d, amt)| vec![d.to_string(), fmt_amount(amt)])
        .collect();
    let mut t = pretty_table(&["Date", &format!("Spent ({})", base)], daily);
    align_right(&mut t, &[1]);
    println!("{}", t);

    let by_cat: Vec<Vec<String>> = s
        .per_category_totals
        .iter()
        .map(|(c, amt)| vec![c.clone(), fmt_amount(amt)])
        .collect();
    let mut t = pretty_table(&["Category", &format!("Spent ({})", base)], by_cat);
    align_right(&mut t, &[1]);
    println!("{}", t);
}
