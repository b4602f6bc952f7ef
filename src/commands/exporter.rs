// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::Result;

use crate::commands::summary::date_range;
use crate::export::{ReportMeta, csv_to_path, json_to_path, pdf_to_path};
use crate::models::{ExpenseFilter, category_filter};
use crate::store::ExpenseStore;

pub fn handle(store: &ExpenseStore, m: &clap::ArgMatches) -> Result<()> {
    let (fmt, sub) = match m.subcommand() {
        Some(pair) => pair,
        None => return Ok(()),
    };
    let out = Path::new(sub.get_one::<String>("out").unwrap());
    let (from, to) = date_range(sub)?;
    let category = category_filter(sub.get_one::<String>("category").map(String::as_str));
    let filter = ExpenseFilter {
        category: category.clone(),
        from: Some(from),
        to: Some(to),
        ..Default::default()
    };
    let rows = store.list(&filter)?;

    match fmt {
        "csv" => csv_to_path(out, &rows)?,
        "json" => json_to_path(out, &rows)?,
        "pdf" => {
            let meta = ReportMeta {
                from,
                to,
                category,
                base_currency: store.base_currency()?,
            };
            pdf_to_path(out, &meta, &rows)?
        }
        other => anyhow::bail!("Unknown format: {} (use csv|json|pdf)", other),
    }
    println!("Exported {} expenses to {}", rows.len(), out.display());
    Ok(())
}
