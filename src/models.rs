// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "FOOD",
    "HOUSEHOLD",
    "TRANSPORTATION",
    "ENTERTAINMENT",
    "HEALTH",
    "OTHER",
];

/// Currencies offered for entry; rates are fetched for these by default.
pub const SUPPORTED_CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "JPY", "INR"];

/// Category filter values meaning "do not filter by category".
const ALL_CATEGORIES: [&str; 2] = ["all", "all categories"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub category: String,
    pub description: String,
    pub amount: Decimal, // base currency
    pub currency: String, // as entered
    pub date: NaiveDate,
}

impl Expense {
    /// Case-insensitive substring match on category, description or date.
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        self.category.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.date.to_string().contains(needle)
    }
}

/// User-supplied fields for adding or editing an expense. The amount is kept
/// as text so that parsing is part of validation.
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub category: String,
    pub description: String,
    pub amount: String,
    pub currency: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl ExpenseFilter {
    /// Search text, trimmed and lower-cased; `None` when blank.
    pub fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Category to match exactly; `None` when absent or the "all" sentinel.
    pub fn category_name(&self) -> Option<String> {
        category_filter(self.category.as_deref())
    }
}

pub fn category_filter(raw: Option<&str>) -> Option<String> {
    let c = raw?.trim();
    if c.is_empty() || ALL_CATEGORIES.contains(&c.to_lowercase().as_str()) {
        None
    } else {
        Some(c.to_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub category: Option<String>,
    pub total: Decimal,
    pub daily_average: Decimal,
    pub top_category: Option<(String, Decimal)>,
    pub per_date_totals: BTreeMap<NaiveDate, Decimal>,
    pub per_category_totals: BTreeMap<String, Decimal>,
}

impl Summary {
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}
