// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The expense store: CRUD over the `expenses` table plus the filtered list
//! and grouped-sum queries that back tables, summaries and exports.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params, types::Value};
use rust_decimal::Decimal;

use crate::db::init_schema;
use crate::error::{ConversionWarning, StoreError};
use crate::fx::RateSource;
use crate::models::{DEFAULT_CATEGORIES, Expense, ExpenseFilter, ExpenseInput, Summary};
use crate::utils::{checked_sum, get_base_currency, is_currency_code, set_base_currency};

/// Largest accepted price, 10^12. Keeps totals well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Result of [`ExpenseStore::add`].
#[derive(Debug, Clone, PartialEq)]
pub struct Added {
    pub id: i64,
    /// Amount as stored, in the base currency unless `warning` is set.
    pub amount: Decimal,
    pub warning: Option<ConversionWarning>,
}

/// Validated form of [`ExpenseInput`].
struct Fields {
    category: String,
    description: String,
    amount: Decimal,
    currency: String,
    date: NaiveDate,
}

fn validate(input: &ExpenseInput) -> Result<Fields, StoreError> {
    let description = input.description.trim();
    if description.is_empty() {
        return Err(StoreError::Validation(
            "please enter a good or service".into(),
        ));
    }
    let category = input.category.trim().to_uppercase();
    if category.is_empty() {
        return Err(StoreError::Validation("category must not be empty".into()));
    }
    let amount = input.amount.trim().parse::<Decimal>().map_err(|_| {
        StoreError::Validation(format!("'{}' is not a valid price", input.amount.trim()))
    })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(StoreError::Validation(format!(
            "price must not be negative, got {}",
            amount
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(StoreError::Validation(format!(
            "price must not exceed {}, got {}",
            MAX_AMOUNT, amount
        )));
    }
    let currency = input.currency.trim().to_uppercase();
    if !is_currency_code(&currency) {
        return Err(StoreError::Validation(format!(
            "'{}' is not a currency code",
            input.currency.trim()
        )));
    }
    Ok(Fields {
        category,
        description: description.to_string(),
        amount,
        currency,
        date: input.date,
    })
}

pub struct ExpenseStore {
    conn: Connection,
}

impl ExpenseStore {
    /// Take ownership of `conn`, creating the schema if needed.
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let store = Self::from_connection(Connection::open(path)?)?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn base_currency(&self) -> Result<String, StoreError> {
        Ok(get_base_currency(&self.conn)?)
    }

    /// Validate and insert a new expense, converting the amount to the base
    /// currency with `rates`. A failed conversion stores the raw amount and
    /// reports a [`ConversionWarning`] instead of failing.
    pub fn add(&self, input: &ExpenseInput, rates: &dyn RateSource) -> Result<Added, StoreError> {
        let f = validate(input)?;
        let base = self.base_currency()?;

        let (amount, warning) = if f.currency == base {
            (f.amount, None)
        } else {
            match rates.convert(f.date, f.amount, &f.currency, &base) {
                Ok(converted) => (converted.round_dp(2), None),
                Err(e) => {
                    tracing::warn!(currency = %f.currency, error = %e, "conversion failed, storing raw amount");
                    (
                        f.amount,
                        Some(ConversionWarning {
                            currency: f.currency.clone(),
                            reason: e.to_string(),
                        }),
                    )
                }
            }
        };

        self.conn.execute(
            "INSERT INTO expenses(category, description, amount, currency, date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                f.category,
                f.description,
                amount.to_string(),
                f.currency,
                f.date.to_string()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, category = %f.category, %amount, "expense added");
        Ok(Added {
            id,
            amount,
            warning,
        })
    }

    /// Overwrite every field of expense `id`. The amount is stored verbatim;
    /// no currency conversion happens on edit.
    pub fn update(&self, id: i64, input: &ExpenseInput) -> Result<(), StoreError> {
        let f = validate(input)?;
        let n = self.conn.execute(
            "UPDATE expenses SET category=?1, description=?2, amount=?3, currency=?4, date=?5
             WHERE id=?6",
            params![
                f.category,
                f.description,
                f.amount.to_string(),
                f.currency,
                f.date.to_string(),
                id
            ],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(id, "expense updated");
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let n = self
            .conn
            .execute("DELETE FROM expenses WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(id, "expense deleted");
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Expense, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, category, description, amount, currency, date FROM expenses WHERE id=?1",
                params![id],
                RawRow::from_row,
            )
            .optional()?;
        raw.ok_or(StoreError::NotFound(id))?.into_expense()
    }

    /// Expenses matching `filter`, newest date first, ties in insertion order.
    /// Search text is matched here rather than in SQL, where `lower()` only
    /// folds ASCII.
    pub fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, StoreError> {
        let mut sql = String::from(
            "SELECT id, category, description, amount, currency, date FROM expenses WHERE 1=1",
        );
        let mut args: Vec<Value> = Vec::new();
        let needle = filter.search_needle();

        if let Some(cat) = filter.category_name() {
            sql.push_str(" AND category=?");
            args.push(Value::Text(cat));
        }
        if let Some(from) = filter.from {
            sql.push_str(" AND date>=?");
            args.push(Value::Text(from.to_string()));
        }
        if let Some(to) = filter.to {
            sql.push_str(" AND date<=?");
            args.push(Value::Text(to.to_string()));
        }
        sql.push_str(" ORDER BY date DESC, id ASC");
        if let Some(limit) = filter.limit.filter(|_| needle.is_none()) {
            sql.push_str(" LIMIT ?");
            args.push(Value::Integer(limit as i64));
        }
        tracing::debug!(%sql, search = ?needle, "listing expenses");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(args), RawRow::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            if filter.limit.is_some_and(|n| out.len() >= n) {
                break;
            }
            let e = row?.into_expense()?;
            if needle.as_deref().is_none_or(|n| e.matches(n)) {
                out.push(e);
            }
        }
        Ok(out)
    }

    /// Totals over `[from, to]` inclusive, optionally for one category.
    pub fn summarize(
        &self,
        category: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Summary, StoreError> {
        if from > to {
            return Err(StoreError::Validation(format!(
                "start date {} is after end date {}",
                from, to
            )));
        }
        let filter = ExpenseFilter {
            category: category.map(str::to_string),
            from: Some(from),
            to: Some(to),
            ..Default::default()
        };
        let expenses = self.list(&filter)?;

        let overflow = || StoreError::Overflow(format!("totals for {} to {}", from, to));
        let mut per_date_totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        let mut per_category_totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for e in &expenses {
            let day = per_date_totals.entry(e.date).or_insert(Decimal::ZERO);
            *day = day.checked_add(e.amount).ok_or_else(overflow)?;
            let cat = per_category_totals
                .entry(e.category.clone())
                .or_insert(Decimal::ZERO);
            *cat = cat.checked_add(e.amount).ok_or_else(overflow)?;
        }
        let total = checked_sum(expenses.iter().map(|e| e.amount)).ok_or_else(overflow)?;
        let days = (to - from).num_days() + 1;
        let daily_average = total / Decimal::from(days);

        // Strictly greater keeps the alphabetically first category on ties.
        let mut top_category: Option<(String, Decimal)> = None;
        for (cat, amt) in &per_category_totals {
            if top_category.as_ref().is_none_or(|(_, best)| amt > best) {
                top_category = Some((cat.clone(), *amt));
            }
        }

        Ok(Summary {
            from,
            to,
            category: filter.category_name(),
            total,
            daily_average,
            top_category,
            per_date_totals,
            per_category_totals,
        })
    }

    /// Make `currency` the base currency, converting every stored amount
    /// from the current base at the expense's own date. Either all rows are
    /// converted or nothing changes. Returns the number of rows converted.
    pub fn set_base_currency(
        &self,
        currency: &str,
        rates: &dyn RateSource,
    ) -> Result<usize, StoreError> {
        let currency = currency.trim().to_uppercase();
        if !is_currency_code(&currency) {
            return Err(StoreError::Validation(format!(
                "'{}' is not a currency code",
                currency
            )));
        }
        let old = self.base_currency()?;
        if old == currency {
            return Ok(0);
        }

        let expenses = self.list(&ExpenseFilter::default())?;
        let tx = self.conn.unchecked_transaction()?;
        for e in &expenses {
            let amount = rates
                .convert(e.date, e.amount, &old, &currency)?
                .round_dp(2);
            tx.execute(
                "UPDATE expenses SET amount=?1 WHERE id=?2",
                params![amount.to_string(), e.id],
            )?;
        }
        set_base_currency(&tx, &currency)?;
        tx.commit()?;
        tracing::info!(from = %old, to = %currency, rows = expenses.len(), "base currency changed");
        Ok(expenses.len())
    }

    /// The default categories followed by any other stored category,
    /// alphabetically.
    pub fn categories(&self) -> Result<Vec<String>, StoreError> {
        let mut out: Vec<String> = DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect();
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM expenses ORDER BY category")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        for row in rows {
            let c = row?;
            if !out.contains(&c) {
                out.push(c);
            }
        }
        Ok(out)
    }
}

struct RawRow {
    id: i64,
    category: String,
    description: String,
    amount: String,
    currency: String,
    date: String,
}

impl RawRow {
    fn from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            category: r.get(1)?,
            description: r.get(2)?,
            amount: r.get(3)?,
            currency: r.get(4)?,
            date: r.get(5)?,
        })
    }

    fn into_expense(self) -> Result<Expense, StoreError> {
        let amount = self.amount.parse::<Decimal>().map_err(|_| {
            StoreError::CorruptRow(format!("expense {} has amount '{}'", self.id, self.amount))
        })?;
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| {
            StoreError::CorruptRow(format!("expense {} has date '{}'", self.id, self.date))
        })?;
        Ok(Expense {
            id: self.id,
            category: self.category,
            description: self.description,
            amount,
            currency: self.currency,
            date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::FixedRates;

    fn input(amount: &str) -> ExpenseInput {
        ExpenseInput {
            category: "food".into(),
            description: "Coffee".into(),
            amount: amount.into(),
            currency: "usd".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn validation_rejects_bad_amounts() {
        for bad in ["", "abc", "-1", "1,50", "79228162514264337593543950335"] {
            assert!(
                matches!(validate(&input(bad)), Err(StoreError::Validation(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn validation_normalises_case_and_accepts_zero() {
        let f = validate(&input("0")).unwrap();
        assert_eq!(f.category, "FOOD");
        assert_eq!(f.currency, "USD");
        assert!(f.amount.is_zero());
    }

    #[test]
    fn blank_description_is_rejected() {
        let mut i = input("1");
        i.description = "   ".into();
        let store = ExpenseStore::open_in_memory().unwrap();
        assert!(matches!(
            store.add(&i, &FixedRates::new()),
            Err(StoreError::Validation(_))
        ));
        assert!(store.list(&ExpenseFilter::default()).unwrap().is_empty());
    }
}
