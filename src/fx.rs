// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Exchange rate lookup.
//!
//! Rates are stored as `1 base = rate quote` per day. Conversions go through
//! the configured base currency as a hub and fall back to a reciprocal pair.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::FxError;
use crate::utils::get_base_currency;

const UA: &str = concat!("spendbook/", env!("CARGO_PKG_VERSION"));

const FRANKFURTER: &str = "https://api.frankfurter.dev";

/// Point-in-time exchange rate lookup.
pub trait RateSource {
    /// Multiplier such that `amount_in_from * rate == amount_in_to` on `date`.
    fn rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<Decimal, FxError>;

    fn convert(
        &self,
        date: NaiveDate,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Decimal, FxError> {
        let rate = self.rate(date, from, to)?;
        amount.checked_mul(rate).ok_or_else(|| FxError::Overflow {
            amount,
            rate,
            from: from.to_string(),
        })
    }
}

fn reciprocal(r: Decimal, base: &str, quote: &str) -> Result<Decimal, FxError> {
    Decimal::ONE.checked_div(r).ok_or_else(|| FxError::InvalidRate {
        rate: r.to_string(),
        base: base.to_string(),
        quote: quote.to_string(),
    })
}

/// Rates read from the `fx_rates` table, closest on-or-before `date`.
pub struct SqliteRates<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRates<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn find(&self, date: NaiveDate, base: &str, quote: &str) -> Result<Option<Decimal>, FxError> {
        let mut stmt = self.conn.prepare(
            "SELECT rate FROM fx_rates WHERE base=?1 AND quote=?2 AND date<=?3 ORDER BY date DESC LIMIT 1",
        )?;
        let r: Option<String> = stmt
            .query_row(params![base, quote, date.to_string()], |r| r.get(0))
            .optional()?;
        match r {
            Some(s) => {
                let d = s.parse::<Decimal>().map_err(|_| FxError::InvalidRate {
                    rate: s.clone(),
                    base: base.to_string(),
                    quote: quote.to_string(),
                })?;
                Ok(Some(d))
            }
            None => Ok(None),
        }
    }

    /// Direct pair, else the reciprocal of the reversed pair.
    fn pair(&self, date: NaiveDate, from: &str, to: &str) -> Result<Option<Decimal>, FxError> {
        if let Some(r) = self.find(date, from, to)? {
            return Ok(Some(r));
        }
        match self.find(date, to, from)? {
            Some(r) => Ok(Some(reciprocal(r, to, from)?)),
            None => Ok(None),
        }
    }
}

impl RateSource for SqliteRates<'_> {
    fn rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<Decimal, FxError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let missing = || FxError::MissingRate {
            date,
            from: from.to_string(),
            to: to.to_string(),
        };
        if let Some(r) = self.pair(date, from, to)? {
            return Ok(r);
        }
        let hub = get_base_currency(self.conn)?;
        if from == hub || to == hub {
            return Err(missing());
        }
        let leg1 = self.pair(date, from, &hub)?.ok_or_else(missing)?;
        let leg2 = self.pair(date, &hub, to)?.ok_or_else(missing)?;
        leg1.checked_mul(leg2).ok_or_else(|| FxError::InvalidRate {
            rate: format!("{leg1} * {leg2}"),
            base: from.to_string(),
            quote: to.to_string(),
        })
    }
}

/// Date-independent rates held in memory.
#[derive(Debug, Default, Clone)]
pub struct FixedRates {
    rates: HashMap<(String, String), Decimal>,
}

impl FixedRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `1 base = rate quote`.
    pub fn with(mut self, base: &str, quote: &str, rate: Decimal) -> Self {
        self.rates
            .insert((base.to_uppercase(), quote.to_uppercase()), rate);
        self
    }
}

impl RateSource for FixedRates {
    fn rate(&self, date: NaiveDate, from: &str, to: &str) -> Result<Decimal, FxError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        if let Some(r) = self.rates.get(&(from.to_string(), to.to_string())) {
            return Ok(*r);
        }
        if let Some(r) = self.rates.get(&(to.to_string(), from.to_string())) {
            return reciprocal(*r, to, from);
        }
        Err(FxError::MissingRate {
            date,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

pub fn http_client() -> Result<reqwest::blocking::Client, FxError> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn add_rate(
    conn: &Connection,
    date: NaiveDate,
    base: &str,
    quote: &str,
    rate: Decimal,
) -> Result<(), FxError> {
    conn.execute(
        "INSERT INTO fx_rates(date, base, quote, rate) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(date, base, quote) DO UPDATE SET rate=excluded.rate",
        params![date.to_string(), base, quote, rate.to_string()],
    )?;
    tracing::info!(%date, base, quote, %rate, "fx rate stored");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct Series {
    rates: HashMap<String, HashMap<String, f64>>,
    #[serde(rename = "base")]
    _base: String,
}

/// Download `base -> quote` rates for the last `days` days from Frankfurter
/// (ECB). Returns the number of rows inserted.
pub fn fetch_rates(conn: &Connection, days: u16, quotes: &[String]) -> Result<usize, FxError> {
    let base = get_base_currency(conn)?;
    let targets: Vec<&str> = quotes
        .iter()
        .map(String::as_str)
        .filter(|c| *c != base)
        .collect();
    if targets.is_empty() {
        return Ok(0);
    }
    let today = Utc::now().date_naive();
    let start = today - chrono::Duration::days(i64::from(days));
    let url = format!(
        "{FRANKFURTER}/{start}..{today}?from={base}&to={}",
        targets.join(",")
    );
    tracing::info!(%url, "fetching fx rates");
    let resp = http_client()?.get(url).send()?.error_for_status()?;
    let s: Series = resp.json()?;
    let mut inserted = 0;
    for (date, mp) in s.rates {
        for (quote, rate) in mp {
            inserted += conn.execute(
                "INSERT OR IGNORE INTO fx_rates(date, base, quote, rate) VALUES (?1, ?2, ?3, ?4)",
                params![date, base, quote, rate.to_string()],
            )?;
        }
    }
    Ok(inserted)
}
