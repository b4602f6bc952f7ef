// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use rust_decimal::Decimal;

/// Errors raised by [`crate::store::ExpenseStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The input was rejected before anything was written.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("expense {0} not found")]
    NotFound(i64),

    /// A stored value could not be read back, e.g. a malformed amount.
    #[error("corrupt expense row: {0}")]
    CorruptRow(String),

    /// A total over stored amounts does not fit in a `Decimal`.
    #[error("amount overflow: {0}")]
    Overflow(String),

    #[error("currency conversion failed: {0}")]
    Conversion(#[from] FxError),

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Errors raised while looking up or fetching exchange rates.
#[derive(Debug, thiserror::Error)]
pub enum FxError {
    #[error("no {from}->{to} rate on or before {date}")]
    MissingRate {
        date: chrono::NaiveDate,
        from: String,
        to: String,
    },

    #[error("invalid rate '{rate}' for {base}/{quote}")]
    InvalidRate {
        rate: String,
        base: String,
        quote: String,
    },

    #[error("{amount} {from} at rate {rate} overflows")]
    Overflow {
        amount: Decimal,
        rate: Decimal,
        from: String,
    },

    #[error("rate service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Errors raised while writing an export file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report total overflows")]
    Overflow,
}

/// Non-fatal outcome of adding an expense in a foreign currency when no rate
/// could be applied. The expense is stored with its unconverted amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionWarning {
    pub currency: String,
    pub reason: String,
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "using original {} amount (conversion failed: {})",
            self.currency, self.reason
        )
    }
}
