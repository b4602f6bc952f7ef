// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! CSV, JSON and PDF writers over a list of expenses.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ExportError;
use crate::models::Expense;
use crate::pdf::{Document, Font, PAGE_HEIGHT, PAGE_WIDTH, Page, clip, text_width};
use crate::utils::{checked_sum, fmt_amount, fmt_money};

pub const HEADERS: [&str; 5] = ["Date", "Category", "Description", "Amount", "Currency"];

#[derive(Debug, Serialize)]
pub struct ExportRow {
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: String,
    pub currency: String,
}

impl From<&Expense> for ExportRow {
    fn from(e: &Expense) -> Self {
        Self {
            date: e.date.to_string(),
            category: e.category.clone(),
            description: e.description.clone(),
            amount: fmt_amount(&e.amount),
            currency: e.currency.clone(),
        }
    }
}

/// Heading data for the PDF report.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub category: Option<String>,
    pub base_currency: String,
}

pub fn write_csv<W: Write>(w: W, expenses: &[Expense]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(HEADERS)?;
    for e in expenses {
        let r = ExportRow::from(e);
        wtr.write_record([r.date, r.category, r.description, r.amount, r.currency])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_json<W: Write>(w: W, expenses: &[Expense]) -> Result<(), ExportError> {
    let rows: Vec<ExportRow> = expenses.iter().map(ExportRow::from).collect();
    serde_json::to_writer_pretty(w, &rows)?;
    Ok(())
}

/// Run `write` against a fresh file at `path`. On failure the partial file
/// is removed.
fn to_path<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), ExportError>,
{
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut w = BufWriter::new(file);
    let res = write(&mut w).and_then(|_| w.flush().map_err(io_err));
    if res.is_err() {
        let _ = fs::remove_file(path);
    }
    res
}

pub fn csv_to_path(path: &Path, expenses: &[Expense]) -> Result<(), ExportError> {
    to_path(path, |w| write_csv(w, expenses))?;
    tracing::info!(path = %path.display(), rows = expenses.len(), "csv export written");
    Ok(())
}

pub fn json_to_path(path: &Path, expenses: &[Expense]) -> Result<(), ExportError> {
    to_path(path, |w| write_json(w, expenses))?;
    tracing::info!(path = %path.display(), rows = expenses.len(), "json export written");
    Ok(())
}

pub fn pdf_to_path(path: &Path, meta: &ReportMeta, expenses: &[Expense]) -> Result<(), ExportError> {
    let doc = render_report(meta, expenses)?;
    to_path(path, |w| {
        w.write_all(&doc.to_bytes()).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    })?;
    tracing::info!(
        path = %path.display(),
        rows = expenses.len(),
        pages = doc.page_count(),
        "pdf export written"
    );
    Ok(())
}

const MARGIN: f32 = 28.0;
const ROW_HEIGHT: f32 = 20.0;
const COLUMNS: [f32; 5] = [113.0, 113.0, 170.0, 71.0, 71.0];

fn table_header(page: &mut Page, y: f32) {
    let mut x = MARGIN;
    for (title, w) in HEADERS.iter().zip(COLUMNS) {
        page.rect(x, y - 6.0, w, ROW_HEIGHT);
        page.text(x + 3.0, y, Font::Bold, 12.0, title);
        x += w;
    }
}

/// Lay out the report: title, period/category/total lines, then a table
/// that continues on new pages as needed, repeating its header.
pub fn render_report(meta: &ReportMeta, expenses: &[Expense]) -> Result<Document, ExportError> {
    let total = checked_sum(expenses.iter().map(|e| e.amount)).ok_or(ExportError::Overflow)?;
    let mut doc = Document::new();
    let page = doc.add_page();

    let title = "Expense Report";
    let title_x = (PAGE_WIDTH - text_width(title, 16.0)) / 2.0;
    let mut y = PAGE_HEIGHT - MARGIN - 16.0;
    page.text(title_x, y, Font::Bold, 16.0, title);
    y -= 2.0 * ROW_HEIGHT;

    let category = meta.category.as_deref().unwrap_or("ALL CATEGORIES");
    for line in [
        format!("Period: {} to {}", meta.from, meta.to),
        format!("Category: {}", category),
        format!("Total Expenses: {}", fmt_money(&total, &meta.base_currency)),
    ] {
        page.text(MARGIN, y, Font::Regular, 12.0, &line);
        y -= ROW_HEIGHT;
    }
    y -= ROW_HEIGHT;
    table_header(page, y);
    y -= ROW_HEIGHT;

    for e in expenses {
        if y < MARGIN {
            y = PAGE_HEIGHT - MARGIN - ROW_HEIGHT;
            table_header(doc.add_page(), y);
            y -= ROW_HEIGHT;
        }
        let page = doc.current_page();
        let row = ExportRow::from(e);
        let cells = [row.date, row.category, row.description, row.amount, row.currency];
        let mut x = MARGIN;
        for (i, (cell, w)) in cells.iter().zip(COLUMNS).enumerate() {
            let text = clip(cell, w - 6.0, 10.0);
            let tx = if i == 3 {
                x + w - 3.0 - text_width(&text, 10.0)
            } else {
                x + 3.0
            };
            page.text(tx, y, Font::Regular, 10.0, &text);
            x += w;
        }
        y -= ROW_HEIGHT;
    }
    Ok(doc)
}
