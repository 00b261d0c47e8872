// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::expenses::record;
use crate::config::Settings;
use crate::models::{Expense, ExpenseStatus};
use crate::utils::{parse_date, parse_non_negative};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use rusqlite::Connection;
use tracing::{info, warn};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => import_expenses(conn, sub),
        _ => Ok(()),
    }
}

/// Columns: `date,title,amount[,category,description,vendor,currency,payment_method]`.
/// An empty category is filled in by the categoriser.
fn parse_row(rec: &StringRecord, default_ccy: &str) -> Result<Expense> {
    let field = |i: usize| {
        rec.get(i)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let date_raw = field(0).context("date missing")?;
    let title = field(1).context("title missing")?;
    let amount_raw = field(2).context("amount missing")?;
    let expense_date = parse_date(&date_raw)
        .with_context(|| format!("Invalid expense date '{}'", date_raw))?;
    let amount = parse_non_negative(&amount_raw, "amount")
        .with_context(|| format!("Invalid amount '{}' for {}", amount_raw, title))?;
    Ok(Expense {
        id: 0,
        title,
        description: field(4).unwrap_or_default(),
        amount,
        currency: field(6)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| default_ccy.to_string()),
        category: field(3).unwrap_or_default(),
        vendor_name: field(5),
        payment_method: field(7),
        expense_date,
        receipt_url: None,
        status: ExpenseStatus::Pending,
        is_anomaly: false,
        ai_confidence: None,
        ai_category_suggestion: None,
        ocr_data: None,
    })
}

fn import_expenses(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;
    let default_ccy = Settings::load(conn)?.currency;

    let tx = conn.transaction()?;
    let mut imported = 0usize;
    let mut skipped = 0usize;
    for (line, result) in rdr.records().enumerate() {
        let parsed = result
            .map_err(anyhow::Error::from)
            .and_then(|rec| parse_row(&rec, &default_ccy));
        match parsed {
            Ok(draft) => {
                record(&tx, draft)?;
                imported += 1;
            }
            Err(e) => {
                skipped += 1;
                warn!(row = line + 2, error = %e, "skipping malformed CSV row");
            }
        }
    }
    tx.commit()?;
    info!(imported, skipped, path, "expense import finished");
    println!(
        "Imported {} expenses from {} ({} skipped)",
        imported, path, skipped
    );
    Ok(())
}
