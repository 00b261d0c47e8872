// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::error::GojiError;
use crate::insights::{categorize, is_anomaly};
use crate::models::{Expense, ExpenseStatus};
use crate::store;
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_month, parse_non_negative, pretty_table, today,
};
use anyhow::{Context, Result};
use chrono::Datelike;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("approve", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::set_expense_status(conn, id, ExpenseStatus::Approved)?;
            println!("Expense #{} approved", id);
        }
        Some(("reject", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::set_expense_status(conn, id, ExpenseStatus::Rejected)?;
            println!("Expense #{} rejected", id);
        }
        Some(("update", sub)) => update(conn, sub)?,
        Some(("delete", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::delete_expense(conn, id)?;
            info!(expense = id, "expense deleted");
            println!("Expense #{} deleted", id);
        }
        Some(("reassess", sub)) => reassess(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Fills in the computed fields of `draft` against the stored history and
/// persists it. An empty `category` is replaced by the categoriser's guess.
pub fn record(conn: &Connection, mut draft: Expense) -> Result<Expense> {
    let history = store::load_expenses(conn)?;
    let guess = categorize(&draft.title, &draft.description, draft.amount);
    if draft.category.trim().is_empty() {
        draft.category = guess.category.clone();
    }
    draft.is_anomaly = is_anomaly(draft.amount, &draft.category, &history);
    draft.ai_confidence = Some(guess.confidence);
    draft.ai_category_suggestion = Some(guess.category);
    draft.id = store::insert_expense(conn, &draft)?;
    if draft.is_anomaly {
        warn!(
            expense = draft.id,
            category = %draft.category,
            amount = %draft.amount,
            "expense flagged as anomalous"
        );
    }
    Ok(draft)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let title = sub.get_one::<String>("title").unwrap().trim().to_string();
    let amount = parse_non_negative(sub.get_one::<String>("amount").unwrap(), "amount")?;
    let expense_date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let opt = |name: &str| {
        sub.get_one::<String>(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let draft = Expense {
        id: 0,
        title,
        description: opt("description").unwrap_or_default(),
        amount,
        currency: opt("currency")
            .map(|c| c.to_uppercase())
            .unwrap_or(settings.currency),
        category: opt("category").unwrap_or_default(),
        vendor_name: opt("vendor"),
        payment_method: opt("payment-method"),
        expense_date,
        receipt_url: opt("receipt-url"),
        status: ExpenseStatus::Pending,
        is_anomaly: false,
        ai_confidence: None,
        ai_category_suggestion: None,
        ocr_data: None,
    };
    let e = record(conn, draft)?;
    info!(expense = e.id, category = %e.category, "expense added");
    println!(
        "Added expense #{} {} {} [{}]{}",
        e.id,
        e.title,
        fmt_money(&e.amount, &e.currency),
        e.category,
        if e.is_anomaly { " (anomaly)" } else { "" }
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = sub.get_one::<String>("category").map(|s| s.trim());
    let status = sub
        .get_one::<String>("status")
        .map(|s| s.parse::<ExpenseStatus>())
        .transpose()?;
    let month = sub
        .get_one::<String>("month")
        .map(|s| parse_month(s))
        .transpose()?;
    let anomalies_only = sub.get_flag("anomalies");

    let items: Vec<Expense> = store::load_expenses(conn)?
        .into_iter()
        .filter(|e| category.is_none_or(|c| e.category == c))
        .filter(|e| status.is_none_or(|s| e.status == s))
        .filter(|e| {
            month.is_none_or(|(y, m)| e.expense_date.year() == y && e.expense_date.month() == m)
        })
        .filter(|e| !anomalies_only || e.is_anomaly)
        .collect();

    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        return Ok(());
    }
    let rows = items
        .iter()
        .map(|e| {
            vec![
                e.id.to_string(),
                e.expense_date.to_string(),
                e.title.clone(),
                e.category.clone(),
                format!("{:.2}", e.amount),
                e.currency.clone(),
                e.status.to_string(),
                if e.is_anomaly { "yes".into() } else { String::new() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Title", "Category", "Amount", "Ccy", "Status", "Anomaly"],
            rows
        )
    );
    Ok(())
}

/// Applies the given field changes. The stored category, confidence and
/// anomaly flag stay as recorded until `reassess` is run.
fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut e = store::expense_by_id(conn, id)?;
    let field = |name: &str| sub.get_one::<String>(name).map(|s| s.trim().to_string());
    let optional = |name: &str| field(name).map(|s| Some(s).filter(|s| !s.is_empty()));

    if let Some(title) = field("title") {
        if title.is_empty() {
            return Err(GojiError::Validation("title must not be empty".into()).into());
        }
        e.title = title;
    }
    if let Some(amount) = field("amount") {
        e.amount = parse_non_negative(&amount, "amount")?;
    }
    if let Some(date) = field("date") {
        e.expense_date = parse_date(&date)?;
    }
    if let Some(description) = field("description") {
        e.description = description;
    }
    if let Some(currency) = field("currency").filter(|c| !c.is_empty()) {
        e.currency = currency.to_uppercase();
    }
    if let Some(category) = field("category").filter(|c| !c.is_empty()) {
        e.category = category;
    }
    if let Some(vendor) = optional("vendor") {
        e.vendor_name = vendor;
    }
    if let Some(method) = optional("payment-method") {
        e.payment_method = method;
    }
    if let Some(url) = optional("receipt-url") {
        e.receipt_url = url;
    }

    store::update_expense(conn, &e).with_context(|| format!("Update expense #{}", id))?;
    info!(expense = id, "expense updated");
    println!(
        "Updated expense #{} {} {} [{}]",
        e.id,
        e.title,
        fmt_money(&e.amount, &e.currency),
        e.category
    );
    Ok(())
}

fn reassess(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let e = store::expense_by_id(conn, id)?;
    let history: Vec<Expense> = store::load_expenses(conn)?
        .into_iter()
        .filter(|h| h.id != id)
        .collect();
    let guess = categorize(&e.title, &e.description, e.amount);
    let flagged = is_anomaly(e.amount, &e.category, &history);
    store::update_expense_assessment(
        conn,
        id,
        flagged,
        Some(guess.confidence),
        Some(&guess.category),
    )
    .with_context(|| format!("Reassess expense #{}", id))?;
    println!(
        "Expense #{}: suggestion {} ({:.2}), anomaly {}",
        id,
        guess.category,
        guess.confidence,
        if flagged { "yes" } else { "no" }
    );
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ExpenseSummary {
    pub month_total: Decimal,
    pub total_count: usize,
    pub pending_count: usize,
    pub anomaly_count: usize,
    pub by_category: BTreeMap<String, Decimal>,
}

pub fn summarize(expenses: &[Expense], today: chrono::NaiveDate) -> ExpenseSummary {
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in expenses {
        let total = by_category.entry(e.category.clone()).or_default();
        *total = total.saturating_add(e.amount);
    }
    let month_total = expenses
        .iter()
        .filter(|e| {
            e.expense_date.year() == today.year() && e.expense_date.month() == today.month()
        })
        .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.amount));
    ExpenseSummary {
        month_total,
        total_count: expenses.len(),
        pending_count: expenses
            .iter()
            .filter(|e| e.status == ExpenseStatus::Pending)
            .count(),
        anomaly_count: expenses.iter().filter(|e| e.is_anomaly).count(),
        by_category,
    }
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let s = summarize(&store::load_expenses(conn)?, today());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    println!(
        "This month: {}  |  expenses: {}  pending: {}  anomalies: {}",
        fmt_money(&s.month_total, &settings.currency),
        s.total_count,
        s.pending_count,
        s.anomaly_count
    );
    let rows = s
        .by_category
        .iter()
        .map(|(c, v)| vec![c.clone(), format!("{:.2}", v)])
        .collect();
    println!("{}", pretty_table(&["Category", "Total"], rows));
    Ok(())
}
