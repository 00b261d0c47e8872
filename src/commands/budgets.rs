// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::insights::budget::{AlertLevel, budget_status};
use crate::models::Budget;
use crate::store;
use crate::utils::{maybe_print_json, parse_non_negative, pretty_table, today};
use anyhow::{Result, anyhow};
use chrono::Datelike;
use rusqlite::Connection;
use rust_decimal_macros::dec;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        Some(("deactivate", sub)) => {
            let cat = sub.get_one::<String>("category").unwrap().trim();
            let year = *sub.get_one::<i32>("year").unwrap();
            store::deactivate_budget(conn, cat, year)?;
            println!("Budget {} / {} deactivated", cat, year);
        }
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let year = *sub.get_one::<i32>("year").unwrap();
    let monthly_limit = parse_non_negative(sub.get_one::<String>("monthly").unwrap(), "monthly")?;
    let yearly_limit = match sub.get_one::<String>("yearly") {
        Some(s) => parse_non_negative(s, "yearly")?,
        None => monthly_limit * dec!(12),
    };
    let alert_threshold = parse_non_negative(
        sub.get_one::<String>("alert-threshold").unwrap(),
        "alert-threshold",
    )?;
    if alert_threshold > dec!(100) {
        return Err(anyhow!(
            "alert-threshold is a percentage 0-100 (got {})",
            alert_threshold
        ));
    }
    let budget = Budget {
        id: 0,
        category,
        monthly_limit,
        yearly_limit,
        year,
        alert_threshold,
        is_active: true,
    };
    let id = store::upsert_budget(conn, &budget)?;
    info!(budget = id, category = %budget.category, year, "budget saved");
    println!(
        "Budget set for {} / {}: {:.2} monthly, {:.2} yearly",
        budget.category, year, monthly_limit, yearly_limit
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let all = sub.get_flag("all");
    let budgets: Vec<Budget> = store::load_budgets(conn)?
        .into_iter()
        .filter(|b| all || b.is_active)
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &budgets)? {
        return Ok(());
    }
    let rows = budgets
        .iter()
        .map(|b| {
            vec![
                b.year.to_string(),
                b.category.clone(),
                format!("{:.2}", b.monthly_limit),
                format!("{:.2}", b.yearly_limit),
                format!("{}%", b.alert_threshold),
                if b.is_active { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Year", "Category", "Monthly", "Yearly", "Alert at", "Active"],
            rows
        )
    );
    Ok(())
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today();
    let category = sub.get_one::<String>("category").map(|s| s.trim());
    let expenses = store::load_expenses(conn)?;
    let statuses: Vec<_> = store::load_budgets(conn)?
        .iter()
        .filter(|b| b.is_active && b.year == today.year())
        .filter(|b| category.is_none_or(|c| b.category == c))
        .map(|b| budget_status(b, &expenses, today))
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &statuses)? {
        return Ok(());
    }
    let rows = statuses
        .iter()
        .map(|s| {
            vec![
                s.category.clone(),
                format!("{:.2} / {:.2}", s.monthly_spent, s.monthly_limit),
                format!("{:.2}", s.monthly_remaining),
                format!("{:.2} / {:.2}", s.yearly_spent, s.yearly_limit),
                format!("{}%", s.usage_percent),
                match s.alert {
                    AlertLevel::Ok => "ok".into(),
                    AlertLevel::Warning => "warning".into(),
                    AlertLevel::Exceeded => "EXCEEDED".into(),
                },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Category", "Month", "Remaining", "Year", "Used", "Alert"],
            rows
        )
    );
    Ok(())
}
