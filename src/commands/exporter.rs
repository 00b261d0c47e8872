// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => export_expenses(conn, sub),
        Some(("payroll", sub)) => export_payroll(conn, sub),
        _ => Ok(()),
    }
}

fn format_and_out(sub: &clap::ArgMatches) -> Result<(String, String)> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim().to_string();
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }
    Ok((fmt, out))
}

fn write_json<T: Serialize>(out: &str, items: &T) -> Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(items)?)?;
    Ok(())
}

fn export_expenses(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (fmt, out) = format_and_out(sub)?;
    let mut expenses = store::load_expenses(conn)?;
    expenses.sort_by(|a, b| a.expense_date.cmp(&b.expense_date).then(a.id.cmp(&b.id)));

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(&out)?;
        wtr.write_record([
            "date",
            "title",
            "amount",
            "category",
            "description",
            "vendor",
            "currency",
            "payment_method",
            "status",
            "is_anomaly",
            "ai_confidence",
        ])?;
        for e in &expenses {
            wtr.write_record([
                e.expense_date.to_string(),
                e.title.clone(),
                e.amount.to_string(),
                e.category.clone(),
                e.description.clone(),
                e.vendor_name.clone().unwrap_or_default(),
                e.currency.clone(),
                e.payment_method.clone().unwrap_or_default(),
                e.status.to_string(),
                e.is_anomaly.to_string(),
                e.ai_confidence.map(|c| c.to_string()).unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
    } else {
        write_json(&out, &expenses)?;
    }
    println!("Exported {} expenses to {}", expenses.len(), out);
    Ok(())
}

fn export_payroll(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (fmt, out) = format_and_out(sub)?;
    let codes: HashMap<i64, String> = store::load_employees(conn, false)?
        .into_iter()
        .map(|e| (e.id, e.employee_id))
        .collect();
    let records = store::load_payroll(conn)?;
    let code_of = |id: i64| codes.get(&id).cloned().unwrap_or_default();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(&out)?;
        wtr.write_record([
            "employee",
            "year",
            "month",
            "base_salary",
            "overtime_pay",
            "bonus",
            "allowances",
            "gross_salary",
            "total_deductions",
            "leave_deduction",
            "net_salary",
            "status",
            "payment_date",
        ])?;
        for r in &records {
            wtr.write_record([
                code_of(r.employee_id),
                r.year.to_string(),
                r.month.to_string(),
                r.base_salary.to_string(),
                r.overtime_pay.to_string(),
                r.bonus.to_string(),
                r.allowances.to_string(),
                r.gross_salary.to_string(),
                r.total_deductions.to_string(),
                r.leave_deduction.to_string(),
                r.net_salary.to_string(),
                r.status.to_string(),
                r.payment_date.map(|d| d.to_string()).unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = records
            .iter()
            .map(|r| -> Result<serde_json::Value> {
                let mut v = serde_json::to_value(r)?;
                v["employee"] = json!(code_of(r.employee_id));
                Ok(v)
            })
            .collect::<Result<_>>()?;
        write_json(&out, &items)?;
    }
    println!("Exported {} payroll records to {}", records.len(), out);
    Ok(())
}
