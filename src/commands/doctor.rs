// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::payroll::invariant_errors;
use crate::store;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

/// `(issue, detail)` pairs; empty when the data is consistent.
pub fn diagnose(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) More than one active budget for a category and year
    let mut stmt = conn.prepare(
        "SELECT category, year, COUNT(*) FROM budgets WHERE is_active=1
         GROUP BY category, year HAVING COUNT(*) > 1",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let cat: String = r.get(0)?;
        let year: i32 = r.get(1)?;
        let n: i64 = r.get(2)?;
        rows.push(vec![
            "duplicate_active_budget".into(),
            format!("{} / {} ({} rows)", cat, year, n),
        ]);
    }

    // 2) Rows that no longer parse
    let raw: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |r| r.get(0))?;
    let expenses = store::load_expenses(conn)?;
    if raw as usize != expenses.len() {
        rows.push(vec![
            "malformed_expense".into(),
            format!("{} unreadable rows", raw as usize - expenses.len()),
        ]);
    }

    // 3) Negative money
    for e in expenses.iter().filter(|e| e.amount < Decimal::ZERO) {
        rows.push(vec![
            "negative_amount".into(),
            format!("expense #{} {}", e.id, e.amount),
        ]);
    }
    for e in store::load_employees(conn, false)?
        .iter()
        .filter(|e| e.base_salary <= Decimal::ZERO)
    {
        rows.push(vec![
            "non_positive_salary".into(),
            format!("{} {}", e.employee_id, e.base_salary),
        ]);
    }

    // 4) Payroll arithmetic
    for p in store::load_payroll(conn)? {
        for err in invariant_errors(&p) {
            rows.push(vec![
                "payroll_invariant".into(),
                format!("#{} {}-{:02}: {}", p.id, p.year, p.month, err),
            ]);
        }
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = diagnose(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
