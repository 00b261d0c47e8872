// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.goji", "Goji", "goji"));

/// `GOJI_DB` wins over the platform data dir.
pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var("GOJI_DB") {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p.trim()));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("goji.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        category TEXT NOT NULL,
        vendor_name TEXT,
        payment_method TEXT,
        expense_date TEXT NOT NULL,
        receipt_url TEXT,
        status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending','approved','rejected')),
        is_anomaly INTEGER NOT NULL DEFAULT 0,
        ai_confidence REAL,
        ai_category_suggestion TEXT,
        ocr_data TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(expense_date);
    CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        category TEXT NOT NULL,
        monthly_limit TEXT NOT NULL,
        yearly_limit TEXT NOT NULL,
        year INTEGER NOT NULL,
        alert_threshold TEXT NOT NULL DEFAULT '80',
        is_active INTEGER NOT NULL DEFAULT 1
    );
    -- one active budget per category and year
    CREATE UNIQUE INDEX IF NOT EXISTS idx_budgets_active
        ON budgets(category, year) WHERE is_active = 1;

    CREATE TABLE IF NOT EXISTS employees(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        designation TEXT NOT NULL,
        department TEXT NOT NULL,
        base_salary TEXT NOT NULL,
        currency TEXT NOT NULL,
        date_of_joining TEXT NOT NULL,
        employment_type TEXT NOT NULL
            CHECK(employment_type IN ('full_time','part_time','contract')),
        is_active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS payroll(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        month INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
        year INTEGER NOT NULL,
        base_salary TEXT NOT NULL,
        overtime_hours TEXT NOT NULL,
        overtime_pay TEXT NOT NULL,
        bonus TEXT NOT NULL,
        allowances TEXT NOT NULL,
        gross_salary TEXT NOT NULL,
        tax TEXT NOT NULL,
        insurance TEXT NOT NULL,
        provident_fund TEXT NOT NULL,
        loan_repayment TEXT NOT NULL,
        other_deductions TEXT NOT NULL,
        total_deductions TEXT NOT NULL,
        paid_leaves INTEGER NOT NULL DEFAULT 0,
        unpaid_leaves INTEGER NOT NULL DEFAULT 0,
        leave_deduction TEXT NOT NULL,
        net_salary TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'draft' CHECK(status IN ('draft','processed','paid')),
        payment_date TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(employee_id, month, year),
        FOREIGN KEY(employee_id) REFERENCES employees(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}
