// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use goji::models::{Employee, EmploymentType, Expense, ExpenseStatus};
use goji::payroll::{PayrollAdjustments, PayrollRules, compute_payroll, draft_record};
use goji::{cli, commands::exporter, db, store};
use rusqlite::Connection;
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn export(conn: &Connection, what: &str, format: &str, out: &str) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "goji", "export", what, "--format", format, "--out", out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

fn seed_expense(conn: &Connection) {
    store::insert_expense(
        conn,
        &Expense {
            id: 0,
            title: "Corner Shop".into(),
            description: "Weekly run".into(),
            amount: dec!(12.34),
            currency: "USD".into(),
            category: "office_supplies".into(),
            vendor_name: Some("Corner Shop Ltd".into()),
            payment_method: None,
            expense_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            receipt_url: None,
            status: ExpenseStatus::Approved,
            is_anomaly: false,
            ai_confidence: Some(0.8),
            ai_category_suggestion: Some("office_supplies".into()),
            ocr_data: None,
        },
    )
    .unwrap();
}

#[test]
fn export_expenses_as_pretty_json() {
    let conn = base_conn();
    seed_expense(&conn);

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    export(&conn, "expenses", "json", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Corner Shop");
    assert_eq!(items[0]["amount"], "12.34");
    assert_eq!(items[0]["expense_date"], "2025-01-02");
    assert_eq!(items[0]["status"], "approved");
    assert_eq!(items[0]["is_anomaly"], false);
}

#[test]
fn export_expenses_as_csv() {
    let conn = base_conn();
    seed_expense(&conn);

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    export(&conn, "expenses", "CSV", &out_path.to_string_lossy()).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "date");
    assert_eq!(&headers[2], "amount");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "2025-01-02");
    assert_eq!(&rows[0][1], "Corner Shop");
    assert_eq!(&rows[0][2], "12.34");
    assert_eq!(&rows[0][5], "Corner Shop Ltd");
}

#[test]
fn export_payroll_carries_employee_code() {
    let conn = base_conn();
    let mut employee = Employee {
        id: 0,
        employee_id: "EMP001".into(),
        name: "Ada".into(),
        designation: "Engineer".into(),
        department: "R&D".into(),
        base_salary: dec!(6000),
        currency: "USD".into(),
        date_of_joining: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
        employment_type: EmploymentType::FullTime,
        is_active: true,
    };
    employee.id = store::insert_employee(&conn, &employee).unwrap();
    let adj = PayrollAdjustments::default();
    let b = compute_payroll(employee.base_salary, &adj, &PayrollRules::default());
    let record = draft_record(&employee, 3, 2025, &adj, &b).unwrap();
    store::insert_payroll(&conn, &record, &employee.employee_id).unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("payroll.json");
    export(&conn, "payroll", "json", &out_path.to_string_lossy()).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(parsed[0]["employee"], "EMP001");
    assert_eq!(parsed[0]["month"], 3);
    assert_eq!(parsed[0]["status"], "draft");
}

#[test]
fn export_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");

    assert!(export(&conn, "expenses", "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}
