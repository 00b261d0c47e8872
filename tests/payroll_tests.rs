// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use goji::error::GojiError;
use goji::models::{EmploymentType, PayrollStatus};
use goji::payroll::invariant_errors;
use goji::{cli, commands, db, store};
use rusqlite::Connection;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["goji"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("employee", sub)) => commands::employees::handle(conn, sub),
        Some(("payroll", sub)) => commands::payroll::handle(conn, sub),
        Some(("config", sub)) => commands::settings::handle(conn, sub),
        _ => panic!("unexpected subcommand"),
    }
}

fn hire(conn: &Connection, code: &str, salary: &str) {
    run(
        conn,
        &[
            "employee",
            "add",
            "--code",
            code,
            "--name",
            "Ada Lovelace",
            "--designation",
            "Engineer",
            "--department",
            "R&D",
            "--salary",
            salary,
            "--joined",
            "2023-04-01",
        ],
    )
    .unwrap();
}

#[test]
fn employee_roster_round_trip() {
    let conn = setup();
    hire(&conn, "emp001", "6000");
    run(
        &conn,
        &[
            "employee",
            "add",
            "--code",
            "EMP002",
            "--name",
            "Grace Hopper",
            "--designation",
            "Consultant",
            "--department",
            "Ops",
            "--salary",
            "4000",
            "--joined",
            "2024-01-15",
            "--type",
            "contract",
            "--currency",
            "eur",
        ],
    )
    .unwrap();

    let e = store::employee_by_code(&conn, "EMP001").unwrap();
    assert_eq!(e.base_salary, dec!(6000));
    assert_eq!(e.employment_type, EmploymentType::FullTime);
    assert_eq!(e.currency, "USD");
    let g = store::employee_by_code(&conn, "EMP002").unwrap();
    assert_eq!(g.employment_type, EmploymentType::Contract);
    assert_eq!(g.currency, "EUR");

    run(&conn, &["employee", "deactivate", "--code", "EMP002"]).unwrap();
    assert_eq!(store::load_employees(&conn, true).unwrap().len(), 1);
    assert_eq!(store::load_employees(&conn, false).unwrap().len(), 2);
}

#[test]
fn zero_salary_is_rejected() {
    let conn = setup();
    let res = run(
        &conn,
        &[
            "employee",
            "add",
            "--code",
            "EMP009",
            "--name",
            "Nobody",
            "--designation",
            "Intern",
            "--department",
            "Ops",
            "--salary",
            "0",
            "--joined",
            "2024-01-01",
        ],
    );
    assert!(res.is_err());
}

#[test]
fn run_stores_reference_payroll() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    run(
        &conn,
        &[
            "payroll",
            "run",
            "--month",
            "2025-03",
            "--employee",
            "EMP001",
            "--overtime-hours",
            "10",
            "--bonus",
            "500",
            "--allowances",
            "200",
            "--unpaid-leaves",
            "2",
        ],
    )
    .unwrap();

    let records = store::load_payroll(&conn).unwrap();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!((r.month, r.year), (3, 2025));
    assert_eq!(r.status, PayrollStatus::Draft);
    assert_eq!(r.overtime_pay, dec!(511.36));
    assert_eq!(r.gross_salary, dec!(7211.36));
    assert_eq!(r.insurance, dec!(150));
    assert_eq!(r.leave_deduction, dec!(545.45));
    assert_eq!(r.net_salary, dec!(4857.30));
    assert!(invariant_errors(r).is_empty());
}

#[test]
fn second_run_for_same_period_is_rejected() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    let args = ["payroll", "run", "--month", "2025-03", "--employee", "EMP001"];
    run(&conn, &args).unwrap();

    let err = run(&conn, &args).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GojiError>(),
        Some(GojiError::DuplicatePayroll { month: 3, year: 2025, .. })
    ));
    assert_eq!(store::load_payroll(&conn).unwrap().len(), 1);

    // a different month is fine
    run(&conn, &["payroll", "run", "--month", "2025-04", "--employee", "EMP001"]).unwrap();
    assert_eq!(store::load_payroll(&conn).unwrap().len(), 2);
}

#[test]
fn batch_run_skips_existing_records() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    hire(&conn, "EMP002", "3000");
    run(&conn, &["payroll", "run", "--month", "2025-03", "--employee", "EMP001"]).unwrap();
    run(&conn, &["payroll", "run", "--month", "2025-03"]).unwrap();

    let records = store::load_payroll(&conn).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(store::pending_payroll_count(&conn).unwrap(), 2);
}

#[test]
fn negative_adjustments_are_rejected() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    let res = run(
        &conn,
        &["payroll", "run", "--month", "2025-03", "--employee", "EMP001", "--bonus=-1"],
    );
    assert!(res.is_err());
    assert!(store::load_payroll(&conn).unwrap().is_empty());
}

#[test]
fn explicit_zero_override_is_kept() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    run(
        &conn,
        &[
            "payroll",
            "run",
            "--month",
            "2025-03",
            "--employee",
            "EMP001",
            "--tax",
            "0",
            "--insurance",
            "0",
            "--provident-fund",
            "0",
        ],
    )
    .unwrap();
    let r = &store::load_payroll(&conn).unwrap()[0];
    assert_eq!(r.total_deductions, dec!(0));
    assert_eq!(r.net_salary, dec!(6000));
}

#[test]
fn status_moves_forward_one_step_at_a_time() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    run(&conn, &["payroll", "run", "--month", "2025-03", "--employee", "EMP001"]).unwrap();

    // draft -> paid skips a step
    let err = run(&conn, &["payroll", "pay", "--employee", "EMP001", "--month", "2025-03"])
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GojiError>(),
        Some(GojiError::InvalidTransition { .. })
    ));

    run(&conn, &["payroll", "process", "--employee", "EMP001", "--month", "2025-03"]).unwrap();
    run(
        &conn,
        &[
            "payroll", "pay", "--employee", "EMP001", "--month", "2025-03", "--date", "2025-04-01",
        ],
    )
    .unwrap();

    let r = &store::load_payroll(&conn).unwrap()[0];
    assert_eq!(r.status, PayrollStatus::Paid);
    assert_eq!(r.payment_date.map(|d| d.to_string()).as_deref(), Some("2025-04-01"));
    assert_eq!(store::pending_payroll_count(&conn).unwrap(), 0);

    // no going back
    assert!(
        run(&conn, &["payroll", "process", "--employee", "EMP001", "--month", "2025-03"])
            .is_err()
    );
}

#[test]
fn preview_does_not_store() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    run(
        &conn,
        &["payroll", "preview", "--month", "2025-03", "--employee", "EMP001", "--json"],
    )
    .unwrap();
    assert!(store::load_payroll(&conn).unwrap().is_empty());
}

#[test]
fn configured_rates_drive_the_calculation() {
    let conn = setup();
    hire(&conn, "EMP001", "5000");
    run(&conn, &["config", "set", "payroll.tax_rate", "0.10"]).unwrap();
    run(&conn, &["config", "set", "payroll.default_insurance", "0"]).unwrap();
    run(&conn, &["config", "set", "payroll.provident_fund_rate", "0"]).unwrap();
    run(&conn, &["payroll", "run", "--month", "2025-03", "--employee", "EMP001"]).unwrap();

    let r = &store::load_payroll(&conn).unwrap()[0];
    assert_eq!(r.tax, dec!(500));
    assert_eq!(r.net_salary, dec!(4500));

    assert!(run(&conn, &["config", "set", "payroll.working_days", "0"]).is_err());
    assert!(run(&conn, &["config", "set", "no.such.key", "1"]).is_err());
}

#[test]
fn unknown_employee_is_not_found() {
    let conn = setup();
    let err = run(&conn, &["payroll", "run", "--month", "2025-03", "--employee", "EMP404"])
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GojiError>(),
        Some(GojiError::NotFound(_))
    ));
}

#[test]
fn salary_above_cap_is_rejected() {
    let conn = setup();
    let res = run(
        &conn,
        &[
            "employee",
            "add",
            "--code",
            "EMP010",
            "--name",
            "Midas",
            "--designation",
            "Owner",
            "--department",
            "Board",
            "--salary",
            "50000000000000000000000000000",
            "--joined",
            "2024-01-01",
        ],
    );
    assert!(res.is_err());
    assert!(store::load_employees(&conn, false).unwrap().is_empty());
}

#[test]
fn oversized_adjustment_is_rejected() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    let res = run(
        &conn,
        &[
            "payroll",
            "run",
            "--month",
            "2025-03",
            "--employee",
            "EMP001",
            "--overtime-hours",
            "50000000000000000000000000000",
        ],
    );
    assert!(res.is_err());
    assert!(store::load_payroll(&conn).unwrap().is_empty());
}

#[test]
fn unpaid_record_can_be_deleted_and_rerun() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    run(&conn, &["payroll", "run", "--month", "2025-03", "--employee", "EMP001"]).unwrap();
    run(&conn, &["payroll", "process", "--employee", "EMP001", "--month", "2025-03"]).unwrap();

    run(&conn, &["payroll", "delete", "--employee", "EMP001", "--month", "2025-03"]).unwrap();
    assert!(store::load_payroll(&conn).unwrap().is_empty());

    run(
        &conn,
        &["payroll", "run", "--month", "2025-03", "--employee", "EMP001", "--bonus", "100"],
    )
    .unwrap();
    let records = store::load_payroll(&conn).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bonus, dec!(100));
    assert_eq!(records[0].status, PayrollStatus::Draft);
}

#[test]
fn paid_record_cannot_be_deleted() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    run(&conn, &["payroll", "run", "--month", "2025-03", "--employee", "EMP001"]).unwrap();
    run(&conn, &["payroll", "process", "--employee", "EMP001", "--month", "2025-03"]).unwrap();
    run(&conn, &["payroll", "pay", "--employee", "EMP001", "--month", "2025-03"]).unwrap();

    let err = run(&conn, &["payroll", "delete", "--employee", "EMP001", "--month", "2025-03"])
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GojiError>(),
        Some(GojiError::Validation(_))
    ));
    assert_eq!(store::load_payroll(&conn).unwrap().len(), 1);
}

#[test]
fn deleting_missing_record_is_not_found() {
    let conn = setup();
    hire(&conn, "EMP001", "6000");
    let err = run(&conn, &["payroll", "delete", "--employee", "EMP001", "--month", "2025-03"])
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GojiError>(),
        Some(GojiError::NotFound(_))
    ));
}
