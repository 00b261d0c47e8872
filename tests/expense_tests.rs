// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use goji::error::GojiError;
use goji::models::{Expense, ExpenseStatus};
use goji::{cli, commands::expenses, db, store};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn expense_cmd(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["goji", "expense"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("expense", sub)) = matches.subcommand() {
        expenses::handle(conn, sub)
    } else {
        panic!("no expense subcommand");
    }
}

fn add(conn: &Connection, title: &str, amount: &str, date: &str, category: Option<&str>) {
    let mut args = vec!["add", "--title", title, "--amount", amount, "--date", date];
    if let Some(c) = category {
        args.extend_from_slice(&["--category", c]);
    }
    expense_cmd(conn, &args).unwrap();
}

#[test]
fn add_without_category_uses_categoriser() {
    let conn = setup();
    add(&conn, "Facebook ads campaign", "250", "2025-03-04", None);

    let stored = store::load_expenses(&conn).unwrap();
    assert_eq!(stored.len(), 1);
    let e = &stored[0];
    assert_eq!(e.category, "marketing");
    assert_eq!(e.ai_category_suggestion.as_deref(), Some("marketing"));
    assert_eq!(e.ai_confidence, Some(0.98));
    assert_eq!(e.status, ExpenseStatus::Pending);
    assert_eq!(e.amount, dec!(250));
    assert_eq!(e.currency, "USD");
    assert!(!e.is_anomaly);
}

#[test]
fn explicit_category_wins_over_guess() {
    let conn = setup();
    add(&conn, "Uber to client", "40", "2025-03-04", Some("sales"));
    let e = &store::load_expenses(&conn).unwrap()[0];
    assert_eq!(e.category, "sales");
    assert_eq!(e.ai_category_suggestion.as_deref(), Some("travel"));
}

#[test]
fn anomaly_flag_is_frozen_at_creation() {
    let conn = setup();
    for day in 1..=4 {
        add(&conn, "Office rent", "100", &format!("2025-01-0{}", day), Some("rent"));
    }
    add(&conn, "Office rent", "5000", "2025-01-05", Some("rent"));

    let flagged: Vec<_> = store::load_expenses(&conn)
        .unwrap()
        .into_iter()
        .filter(|e| e.is_anomaly)
        .collect();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].amount, dec!(5000));
    let big_id = flagged[0].id;

    // Later history would no longer make 5000 unusual, but the stored flag stays.
    for day in 6..=9 {
        add(&conn, "Office rent", "5000", &format!("2025-01-0{}", day), Some("rent"));
    }
    let big = store::expense_by_id(&conn, big_id).unwrap();
    assert!(big.is_anomaly);

    expense_cmd(&conn, &["reassess", "--id", &big_id.to_string()]).unwrap();
    let big = store::expense_by_id(&conn, big_id).unwrap();
    assert!(!big.is_anomaly);
}

#[test]
fn first_expense_in_category_is_never_anomalous() {
    let conn = setup();
    add(&conn, "Annual licence", "99999", "2025-02-01", Some("software"));
    assert!(!store::load_expenses(&conn).unwrap()[0].is_anomaly);
}

#[test]
fn approve_and_reject_update_status() {
    let conn = setup();
    add(&conn, "Printer toner", "60", "2025-02-01", None);
    add(&conn, "Team dinner", "300", "2025-02-02", None);
    let all = store::load_expenses(&conn).unwrap();
    let toner = all.iter().find(|e| e.title == "Printer toner").unwrap().id;
    let dinner = all.iter().find(|e| e.title == "Team dinner").unwrap().id;

    expense_cmd(&conn, &["approve", "--id", &toner.to_string()]).unwrap();
    expense_cmd(&conn, &["reject", "--id", &dinner.to_string()]).unwrap();

    assert_eq!(
        store::expense_by_id(&conn, toner).unwrap().status,
        ExpenseStatus::Approved
    );
    assert_eq!(
        store::expense_by_id(&conn, dinner).unwrap().status,
        ExpenseStatus::Rejected
    );
    assert!(expense_cmd(&conn, &["approve", "--id", "999"]).is_err());
}

#[test]
fn negative_amount_is_rejected() {
    let conn = setup();
    let res = expense_cmd(
        &conn,
        &["add", "--title", "Refund", "--amount=-5", "--date", "2025-02-01"],
    );
    assert!(res.is_err());
    assert!(store::load_expenses(&conn).unwrap().is_empty());
}

#[test]
fn summary_counts_current_month_and_flags() {
    let conn = setup();
    add(&conn, "Slack subscription", "20", "2025-05-03", None);
    add(&conn, "Slack subscription", "20", "2025-05-10", None);
    add(&conn, "Hotel in Berlin", "400", "2025-04-20", None);
    let all = store::load_expenses(&conn).unwrap();
    let hotel = all.iter().find(|e| e.category == "travel").unwrap().id;
    store::set_expense_status(&conn, hotel, ExpenseStatus::Approved).unwrap();

    let s = expenses::summarize(
        &store::load_expenses(&conn).unwrap(),
        NaiveDate::from_ymd_opt(2025, 5, 15).unwrap(),
    );
    assert_eq!(s.month_total, dec!(40));
    assert_eq!(s.total_count, 3);
    assert_eq!(s.pending_count, 2);
    assert_eq!(s.anomaly_count, 0);
    assert_eq!(s.by_category.get("software"), Some(&dec!(40)));
    assert_eq!(s.by_category.get("travel"), Some(&dec!(400)));
}

#[test]
fn amount_above_cap_is_rejected() {
    let conn = setup();
    let res = expense_cmd(
        &conn,
        &[
            "add",
            "--title",
            "Rounding error",
            "--amount",
            "50000000000000000000000000000",
            "--date",
            "2026-10-01",
        ],
    );
    assert!(res.is_err());
    assert!(store::load_expenses(&conn).unwrap().is_empty());
}

#[test]
fn summary_of_huge_amounts_saturates() {
    let big = dec!(50000000000000000000000000000);
    let huge = |day: u32| Expense {
        id: 0,
        title: "Licence".into(),
        description: String::new(),
        amount: big,
        currency: "USD".into(),
        category: "software".into(),
        vendor_name: None,
        payment_method: None,
        expense_date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
        receipt_url: None,
        status: ExpenseStatus::Pending,
        is_anomaly: false,
        ai_confidence: None,
        ai_category_suggestion: None,
        ocr_data: None,
    };
    let s = expenses::summarize(
        &[huge(1), huge(2)],
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
    );
    assert_eq!(s.month_total, Decimal::MAX);
    assert_eq!(s.by_category.get("software"), Some(&Decimal::MAX));
}

#[test]
fn update_changes_only_given_fields() {
    let conn = setup();
    add(&conn, "Hotel in Berlin", "400", "2025-04-20", None);
    let before = store::load_expenses(&conn).unwrap()[0].clone();
    let id = before.id.to_string();

    expense_cmd(
        &conn,
        &["update", "--id", &id, "--amount", "380.50", "--vendor", "Hotel Adlon"],
    )
    .unwrap();
    let after = store::expense_by_id(&conn, before.id).unwrap();
    assert_eq!(after.amount, dec!(380.50));
    assert_eq!(after.vendor_name.as_deref(), Some("Hotel Adlon"));
    assert_eq!(after.title, before.title);
    assert_eq!(after.category, "travel");
    assert_eq!(after.expense_date, before.expense_date);
    assert_eq!(after.ai_category_suggestion, before.ai_category_suggestion);

    expense_cmd(&conn, &["update", "--id", &id, "--vendor", ""]).unwrap();
    assert_eq!(store::expense_by_id(&conn, before.id).unwrap().vendor_name, None);

    assert!(expense_cmd(&conn, &["update", "--id", &id, "--amount=-1"]).is_err());
    assert!(expense_cmd(&conn, &["update", "--id", &id, "--title", "  "]).is_err());
    assert_eq!(store::expense_by_id(&conn, before.id).unwrap().amount, dec!(380.50));
}

#[test]
fn update_and_delete_of_missing_expense_are_not_found() {
    let conn = setup();
    for args in [
        vec!["update", "--id", "42", "--title", "Ghost"],
        vec!["delete", "--id", "42"],
    ] {
        let err = expense_cmd(&conn, &args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GojiError>(),
            Some(GojiError::NotFound(_))
        ));
    }
}

#[test]
fn delete_removes_expense() {
    let conn = setup();
    add(&conn, "Slack subscription", "20", "2025-05-03", None);
    add(&conn, "Slack subscription", "25", "2025-05-10", None);
    let first = store::load_expenses(&conn).unwrap()[1].id;

    expense_cmd(&conn, &["delete", "--id", &first.to_string()]).unwrap();
    let left = store::load_expenses(&conn).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].amount, dec!(25));
}
