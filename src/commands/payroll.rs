// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::error::GojiError;
use crate::models::{Employee, PayrollRecord, PayrollStatus};
use crate::payroll::{PayrollAdjustments, compute_payroll, draft_record, salary_slip};
use crate::store;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table, today};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::{info, warn};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("run", sub)) => run(conn, sub)?,
        Some(("preview", sub)) => preview(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("process", sub)) => advance(conn, sub, PayrollStatus::Processed)?,
        Some(("pay", sub)) => advance(conn, sub, PayrollStatus::Paid)?,
        Some(("slip", sub)) => slip(conn, sub)?,
        Some(("delete", sub)) => delete(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn adjustments(sub: &clap::ArgMatches) -> Result<PayrollAdjustments> {
    let dec = |name: &str| -> Result<rust_decimal::Decimal> {
        parse_decimal(sub.get_one::<String>(name).unwrap())
            .with_context(|| format!("--{}", name))
    };
    let opt_dec = |name: &str| -> Result<Option<rust_decimal::Decimal>> {
        sub.get_one::<String>(name)
            .map(|s| parse_decimal(s).with_context(|| format!("--{}", name)))
            .transpose()
    };
    let adj = PayrollAdjustments {
        overtime_hours: dec("overtime-hours")?,
        bonus: dec("bonus")?,
        allowances: dec("allowances")?,
        tax: opt_dec("tax")?,
        insurance: opt_dec("insurance")?,
        provident_fund: opt_dec("provident-fund")?,
        loan_repayment: dec("loan")?,
        other_deductions: dec("other-deductions")?,
        paid_leaves: *sub.get_one::<u32>("paid-leaves").unwrap(),
        unpaid_leaves: *sub.get_one::<u32>("unpaid-leaves").unwrap(),
    };
    adj.validate()?;
    Ok(adj)
}

/// Computes a draft for one employee and stores it.
pub fn run_for_employee(
    conn: &Connection,
    settings: &Settings,
    employee: &Employee,
    month: u32,
    year: i32,
    adj: &PayrollAdjustments,
) -> Result<PayrollRecord> {
    let breakdown = compute_payroll(employee.base_salary, adj, &settings.payroll);
    let mut record = draft_record(employee, month, year, adj, &breakdown)?;
    record.id = store::insert_payroll(conn, &record, &employee.employee_id)?;
    info!(
        payroll = record.id,
        employee = %employee.employee_id,
        net = %record.net_salary,
        "payroll drafted"
    );
    Ok(record)
}

fn run(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let adj = adjustments(sub)?;

    if let Some(code) = sub.get_one::<String>("employee") {
        let employee = store::employee_by_code(conn, code.trim())?;
        if !employee.is_active {
            return Err(GojiError::Validation(format!(
                "employee {} is inactive",
                employee.employee_id
            ))
            .into());
        }
        let r = run_for_employee(conn, &settings, &employee, month, year, &adj)?;
        println!(
            "Drafted payroll for {} {:02}/{}: net {:.2}",
            employee.employee_id, month, year, r.net_salary
        );
        return Ok(());
    }

    let mut drafted = 0usize;
    let mut skipped = 0usize;
    for employee in store::load_employees(conn, true)? {
        match run_for_employee(conn, &settings, &employee, month, year, &adj) {
            Ok(_) => drafted += 1,
            Err(e) => {
                skipped += 1;
                warn!(employee = %employee.employee_id, error = %e, "payroll skipped");
            }
        }
    }
    println!(
        "Payroll {:02}/{}: {} drafted, {} skipped",
        month, year, drafted, skipped
    );
    Ok(())
}

fn preview(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let code = sub.get_one::<String>("employee").unwrap().trim();
    let employee = store::employee_by_code(conn, code)?;
    let adj = adjustments(sub)?;
    let breakdown = compute_payroll(employee.base_salary, &adj, &settings.payroll);
    let record = draft_record(&employee, month, year, &adj, &breakdown)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &record)? {
        return Ok(());
    }
    println!(
        "{}",
        salary_slip(&settings.company_name, &employee, &record)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let period = sub
        .get_one::<String>("month")
        .map(|s| parse_month(s))
        .transpose()?;
    let status = sub
        .get_one::<String>("status")
        .map(|s| s.parse::<PayrollStatus>())
        .transpose()?;
    let codes: HashMap<i64, String> = store::load_employees(conn, false)?
        .into_iter()
        .map(|e| (e.id, e.employee_id))
        .collect();
    let records: Vec<PayrollRecord> = store::load_payroll(conn)?
        .into_iter()
        .filter(|r| period.is_none_or(|(y, m)| r.year == y && r.month == m))
        .filter(|r| status.is_none_or(|s| r.status == s))
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &records)? {
        return Ok(());
    }
    let rows = records
        .iter()
        .map(|r| {
            vec![
                codes
                    .get(&r.employee_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", r.employee_id)),
                format!("{}-{:02}", r.year, r.month),
                format!("{:.2}", r.gross_salary),
                format!("{:.2}", r.total_deductions),
                format!("{:.2}", r.leave_deduction),
                format!("{:.2}", r.net_salary),
                r.status.to_string(),
                r.payment_date.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Employee", "Period", "Gross", "Deductions", "Leave", "Net", "Status", "Paid on"],
            rows
        )
    );
    Ok(())
}

fn find_record(conn: &Connection, sub: &clap::ArgMatches) -> Result<(Employee, PayrollRecord)> {
    let code = sub.get_one::<String>("employee").unwrap().trim();
    let employee = store::employee_by_code(conn, code)?;
    let (year, month) = parse_month(sub.get_one::<String>("month").unwrap())?;
    let record = store::payroll_for_period(conn, employee.id, month, year)?.ok_or_else(|| {
        GojiError::NotFound(format!(
            "payroll for {} {:02}/{}",
            employee.employee_id, month, year
        ))
    })?;
    Ok((employee, record))
}

fn advance(conn: &Connection, sub: &clap::ArgMatches, to: PayrollStatus) -> Result<()> {
    let (employee, record) = find_record(conn, sub)?;
    let on = match sub.try_get_one::<String>("date").ok().flatten() {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let status = store::set_payroll_status(conn, &record, to, on)?;
    println!(
        "Payroll for {} {:02}/{} is now {}",
        employee.employee_id, record.month, record.year, status
    );
    Ok(())
}

fn slip(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let (employee, record) = find_record(conn, sub)?;
    println!("{}", salary_slip(&settings.company_name, &employee, &record));
    Ok(())
}

fn delete(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (employee, record) = find_record(conn, sub)?;
    store::delete_payroll(conn, &record)?;
    info!(
        employee = %employee.employee_id,
        month = record.month,
        year = record.year,
        "payroll deleted"
    );
    println!(
        "Deleted payroll for {} {:02}/{}",
        employee.employee_id, record.month, record.year
    );
    Ok(())
}
