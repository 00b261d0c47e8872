// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::GojiError;
use crate::models::{
    Budget, Employee, EmploymentType, Expense, ExpenseStatus, PayrollRecord, PayrollStatus,
};
use crate::utils::{MAX_AMOUNT, parse_date, parse_decimal};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::{debug, warn};

const EXPENSE_COLS: &str = "id, title, description, amount, currency, category, vendor_name, \
    payment_method, expense_date, receipt_url, status, is_anomaly, ai_confidence, \
    ai_category_suggestion, ocr_data";

fn dec_col(r: &Row, idx: usize, what: &str) -> Result<Decimal> {
    let s: String = r.get(idx)?;
    parse_decimal(&s).with_context(|| format!("column {}", what))
}

fn expense_from_row(r: &Row) -> Result<Expense> {
    let status: String = r.get(10)?;
    let date: String = r.get(8)?;
    Ok(Expense {
        id: r.get(0)?,
        title: r.get(1)?,
        description: r.get(2)?,
        amount: dec_col(r, 3, "amount")?,
        currency: r.get(4)?,
        category: r.get(5)?,
        vendor_name: r.get(6)?,
        payment_method: r.get(7)?,
        expense_date: parse_date(&date)?,
        receipt_url: r.get(9)?,
        status: status.parse()?,
        is_anomaly: r.get(11)?,
        ai_confidence: r.get(12)?,
        ai_category_suggestion: r.get(13)?,
        ocr_data: r.get(14)?,
    })
}

/// All expenses, newest first. Rows that fail to parse are logged and skipped.
pub fn load_expenses(conn: &Connection) -> Result<Vec<Expense>> {
    let sql = format!(
        "SELECT {} FROM expenses ORDER BY expense_date DESC, id DESC",
        EXPENSE_COLS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        match expense_from_row(r) {
            Ok(e) => out.push(e),
            Err(err) => {
                let id: i64 = r.get(0).unwrap_or_default();
                warn!(expense = id, error = %err, "skipping malformed expense row");
            }
        }
    }
    Ok(out)
}

pub fn expense_by_id(conn: &Connection, id: i64) -> Result<Expense> {
    let sql = format!("SELECT {} FROM expenses WHERE id=?1", EXPENSE_COLS);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => expense_from_row(r),
        None => Err(GojiError::NotFound(format!("expense {}", id)).into()),
    }
}

fn check_amount(what: &str, d: Decimal) -> Result<()> {
    if d.is_sign_negative() && !d.is_zero() {
        return Err(GojiError::Validation(format!("{} must not be negative", what)).into());
    }
    if d > MAX_AMOUNT {
        return Err(
            GojiError::Validation(format!("{} must not exceed {}", what, MAX_AMOUNT)).into(),
        );
    }
    Ok(())
}

pub fn insert_expense(conn: &Connection, e: &Expense) -> Result<i64> {
    check_amount("amount", e.amount)?;
    conn.execute(
        "INSERT INTO expenses(title, description, amount, currency, category, vendor_name,
            payment_method, expense_date, receipt_url, status, is_anomaly, ai_confidence,
            ai_category_suggestion, ocr_data)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)",
        params![
            e.title,
            e.description,
            e.amount.to_string(),
            e.currency,
            e.category,
            e.vendor_name,
            e.payment_method,
            e.expense_date.to_string(),
            e.receipt_url,
            e.status.as_str(),
            e.is_anomaly,
            e.ai_confidence,
            e.ai_category_suggestion,
            e.ocr_data,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(expense = id, category = %e.category, anomaly = e.is_anomaly, "expense stored");
    Ok(id)
}

pub fn set_expense_status(conn: &Connection, id: i64, status: ExpenseStatus) -> Result<()> {
    let n = conn.execute(
        "UPDATE expenses SET status=?1 WHERE id=?2",
        params![status.as_str(), id],
    )?;
    if n == 0 {
        return Err(GojiError::NotFound(format!("expense {}", id)).into());
    }
    Ok(())
}

/// Rewrites the user-editable fields of an existing expense. Status and the
/// stored assessment are left alone.
pub fn update_expense(conn: &Connection, e: &Expense) -> Result<()> {
    check_amount("amount", e.amount)?;
    let n = conn.execute(
        "UPDATE expenses SET title=?1, description=?2, amount=?3, currency=?4, category=?5,
            vendor_name=?6, payment_method=?7, expense_date=?8, receipt_url=?9
         WHERE id=?10",
        params![
            e.title,
            e.description,
            e.amount.to_string(),
            e.currency,
            e.category,
            e.vendor_name,
            e.payment_method,
            e.expense_date.to_string(),
            e.receipt_url,
            e.id,
        ],
    )?;
    if n == 0 {
        return Err(GojiError::NotFound(format!("expense {}", e.id)).into());
    }
    Ok(())
}

pub fn delete_expense(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM expenses WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(GojiError::NotFound(format!("expense {}", id)).into());
    }
    debug!(expense = id, "expense deleted");
    Ok(())
}

/// Overwrites the stored categorisation and anomaly flag of an expense.
pub fn update_expense_assessment(
    conn: &Connection,
    id: i64,
    is_anomaly: bool,
    ai_confidence: Option<f64>,
    ai_category_suggestion: Option<&str>,
) -> Result<()> {
    conn.execute(
        "UPDATE expenses SET is_anomaly=?1, ai_confidence=?2, ai_category_suggestion=?3
         WHERE id=?4",
        params![is_anomaly, ai_confidence, ai_category_suggestion, id],
    )?;
    Ok(())
}

fn budget_from_row(r: &Row) -> Result<Budget> {
    Ok(Budget {
        id: r.get(0)?,
        category: r.get(1)?,
        monthly_limit: dec_col(r, 2, "monthly_limit")?,
        yearly_limit: dec_col(r, 3, "yearly_limit")?,
        year: r.get(4)?,
        alert_threshold: dec_col(r, 5, "alert_threshold")?,
        is_active: r.get(6)?,
    })
}

pub fn load_budgets(conn: &Connection) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, monthly_limit, yearly_limit, year, alert_threshold, is_active
         FROM budgets ORDER BY year DESC, category",
    )?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        match budget_from_row(r) {
            Ok(b) => out.push(b),
            Err(err) => warn!(error = %err, "skipping malformed budget row"),
        }
    }
    Ok(out)
}

/// Inserts or updates the active budget for `(category, year)`.
pub fn upsert_budget(conn: &Connection, b: &Budget) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM budgets WHERE category=?1 AND year=?2 AND is_active=1",
            params![b.category, b.year],
            |r| r.get(0),
        )
        .optional()?;
    match existing {
        Some(id) => {
            conn.execute(
                "UPDATE budgets SET monthly_limit=?1, yearly_limit=?2, alert_threshold=?3
                 WHERE id=?4",
                params![
                    b.monthly_limit.to_string(),
                    b.yearly_limit.to_string(),
                    b.alert_threshold.to_string(),
                    id
                ],
            )?;
            Ok(id)
        }
        None => {
            conn.execute(
                "INSERT INTO budgets(category, monthly_limit, yearly_limit, year, alert_threshold,
                    is_active)
                 VALUES (?1,?2,?3,?4,?5,1)",
                params![
                    b.category,
                    b.monthly_limit.to_string(),
                    b.yearly_limit.to_string(),
                    b.year,
                    b.alert_threshold.to_string()
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }
}

pub fn deactivate_budget(conn: &Connection, category: &str, year: i32) -> Result<()> {
    let n = conn.execute(
        "UPDATE budgets SET is_active=0 WHERE category=?1 AND year=?2 AND is_active=1",
        params![category, year],
    )?;
    if n == 0 {
        return Err(GojiError::NotFound(format!("active budget {} / {}", category, year)).into());
    }
    Ok(())
}

fn employee_from_row(r: &Row) -> Result<Employee> {
    let doj: String = r.get(7)?;
    let etype: String = r.get(8)?;
    Ok(Employee {
        id: r.get(0)?,
        employee_id: r.get(1)?,
        name: r.get(2)?,
        designation: r.get(3)?,
        department: r.get(4)?,
        base_salary: dec_col(r, 5, "base_salary")?,
        currency: r.get(6)?,
        date_of_joining: parse_date(&doj)?,
        employment_type: etype.parse::<EmploymentType>()?,
        is_active: r.get(9)?,
    })
}

const EMPLOYEE_COLS: &str = "id, employee_id, name, designation, department, base_salary, \
    currency, date_of_joining, employment_type, is_active";

pub fn load_employees(conn: &Connection, active_only: bool) -> Result<Vec<Employee>> {
    let sql = if active_only {
        format!(
            "SELECT {} FROM employees WHERE is_active=1 ORDER BY employee_id",
            EMPLOYEE_COLS
        )
    } else {
        format!("SELECT {} FROM employees ORDER BY employee_id", EMPLOYEE_COLS)
    };
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        match employee_from_row(r) {
            Ok(e) => out.push(e),
            Err(err) => warn!(error = %err, "skipping malformed employee row"),
        }
    }
    Ok(out)
}

pub fn employee_by_code(conn: &Connection, code: &str) -> Result<Employee> {
    let sql = format!("SELECT {} FROM employees WHERE employee_id=?1", EMPLOYEE_COLS);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![code])?;
    match rows.next()? {
        Some(r) => employee_from_row(r),
        None => Err(GojiError::NotFound(format!("employee '{}'", code)).into()),
    }
}

pub fn insert_employee(conn: &Connection, e: &Employee) -> Result<i64> {
    if e.base_salary <= Decimal::ZERO {
        return Err(GojiError::Validation("base_salary must be greater than zero".into()).into());
    }
    check_amount("base_salary", e.base_salary)?;
    conn.execute(
        "INSERT INTO employees(employee_id, name, designation, department, base_salary, currency,
            date_of_joining, employment_type, is_active)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        params![
            e.employee_id,
            e.name,
            e.designation,
            e.department,
            e.base_salary.to_string(),
            e.currency,
            e.date_of_joining.to_string(),
            e.employment_type.as_str(),
            e.is_active,
        ],
    )
    .with_context(|| format!("Insert employee '{}'", e.employee_id))?;
    Ok(conn.last_insert_rowid())
}

pub fn deactivate_employee(conn: &Connection, code: &str) -> Result<()> {
    let n = conn.execute(
        "UPDATE employees SET is_active=0 WHERE employee_id=?1",
        params![code],
    )?;
    if n == 0 {
        return Err(GojiError::NotFound(format!("employee '{}'", code)).into());
    }
    Ok(())
}

const PAYROLL_COLS: &str = "id, employee_id, month, year, base_salary, overtime_hours, \
    overtime_pay, bonus, allowances, gross_salary, tax, insurance, provident_fund, \
    loan_repayment, other_deductions, total_deductions, paid_leaves, unpaid_leaves, \
    leave_deduction, net_salary, status, payment_date";

fn payroll_from_row(r: &Row) -> Result<PayrollRecord> {
    let status: String = r.get(20)?;
    let payment_date: Option<String> = r.get(21)?;
    Ok(PayrollRecord {
        id: r.get(0)?,
        employee_id: r.get(1)?,
        month: r.get(2)?,
        year: r.get(3)?,
        base_salary: dec_col(r, 4, "base_salary")?,
        overtime_hours: dec_col(r, 5, "overtime_hours")?,
        overtime_pay: dec_col(r, 6, "overtime_pay")?,
        bonus: dec_col(r, 7, "bonus")?,
        allowances: dec_col(r, 8, "allowances")?,
        gross_salary: dec_col(r, 9, "gross_salary")?,
        tax: dec_col(r, 10, "tax")?,
        insurance: dec_col(r, 11, "insurance")?,
        provident_fund: dec_col(r, 12, "provident_fund")?,
        loan_repayment: dec_col(r, 13, "loan_repayment")?,
        other_deductions: dec_col(r, 14, "other_deductions")?,
        total_deductions: dec_col(r, 15, "total_deductions")?,
        paid_leaves: r.get(16)?,
        unpaid_leaves: r.get(17)?,
        leave_deduction: dec_col(r, 18, "leave_deduction")?,
        net_salary: dec_col(r, 19, "net_salary")?,
        status: status.parse::<PayrollStatus>()?,
        payment_date: payment_date.as_deref().map(parse_date).transpose()?,
    })
}

pub fn load_payroll(conn: &Connection) -> Result<Vec<PayrollRecord>> {
    let sql = format!(
        "SELECT {} FROM payroll ORDER BY year DESC, month DESC, employee_id",
        PAYROLL_COLS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        match payroll_from_row(r) {
            Ok(p) => out.push(p),
            Err(err) => warn!(error = %err, "skipping malformed payroll row"),
        }
    }
    Ok(out)
}

pub fn payroll_for_period(
    conn: &Connection,
    employee_id: i64,
    month: u32,
    year: i32,
) -> Result<Option<PayrollRecord>> {
    let sql = format!(
        "SELECT {} FROM payroll WHERE employee_id=?1 AND month=?2 AND year=?3",
        PAYROLL_COLS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![employee_id, month, year])?;
    match rows.next()? {
        Some(r) => Ok(Some(payroll_from_row(r)?)),
        None => Ok(None),
    }
}

/// Stores a payroll record; a second record for the same employee and period
/// is rejected.
pub fn insert_payroll(conn: &Connection, p: &PayrollRecord, employee_code: &str) -> Result<i64> {
    if payroll_for_period(conn, p.employee_id, p.month, p.year)?.is_some() {
        return Err(GojiError::DuplicatePayroll {
            employee: employee_code.to_string(),
            month: p.month,
            year: p.year,
        }
        .into());
    }
    conn.execute(
        "INSERT INTO payroll(employee_id, month, year, base_salary, overtime_hours, overtime_pay,
            bonus, allowances, gross_salary, tax, insurance, provident_fund, loan_repayment,
            other_deductions, total_deductions, paid_leaves, unpaid_leaves, leave_deduction,
            net_salary, status, payment_date)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21)",
        params![
            p.employee_id,
            p.month,
            p.year,
            p.base_salary.to_string(),
            p.overtime_hours.to_string(),
            p.overtime_pay.to_string(),
            p.bonus.to_string(),
            p.allowances.to_string(),
            p.gross_salary.to_string(),
            p.tax.to_string(),
            p.insurance.to_string(),
            p.provident_fund.to_string(),
            p.loan_repayment.to_string(),
            p.other_deductions.to_string(),
            p.total_deductions.to_string(),
            p.paid_leaves,
            p.unpaid_leaves,
            p.leave_deduction.to_string(),
            p.net_salary.to_string(),
            p.status.as_str(),
            p.payment_date.map(|d| d.to_string()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Moves a record one step forward. Paying stamps `payment_date`.
pub fn set_payroll_status(
    conn: &Connection,
    record: &PayrollRecord,
    to: PayrollStatus,
    on: chrono::NaiveDate,
) -> Result<PayrollStatus> {
    let next = record.status.transition(to)?;
    let payment_date = (next == PayrollStatus::Paid).then(|| on.to_string());
    conn.execute(
        "UPDATE payroll SET status=?1, payment_date=COALESCE(?2, payment_date) WHERE id=?3",
        params![next.as_str(), payment_date, record.id],
    )?;
    debug!(payroll = record.id, from = %record.status, to = %next, "payroll status advanced");
    Ok(next)
}

/// Removes a payroll record so the period can be drafted again. Paid records
/// are kept.
pub fn delete_payroll(conn: &Connection, record: &PayrollRecord) -> Result<()> {
    if record.status == PayrollStatus::Paid {
        return Err(GojiError::Validation(format!(
            "payroll {:02}/{} is paid and cannot be deleted",
            record.month, record.year
        ))
        .into());
    }
    let n = conn.execute("DELETE FROM payroll WHERE id=?1", params![record.id])?;
    if n == 0 {
        return Err(GojiError::NotFound(format!("payroll {}", record.id)).into());
    }
    debug!(payroll = record.id, "payroll deleted");
    Ok(())
}

/// Payroll records not yet paid.
pub fn pending_payroll_count(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM payroll WHERE status != 'paid'",
        [],
        |r| r.get(0),
    )?;
    Ok(n as usize)
}
