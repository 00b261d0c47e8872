// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{GojiError, GojiResult};
use crate::models::{Employee, PayrollRecord, PayrollStatus};
use crate::utils::MAX_AMOUNT;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Company-wide constants used to derive hourly and daily rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRules {
    pub standard_hours: Decimal,
    pub working_days: Decimal,
    pub overtime_multiplier: Decimal,
    pub tax_rate: Decimal,
    pub provident_fund_rate: Decimal,
    pub default_insurance: Decimal,
}

impl Default for PayrollRules {
    fn default() -> Self {
        Self {
            standard_hours: dec!(176),
            working_days: dec!(22),
            overtime_multiplier: dec!(1.5),
            tax_rate: dec!(0.15),
            provident_fund_rate: dec!(0.08),
            default_insurance: dec!(150),
        }
    }
}

/// Per-period inputs. `None` overrides fall back to the rule defaults; an
/// explicit zero is kept as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollAdjustments {
    pub overtime_hours: Decimal,
    pub bonus: Decimal,
    pub allowances: Decimal,
    pub tax: Option<Decimal>,
    pub insurance: Option<Decimal>,
    pub provident_fund: Option<Decimal>,
    pub loan_repayment: Decimal,
    pub other_deductions: Decimal,
    pub paid_leaves: u32,
    pub unpaid_leaves: u32,
}

impl PayrollAdjustments {
    pub fn validate(&self) -> GojiResult<()> {
        let fields = [
            ("overtime_hours", Some(self.overtime_hours)),
            ("bonus", Some(self.bonus)),
            ("allowances", Some(self.allowances)),
            ("tax", self.tax),
            ("insurance", self.insurance),
            ("provident_fund", self.provident_fund),
            ("loan_repayment", Some(self.loan_repayment)),
            ("other_deductions", Some(self.other_deductions)),
        ];
        for (name, value) in fields {
            if let Some(v) = value {
                if v.is_sign_negative() && !v.is_zero() {
                    return Err(GojiError::Validation(format!(
                        "{} must not be negative (got {})",
                        name, v
                    )));
                }
                if v > MAX_AMOUNT {
                    return Err(GojiError::Validation(format!(
                        "{} must not exceed {} (got {})",
                        name, MAX_AMOUNT, v
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollBreakdown {
    pub base_salary: Decimal,
    pub overtime_pay: Decimal,
    pub gross_salary: Decimal,
    pub tax: Decimal,
    pub insurance: Decimal,
    pub provident_fund: Decimal,
    pub loan_repayment: Decimal,
    pub other_deductions: Decimal,
    pub total_deductions: Decimal,
    pub leave_deduction: Decimal,
    pub net_salary: Decimal,
}

/// Derives gross, deductions and net pay. Inputs are assumed validated;
/// nothing is rounded here. Out-of-range intermediate amounts saturate.
pub fn compute_payroll(
    base_salary: Decimal,
    adj: &PayrollAdjustments,
    rules: &PayrollRules,
) -> PayrollBreakdown {
    let hourly = base_salary.checked_div(rules.standard_hours).unwrap_or(Decimal::ZERO);
    let overtime_pay = adj
        .overtime_hours
        .saturating_mul(hourly)
        .saturating_mul(rules.overtime_multiplier);
    let gross_salary = base_salary
        .saturating_add(overtime_pay)
        .saturating_add(adj.bonus)
        .saturating_add(adj.allowances);

    let tax = adj.tax.unwrap_or(gross_salary.saturating_mul(rules.tax_rate));
    let insurance = adj.insurance.unwrap_or(rules.default_insurance);
    let provident_fund = adj
        .provident_fund
        .unwrap_or(gross_salary.saturating_mul(rules.provident_fund_rate));
    let total_deductions = [insurance, provident_fund, adj.loan_repayment, adj.other_deductions]
        .into_iter()
        .fold(tax, Decimal::saturating_add);

    let daily = base_salary.checked_div(rules.working_days).unwrap_or(Decimal::ZERO);
    let leave_deduction = daily.saturating_mul(Decimal::from(adj.unpaid_leaves));
    let net_salary = gross_salary
        .saturating_sub(total_deductions)
        .saturating_sub(leave_deduction);

    PayrollBreakdown {
        base_salary,
        overtime_pay,
        gross_salary,
        tax,
        insurance,
        provident_fund,
        loan_repayment: adj.loan_repayment,
        other_deductions: adj.other_deductions,
        total_deductions,
        leave_deduction,
        net_salary,
    }
}

/// A fresh draft record for `employee` in the given period. Stored amounts are
/// rounded to cents.
pub fn draft_record(
    employee: &Employee,
    month: u32,
    year: i32,
    adj: &PayrollAdjustments,
    b: &PayrollBreakdown,
) -> GojiResult<PayrollRecord> {
    if !(1..=12).contains(&month) {
        return Err(GojiError::Validation(format!(
            "month must be 1-12 (got {})",
            month
        )));
    }
    Ok(PayrollRecord {
        id: 0,
        employee_id: employee.id,
        month,
        year,
        base_salary: b.base_salary.round_dp(2),
        overtime_hours: adj.overtime_hours,
        overtime_pay: b.overtime_pay.round_dp(2),
        bonus: adj.bonus.round_dp(2),
        allowances: adj.allowances.round_dp(2),
        gross_salary: b.gross_salary.round_dp(2),
        tax: b.tax.round_dp(2),
        insurance: b.insurance.round_dp(2),
        provident_fund: b.provident_fund.round_dp(2),
        loan_repayment: b.loan_repayment.round_dp(2),
        other_deductions: b.other_deductions.round_dp(2),
        total_deductions: b.total_deductions.round_dp(2),
        paid_leaves: adj.paid_leaves,
        unpaid_leaves: adj.unpaid_leaves,
        leave_deduction: b.leave_deduction.round_dp(2),
        net_salary: b.net_salary.round_dp(2),
        status: PayrollStatus::Draft,
        payment_date: None,
    })
}

/// Invariant violations for a stored record, tolerating one cent of drift
/// from per-field rounding.
pub fn invariant_errors(r: &PayrollRecord) -> Vec<String> {
    let tolerance = dec!(0.02);
    let mut errs = Vec::new();
    let gross = r.base_salary + r.overtime_pay + r.bonus + r.allowances;
    if (gross - r.gross_salary).abs() > tolerance {
        errs.push(format!("gross {} != components {}", r.gross_salary, gross));
    }
    let deductions =
        r.tax + r.insurance + r.provident_fund + r.loan_repayment + r.other_deductions;
    if (deductions - r.total_deductions).abs() > tolerance {
        errs.push(format!(
            "total_deductions {} != components {}",
            r.total_deductions, deductions
        ));
    }
    let net = r.gross_salary - r.total_deductions - r.leave_deduction;
    if (net - r.net_salary).abs() > tolerance {
        errs.push(format!("net {} != derived {}", r.net_salary, net));
    }
    errs
}

fn line(label: &str, amount: Decimal, ccy: &str) -> String {
    format!("{:<30}{} {:>12.2}\n", label, ccy, amount)
}

/// Plain-text salary slip.
pub fn salary_slip(company: &str, employee: &Employee, r: &PayrollRecord) -> String {
    let rule = "=".repeat(60);
    let ccy = employee.currency.as_str();
    let mut s = String::new();
    s.push_str(&format!("{rule}\n{:^60}\n{rule}\n\n", "SALARY SLIP"));
    s.push_str(&format!("Company: {}\n", company));
    s.push_str(&format!(
        "Employee: {} ({})\n",
        employee.name, employee.employee_id
    ));
    s.push_str(&format!("Designation: {}\n", employee.designation));
    s.push_str(&format!("Department: {}\n", employee.department));
    s.push_str(&format!("Period: {:02}/{}\n", r.month, r.year));
    s.push_str(&format!("Status: {}\n\n", r.status));

    s.push_str(&format!("{rule}\nEARNINGS:\n{rule}\n"));
    s.push_str(&line("Base Salary:", r.base_salary, ccy));
    s.push_str(&line(
        &format!("Overtime ({} hrs):", r.overtime_hours),
        r.overtime_pay,
        ccy,
    ));
    s.push_str(&line("Bonus:", r.bonus, ccy));
    s.push_str(&line("Allowances:", r.allowances, ccy));
    s.push_str(&line("Gross Salary:", r.gross_salary, ccy));

    s.push_str(&format!("\n{rule}\nDEDUCTIONS:\n{rule}\n"));
    s.push_str(&line("Tax:", r.tax, ccy));
    s.push_str(&line("Insurance:", r.insurance, ccy));
    s.push_str(&line("Provident Fund:", r.provident_fund, ccy));
    s.push_str(&line("Loan Repayment:", r.loan_repayment, ccy));
    s.push_str(&line("Other Deductions:", r.other_deductions, ccy));
    s.push_str(&line("Total Deductions:", r.total_deductions, ccy));
    s.push_str(&line("Leave Deduction:", r.leave_deduction, ccy));

    s.push_str(&format!("\n{rule}\n"));
    s.push_str(&line("NET SALARY:", r.net_salary, ccy));
    s.push_str(&format!("{rule}\n\n"));
    s.push_str(&format!(
        "Leave Summary: paid {}, unpaid {}\n",
        r.paid_leaves, r.unpaid_leaves
    ));
    s
}
