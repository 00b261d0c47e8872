// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GojiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseStatus {
    type Err = GojiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ExpenseStatus::Pending),
            "approved" => Ok(ExpenseStatus::Approved),
            "rejected" => Ok(ExpenseStatus::Rejected),
            other => Err(GojiError::Validation(format!(
                "unknown expense status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    pub vendor_name: Option<String>,
    pub payment_method: Option<String>,
    pub expense_date: NaiveDate,
    pub receipt_url: Option<String>,
    pub status: ExpenseStatus,
    // Set once when the expense is recorded, never recomputed on read.
    pub is_anomaly: bool,
    pub ai_confidence: Option<f64>,
    pub ai_category_suggestion: Option<String>,
    pub ocr_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category: String,
    pub monthly_limit: Decimal,
    pub yearly_limit: Decimal,
    pub year: i32,
    pub alert_threshold: Decimal, // percent 0-100
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::Contract => "contract",
        }
    }
}

impl FromStr for EmploymentType {
    type Err = GojiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full_time" => Ok(EmploymentType::FullTime),
            "part_time" => Ok(EmploymentType::PartTime),
            "contract" => Ok(EmploymentType::Contract),
            other => Err(GojiError::Validation(format!(
                "unknown employment type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub employee_id: String,
    pub name: String,
    pub designation: String,
    pub department: String,
    pub base_salary: Decimal, // monthly
    pub currency: String,
    pub date_of_joining: NaiveDate,
    pub employment_type: EmploymentType,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Processed,
    Paid,
}

impl PayrollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayrollStatus::Draft => "draft",
            PayrollStatus::Processed => "processed",
            PayrollStatus::Paid => "paid",
        }
    }

    /// The only status reachable from `self`, if any.
    pub fn next(&self) -> Option<PayrollStatus> {
        match self {
            PayrollStatus::Draft => Some(PayrollStatus::Processed),
            PayrollStatus::Processed => Some(PayrollStatus::Paid),
            PayrollStatus::Paid => None,
        }
    }

    /// Validates a single forward step (draft -> processed -> paid).
    pub fn transition(self, to: PayrollStatus) -> Result<PayrollStatus, GojiError> {
        if self.next() == Some(to) {
            Ok(to)
        } else {
            Err(GojiError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayrollStatus {
    type Err = GojiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PayrollStatus::Draft),
            "processed" => Ok(PayrollStatus::Processed),
            "paid" => Ok(PayrollStatus::Paid),
            other => Err(GojiError::Validation(format!(
                "unknown payroll status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub id: i64,
    pub employee_id: i64,
    pub month: u32,
    pub year: i32,
    pub base_salary: Decimal,
    pub overtime_hours: Decimal,
    pub overtime_pay: Decimal,
    pub bonus: Decimal,
    pub allowances: Decimal,
    pub gross_salary: Decimal,
    pub tax: Decimal,
    pub insurance: Decimal,
    pub provident_fund: Decimal,
    pub loan_repayment: Decimal,
    pub other_deductions: Decimal,
    pub total_deductions: Decimal,
    pub paid_leaves: u32,
    pub unpaid_leaves: u32,
    pub leave_deduction: Decimal,
    pub net_salary: Decimal,
    pub status: PayrollStatus,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPrediction {
    pub month: String,
    pub predicted_expenses: Decimal,
    pub confidence_interval: [Decimal; 2],
    pub budget: Decimal,
    pub likely_overrun: bool,
}

/// Spend for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Increase,
    Decrease,
    Stable,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Increase => "increase",
            PatternType::Decrease => "decrease",
            PatternType::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPattern {
    #[serde(rename = "type")]
    pub r#type: PatternType,
    pub category: String,
    pub change: String,
    pub recommendation: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Grade::A
        } else if score >= 7.0 {
            Grade::B
        } else if score >= 5.0 {
            Grade::C
        } else if score >= 3.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialInsight {
    pub overall_score: f64,
    pub expense_health: f64,
    pub payroll_health: f64,
    pub budget_adherence: f64,
    pub grade: Grade,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGuess {
    pub category: String,
    pub confidence: f64,
}
