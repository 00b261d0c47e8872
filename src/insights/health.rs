// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Budget, Expense, ExpenseStatus, FinancialInsight, Grade};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

const EXPENSE_WEIGHT: f64 = 40.0;
const PAYROLL_WEIGHT: f64 = 30.0;
const BUDGET_WEIGHT: f64 = 30.0;
const ANOMALY_PENALTY: f64 = 15.0;
const PENDING_PENALTY: f64 = 10.0;
const PENDING_PAYROLL_PENALTY: f64 = 5.0;
const OVERRUN_PENALTY: f64 = 10.0;

/// Total spend in `category` during the calendar month of `today`, any status.
pub fn current_month_spend(expenses: &[Expense], category: &str, today: NaiveDate) -> Decimal {
    expenses
        .iter()
        .filter(|e| {
            e.category == category
                && e.expense_date.year() == today.year()
                && e.expense_date.month() == today.month()
        })
        .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.amount))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn calculate_health_score(
    expenses: &[Expense],
    budgets: &[Budget],
    pending_payroll_count: usize,
    today: NaiveDate,
) -> FinancialInsight {
    let total = expenses.len().max(1) as f64;
    let anomalous = expenses.iter().filter(|e| e.is_anomaly).count() as f64;
    let pending = expenses
        .iter()
        .filter(|e| e.status == ExpenseStatus::Pending)
        .count() as f64;
    let anomaly_rate = anomalous / total;
    let pending_rate = pending / total;

    let expense_score =
        (EXPENSE_WEIGHT - anomaly_rate * ANOMALY_PENALTY - pending_rate * PENDING_PENALTY).max(0.0);
    let payroll_score =
        (PAYROLL_WEIGHT - pending_payroll_count as f64 * PENDING_PAYROLL_PENALTY).max(0.0);

    let overruns = budgets
        .iter()
        .filter(|b| b.is_active)
        .filter(|b| current_month_spend(expenses, &b.category, today) > b.monthly_limit)
        .count() as f64;
    let budget_score = (BUDGET_WEIGHT - overruns * OVERRUN_PENALTY).max(0.0);

    let overall_score = round1((expense_score + payroll_score + budget_score) / 10.0);

    let mut insights = Vec::new();
    if anomaly_rate > 0.1 {
        insights.push(
            "High number of anomalous expenses detected; review flagged transactions".to_string(),
        );
    }
    if pending_rate > 0.2 {
        insights.push("Many expenses are pending approval; clear the approval queue".to_string());
    }
    if budget_score < 20.0 {
        insights.push(
            "Multiple budgets exceeded this month; tighten category spending".to_string(),
        );
    }
    if overall_score >= 7.0 {
        insights.push("Financial health is good; keep up current practices".to_string());
    }

    FinancialInsight {
        overall_score,
        expense_health: round1(expense_score / 4.0),
        payroll_health: round1(payroll_score / 3.0),
        budget_adherence: round1(budget_score / 3.0),
        grade: Grade::from_score(overall_score),
        insights,
    }
}
