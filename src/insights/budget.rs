// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::insights::forecast::monthly_totals;
use crate::insights::health::current_month_spend;
use crate::models::{Budget, Expense};
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnRate {
    pub burn_rate: Decimal,
    pub runway_months: Option<Decimal>,
    pub depletion_date: Option<NaiveDate>,
    pub confidence: f64,
}

/// Confidence in a series: more points and a lower coefficient of variation
/// score higher. Capped at 0.95.
pub fn series_confidence(values: &[f64]) -> f64 {
    let mut confidence: f64 = 0.3;
    let n = values.len();
    if n >= 12 {
        confidence += 0.4;
    } else if n >= 6 {
        confidence += 0.3;
    } else if n >= 3 {
        confidence += 0.2;
    }
    if n > 1 {
        let mean = values.iter().sum::<f64>() / n as f64;
        if mean > 0.0 {
            // sample standard deviation
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            let cv = var.sqrt() / mean;
            if cv < 0.2 {
                confidence += 0.2;
            } else if cv < 0.5 {
                confidence += 0.1;
            }
        }
    }
    confidence.min(0.95)
}

/// Monthly burn weighted toward the latest month, and how long `remaining_budget`
/// lasts at that pace.
pub fn burn_rate(expenses: &[Expense], remaining_budget: Decimal, today: NaiveDate) -> BurnRate {
    let totals: Vec<Decimal> = monthly_totals(expenses).into_values().collect();
    if totals.is_empty() {
        return BurnRate {
            burn_rate: Decimal::ZERO,
            runway_months: None,
            depletion_date: None,
            confidence: 0.0,
        };
    }

    let n = totals.len();
    let burn = if n >= 3 {
        let earlier = totals[n - 3].saturating_add(totals[n - 2]) / dec!(2);
        (totals[n - 1] * dec!(0.5)).saturating_add(earlier * dec!(0.5))
    } else {
        totals
            .iter()
            .fold(Decimal::ZERO, |acc, t| acc.saturating_add(*t))
            / Decimal::from(n)
    };

    let runway = (burn > Decimal::ZERO)
        .then(|| remaining_budget.checked_div(burn))
        .flatten();
    let depletion_date = runway
        .and_then(|r| r.checked_mul(dec!(30)))
        .and_then(|days| days.to_u64())
        .and_then(|days| today.checked_add_days(Days::new(days)));
    let runway_months = runway.map(|r| r.round_dp(1));

    let as_f64: Vec<f64> = totals.iter().filter_map(|t| t.to_f64()).collect();
    BurnRate {
        burn_rate: burn.round_dp(2),
        runway_months,
        depletion_date,
        confidence: (series_confidence(&as_f64) * 100.0).round() / 100.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverrunProjection {
    pub predicted_total: Decimal,
    pub overrun_amount: Decimal,
    pub probability: f64,
    pub days_remaining: u32,
}

/// Extrapolates month-to-date spend linearly to the end of the month.
pub fn project_month_overrun(
    spent_so_far: Decimal,
    limit: Decimal,
    days_elapsed: u32,
    days_in_month: u32,
) -> OverrunProjection {
    if days_elapsed == 0 || days_in_month == 0 {
        return OverrunProjection {
            predicted_total: Decimal::ZERO,
            overrun_amount: Decimal::ZERO,
            probability: 0.0,
            days_remaining: days_in_month,
        };
    }
    let daily = spent_so_far / Decimal::from(days_elapsed);
    let predicted_total = daily.saturating_mul(Decimal::from(days_in_month));
    let overrun_amount = predicted_total.saturating_sub(limit).max(Decimal::ZERO);
    let probability = if predicted_total > limit {
        let time_factor = days_elapsed as f64 / days_in_month as f64;
        (0.5 + time_factor * 0.5).min(0.95)
    } else {
        0.0
    };
    OverrunProjection {
        predicted_total: predicted_total.round_dp(2),
        overrun_amount: overrun_amount.round_dp(2),
        probability: (probability * 100.0).round() / 100.0,
        days_remaining: days_in_month.saturating_sub(days_elapsed),
    }
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let (y, m) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Ok,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub category: String,
    pub year: i32,
    pub monthly_limit: Decimal,
    pub monthly_spent: Decimal,
    pub monthly_remaining: Decimal,
    pub yearly_limit: Decimal,
    pub yearly_spent: Decimal,
    pub yearly_remaining: Decimal,
    pub usage_percent: Decimal,
    pub alert: AlertLevel,
}

/// Spend against a budget for the month of `today` and for the budget year.
pub fn budget_status(budget: &Budget, expenses: &[Expense], today: NaiveDate) -> BudgetStatus {
    let monthly_spent = current_month_spend(expenses, &budget.category, today);
    let yearly_spent: Decimal = expenses
        .iter()
        .filter(|e| e.category == budget.category && e.expense_date.year() == budget.year)
        .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.amount));
    let usage_percent = monthly_spent
        .checked_div(budget.monthly_limit)
        .map(|ratio| ratio.saturating_mul(dec!(100)).round_dp(1))
        .unwrap_or(Decimal::ZERO);
    let alert = if monthly_spent > budget.monthly_limit {
        AlertLevel::Exceeded
    } else if usage_percent >= budget.alert_threshold && !budget.monthly_limit.is_zero() {
        AlertLevel::Warning
    } else {
        AlertLevel::Ok
    };
    BudgetStatus {
        category: budget.category.clone(),
        year: budget.year,
        monthly_limit: budget.monthly_limit,
        monthly_spent,
        monthly_remaining: budget.monthly_limit.saturating_sub(monthly_spent),
        yearly_limit: budget.yearly_limit,
        yearly_spent,
        yearly_remaining: budget.yearly_limit.saturating_sub(yearly_spent),
        usage_percent,
        alert,
    }
}
