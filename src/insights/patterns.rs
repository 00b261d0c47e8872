// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Expense, PatternType, Priority, SpendingPattern};
use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

pub const MIN_POINTS: usize = 3;
pub const TREND_THRESHOLD: f64 = 20.0;
pub const HIGH_PRIORITY_THRESHOLD: f64 = 40.0;
/// Reported change when the older half averages zero but recent spend does not.
pub const FROM_ZERO_CHANGE: f64 = 100.0;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Percent change of the newer half against the older half of `amounts`,
/// which must be ordered newest first.
pub fn change_percent(amounts: &[f64]) -> f64 {
    let (recent, older) = amounts.split_at(amounts.len() / 2);
    let recent_avg = mean(recent);
    let older_avg = mean(older);
    if older_avg == 0.0 {
        if recent_avg == 0.0 { 0.0 } else { FROM_ZERO_CHANGE }
    } else {
        (recent_avg - older_avg) / older_avg * 100.0
    }
}

/// Per-category amounts inside the window, newest first, categories in
/// first-seen order.
fn grouped_newest_first(
    expenses: &[Expense],
    months_to_analyze: u32,
    today: NaiveDate,
) -> Vec<(String, Vec<f64>)> {
    let cutoff = today
        .checked_sub_months(Months::new(months_to_analyze))
        .unwrap_or(NaiveDate::MIN);

    let mut recent: Vec<&Expense> = expenses
        .iter()
        .filter(|e| e.expense_date >= cutoff)
        .collect();
    recent.sort_by(|a, b| b.expense_date.cmp(&a.expense_date));

    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for e in recent {
        let Some(amount) = e.amount.to_f64() else {
            debug!(expense = e.id, "skipping unrepresentable amount");
            continue;
        };
        match groups.iter_mut().find(|(c, _)| *c == e.category) {
            Some((_, list)) => list.push(amount),
            None => groups.push((e.category.clone(), vec![amount])),
        }
    }
    groups
}

fn trend_pattern(category: &str, change: f64) -> SpendingPattern {
    let priority = if change.abs() > HIGH_PRIORITY_THRESHOLD {
        Priority::High
    } else {
        Priority::Medium
    };
    let (r#type, recommendation) = if change > 0.0 {
        (
            PatternType::Increase,
            format!(
                "Spending on {} is up {:.1}%; review recent purchases and vendor contracts",
                category,
                change.abs()
            ),
        )
    } else {
        (
            PatternType::Decrease,
            format!(
                "Spending on {} is down {:.1}%; consider reallocating the freed budget",
                category,
                change.abs()
            ),
        )
    };
    SpendingPattern {
        r#type,
        category: category.to_string(),
        change: format!("{:+.1}%", change),
        recommendation,
        priority,
    }
}

/// Compares recent against older spend per category over the last
/// `months_to_analyze` months. Trend patterns come first, then one stable
/// pattern for each analysed category without a significant change.
pub fn analyze_spending_patterns(
    expenses: &[Expense],
    months_to_analyze: u32,
    today: NaiveDate,
) -> Vec<SpendingPattern> {
    let mut patterns = Vec::new();
    let mut stable = Vec::new();

    for (category, amounts) in grouped_newest_first(expenses, months_to_analyze, today) {
        if amounts.len() < MIN_POINTS {
            continue;
        }
        let change = change_percent(&amounts);
        if change.abs() > TREND_THRESHOLD {
            patterns.push(trend_pattern(&category, change));
        } else {
            stable.push(SpendingPattern {
                r#type: PatternType::Stable,
                recommendation: format!("Spending on {} is consistent; no action needed", category),
                category,
                change: "±5%".to_string(),
                priority: Priority::Low,
            });
        }
    }

    patterns.extend(stable);
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseStatus;
    use rust_decimal::Decimal;

    fn exp(category: &str, day: u32, month: u32, amount: i64) -> Expense {
        Expense {
            id: 0,
            title: "x".into(),
            description: String::new(),
            amount: Decimal::from(amount),
            currency: "USD".into(),
            category: category.into(),
            vendor_name: None,
            payment_method: None,
            expense_date: NaiveDate::from_ymd_opt(2026, month, day).unwrap(),
            receipt_url: None,
            status: ExpenseStatus::Approved,
            is_anomaly: false,
            ai_confidence: None,
            ai_category_suggestion: None,
            ocr_data: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn detects_increase_regardless_of_input_order() {
        // oldest first on purpose; recent half is [300, 300] vs older [100, 100]
        let ex = vec![
            exp("travel", 1, 7, 100),
            exp("travel", 1, 8, 100),
            exp("travel", 1, 9, 300),
            exp("travel", 1, 10, 300),
        ];
        let out = analyze_spending_patterns(&ex, 6, today());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].r#type, PatternType::Increase);
        assert_eq!(out[0].priority, Priority::High);
        assert_eq!(out[0].change, "+200.0%");
    }

    #[test]
    fn medium_priority_decrease() {
        // newest first: recent [70] vs older [100, 100]
        let ex = vec![
            exp("software", 5, 10, 70),
            exp("software", 5, 9, 100),
            exp("software", 5, 8, 100),
        ];
        let out = analyze_spending_patterns(&ex, 6, today());
        assert_eq!(out[0].r#type, PatternType::Decrease);
        assert_eq!(out[0].priority, Priority::Medium);
        assert_eq!(out[0].change, "-30.0%");
    }

    #[test]
    fn sparse_categories_are_skipped() {
        let ex = vec![exp("rent", 1, 9, 100), exp("rent", 1, 10, 900)];
        assert!(analyze_spending_patterns(&ex, 6, today()).is_empty());
    }

    #[test]
    fn every_flat_category_reports_stable() {
        let mut ex = Vec::new();
        for m in 7..=10 {
            ex.push(exp("rent", 1, m, 1000));
            ex.push(exp("utilities", 2, m, 200));
        }
        ex.push(exp("travel", 3, 10, 900));
        ex.push(exp("travel", 3, 9, 100));
        ex.push(exp("travel", 3, 8, 100));
        let out = analyze_spending_patterns(&ex, 6, today());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].category, "travel");
        assert_eq!(out[1].r#type, PatternType::Stable);
        assert_eq!(out[1].change, "±5%");
        assert_eq!(out[2].r#type, PatternType::Stable);
    }

    #[test]
    fn expenses_outside_window_are_ignored() {
        let ex = vec![
            exp("travel", 1, 1, 5000),
            exp("travel", 1, 9, 100),
            exp("travel", 1, 10, 100),
        ];
        assert!(analyze_spending_patterns(&ex, 3, today()).is_empty());
    }

    #[test]
    fn zero_older_average_is_finite() {
        assert_eq!(change_percent(&[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(change_percent(&[50.0, 0.0, 0.0]), FROM_ZERO_CHANGE);
    }
}
