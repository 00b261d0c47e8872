// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CashFlowPrediction, Expense, MonthTotal};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

const MARGIN: Decimal = dec!(0.15);

/// Sum of expense amounts per `(year, month)`, oldest first. Sums saturate at
/// `Decimal::MAX`.
pub fn monthly_totals(expenses: &[Expense]) -> BTreeMap<(i32, u32), Decimal> {
    let mut buckets: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for e in expenses {
        let key = (e.expense_date.year(), e.expense_date.month());
        let total = buckets.entry(key).or_insert(Decimal::ZERO);
        *total = total.saturating_add(e.amount);
    }
    buckets
}

/// Totals for the `months` calendar months ending with the month of `today`,
/// oldest first. Months without expenses report zero.
pub fn monthly_trend(expenses: &[Expense], months: u32, today: NaiveDate) -> Vec<MonthTotal> {
    let buckets = monthly_totals(expenses);
    let anchor = today.with_day(1).unwrap_or(today);
    (0..months)
        .rev()
        .filter_map(|back| anchor.checked_sub_months(Months::new(back)))
        .map(|d| MonthTotal {
            year: d.year(),
            month: d.month(),
            label: month_label(d),
            total: buckets
                .get(&(d.year(), d.month()))
                .copied()
                .unwrap_or(Decimal::ZERO),
        })
        .collect()
}

pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

fn round_whole(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Linear extrapolation of monthly spend for the `months_ahead` months after
/// `today`. Always returns exactly `months_ahead` predictions; with no history
/// every prediction is zero.
pub fn predict_cash_flow(
    expenses: &[Expense],
    monthly_budget: Decimal,
    months_ahead: u32,
    today: NaiveDate,
) -> Vec<CashFlowPrediction> {
    let buckets = monthly_totals(expenses);
    let totals: Vec<Decimal> = buckets.values().copied().collect();

    let (avg, trend) = match (totals.first(), totals.last()) {
        (Some(oldest), Some(newest)) => {
            let n = Decimal::from(totals.len());
            let sum = totals
                .iter()
                .fold(Decimal::ZERO, |acc, t| acc.saturating_add(*t));
            (sum / n, newest.saturating_sub(*oldest) / n)
        }
        _ => (Decimal::ZERO, Decimal::ZERO),
    };

    let anchor = today.with_day(1).unwrap_or(today);
    (1..=months_ahead)
        .map(|i| {
            let predicted = avg
                .saturating_add(trend.saturating_mul(Decimal::from(i)))
                .max(Decimal::ZERO);
            let margin = predicted * MARGIN;
            let label = anchor
                .checked_add_months(Months::new(i))
                .map(month_label)
                .unwrap_or_default();
            CashFlowPrediction {
                month: label,
                predicted_expenses: round_whole(predicted),
                confidence_interval: [
                    round_whole(predicted - margin),
                    round_whole(predicted.saturating_add(margin)),
                ],
                budget: monthly_budget,
                likely_overrun: predicted > monthly_budget,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseStatus;

    fn exp(date: (i32, u32, u32), amount: Decimal) -> Expense {
        Expense {
            id: 0,
            title: "x".into(),
            description: String::new(),
            amount,
            currency: "USD".into(),
            category: "software".into(),
            vendor_name: None,
            payment_method: None,
            expense_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            receipt_url: None,
            status: ExpenseStatus::Pending,
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
    fn returns_exactly_months_ahead() {
        let history = vec![exp((2026, 8, 3), dec!(1000)), exp((2026, 9, 3), dec!(1200))];
        for n in [0, 1, 3, 12] {
            assert_eq!(predict_cash_flow(&history, dec!(5000), n, today()).len(), n as usize);
        }
    }

    #[test]
    fn empty_history_predicts_zero() {
        let out = predict_cash_flow(&[], dec!(100), 2, today());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|p| p.predicted_expenses.is_zero() && !p.likely_overrun));
        assert_eq!(out[0].month, "Nov 2026");
        assert_eq!(out[1].month, "Dec 2026");
    }

    #[test]
    fn trend_follows_chronological_order() {
        // input deliberately newest-first
        let history = vec![
            exp((2026, 9, 10), dec!(3000)),
            exp((2026, 8, 10), dec!(2000)),
            exp((2026, 7, 10), dec!(1000)),
        ];
        let out = predict_cash_flow(&history, dec!(2500), 2, today());
        // avg 2000, trend (3000 - 1000) / 3
        assert_eq!(out[0].predicted_expenses, dec!(2667));
        assert_eq!(out[1].predicted_expenses, dec!(3333));
        assert!(out[0].likely_overrun);
        assert_eq!(out[0].confidence_interval, [dec!(2267), dec!(3067)]);
    }

    #[test]
    fn interval_brackets_prediction() {
        let history = vec![
            exp((2026, 1, 1), dec!(9000)),
            exp((2026, 2, 1), dec!(4000)),
            exp((2026, 3, 1), dec!(100)),
        ];
        for p in predict_cash_flow(&history, dec!(1000), 6, today()) {
            assert!(p.confidence_interval[0] <= p.predicted_expenses);
            assert!(p.predicted_expenses <= p.confidence_interval[1]);
        }
    }

    #[test]
    fn same_month_amounts_are_summed() {
        let history = vec![exp((2026, 5, 1), dec!(10)), exp((2026, 5, 30), dec!(15))];
        let buckets = monthly_totals(&history);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[&(2026, 5)], dec!(25));
    }

    #[test]
    fn huge_amounts_saturate_instead_of_overflowing() {
        let big = dec!(50000000000000000000000000000);
        let history = vec![exp((2026, 10, 1), big), exp((2026, 10, 2), big)];
        assert_eq!(monthly_totals(&history)[&(2026, 10)], Decimal::MAX);
        let out = predict_cash_flow(&history, Decimal::ZERO, 1, today());
        assert_eq!(out.len(), 1);
        assert!(out[0].likely_overrun);
        assert!(out[0].confidence_interval[0] <= out[0].predicted_expenses);
        assert!(out[0].predicted_expenses <= out[0].confidence_interval[1]);
    }

    #[test]
    fn trend_is_chronological_and_zero_filled() {
        let history = vec![
            exp((2026, 10, 3), dec!(40)),
            exp((2026, 8, 9), dec!(25)),
            exp((2026, 8, 1), dec!(5)),
            exp((2025, 10, 1), dec!(999)),
        ];
        let trend = monthly_trend(&history, 4, today());
        let totals: Vec<(u32, Decimal)> = trend.iter().map(|t| (t.month, t.total)).collect();
        assert_eq!(
            totals,
            vec![(7, dec!(0)), (8, dec!(30)), (9, dec!(0)), (10, dec!(40))]
        );
        assert_eq!(trend[0].label, "Jul 2026");
        assert!(trend.iter().all(|t| t.year == 2026));
    }

    #[test]
    fn trend_crosses_year_boundary() {
        let jan = NaiveDate::from_ymd_opt(2027, 1, 31).unwrap();
        let trend = monthly_trend(&[exp((2026, 12, 24), dec!(12))], 2, jan);
        assert_eq!((trend[0].year, trend[0].month, trend[0].total), (2026, 12, dec!(12)));
        assert_eq!((trend[1].year, trend[1].month), (2027, 1));
    }
}
