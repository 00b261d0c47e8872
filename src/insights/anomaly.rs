// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Expense;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::warn;

/// Number of population standard deviations above the mean that counts as unusual.
pub const SIGMA_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
}

impl CategoryStats {
    pub fn threshold(&self) -> f64 {
        self.mean + SIGMA_THRESHOLD * self.std_dev
    }
}

/// Mean and population standard deviation of the amounts in `category`.
/// `None` when the category has no usable history.
pub fn category_stats(category: &str, history: &[Expense]) -> Option<CategoryStats> {
    let amounts: Vec<f64> = history
        .iter()
        .filter(|e| e.category == category)
        .filter_map(|e| match e.amount.to_f64() {
            Some(v) => Some(v),
            None => {
                warn!(expense = e.id, "skipping amount not representable as f64");
                None
            }
        })
        .collect();
    if amounts.is_empty() {
        return None;
    }
    let n = amounts.len() as f64;
    let mean = amounts.iter().sum::<f64>() / n;
    let variance = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
    Some(CategoryStats {
        count: amounts.len(),
        mean,
        std_dev: variance.sqrt(),
    })
}

/// One-sided test: flagged iff `amount > mean + 2σ` of the same-category
/// history. A category with no history is never flagged. With a single
/// historical record σ is zero, so any larger amount is flagged.
pub fn is_anomaly(amount: Decimal, category: &str, history: &[Expense]) -> bool {
    let Some(stats) = category_stats(category, history) else {
        return false;
    };
    let Some(amount) = amount.to_f64() else {
        return false;
    };
    amount > stats.threshold()
}
