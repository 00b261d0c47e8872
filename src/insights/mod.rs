// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Heuristic spend analytics. Every function here is pure: inputs are
//! borrowed, never mutated, and "today" is passed in explicitly.

pub mod anomaly;
pub mod budget;
pub mod categorize;
pub mod forecast;
pub mod health;
pub mod patterns;

pub use anomaly::{category_stats, is_anomaly};
pub use budget::{budget_status, burn_rate, days_in_month, project_month_overrun};
pub use categorize::{categorize, extract_keywords};
pub use forecast::{monthly_trend, predict_cash_flow};
pub use health::calculate_health_score;
pub use patterns::analyze_spending_patterns;
