// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::insights::anomaly::CategoryStats;
use crate::insights::health::current_month_spend;
use crate::insights::{
    analyze_spending_patterns, burn_rate, calculate_health_score, categorize, category_stats,
    days_in_month, extract_keywords, is_anomaly, monthly_trend, predict_cash_flow,
    project_month_overrun,
};
use crate::store;
use crate::utils::{maybe_print_json, parse_decimal, parse_non_negative, pretty_table, today};
use anyhow::{Result, anyhow};
use chrono::Datelike;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub)) = m.subcommand() else {
        return Ok(());
    };
    let json = sub.get_flag("json");
    let jsonl = sub.get_flag("jsonl");
    match name {
        "categorize" => {
            let title = sub.get_one::<String>("title").unwrap();
            let description = sub.get_one::<String>("description").unwrap();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let guess = categorize(title, description, amount);
            if !maybe_print_json(json, jsonl, &guess)? {
                println!("{} (confidence {:.2})", guess.category, guess.confidence);
            }
        }
        "anomaly" => anomaly(conn, sub, json, jsonl)?,
        "forecast" => forecast(conn, sub, json, jsonl)?,
        "patterns" => {
            let months = *sub.get_one::<u32>("months").unwrap();
            let patterns =
                analyze_spending_patterns(&store::load_expenses(conn)?, months, today());
            if !maybe_print_json(json, jsonl, &patterns)? {
                let rows = patterns
                    .iter()
                    .map(|p| {
                        vec![
                            p.category.clone(),
                            p.r#type.as_str().to_string(),
                            p.change.clone(),
                            p.priority.as_str().to_string(),
                            p.recommendation.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Category", "Trend", "Change", "Priority", "Recommendation"],
                        rows
                    )
                );
            }
        }
        "trends" => {
            let months = *sub.get_one::<u32>("months").unwrap();
            let trend = monthly_trend(&store::load_expenses(conn)?, months, today());
            if !maybe_print_json(json, jsonl, &trend)? {
                let rows = trend
                    .iter()
                    .map(|t| vec![t.label.clone(), format!("{:.2}", t.total)])
                    .collect();
                println!("{}", pretty_table(&["Month", "Total"], rows));
            }
        }
        "health" => {
            let insight = calculate_health_score(
                &store::load_expenses(conn)?,
                &store::load_budgets(conn)?,
                store::pending_payroll_count(conn)?,
                today(),
            );
            if !maybe_print_json(json, jsonl, &insight)? {
                println!(
                    "Overall {:.1}/10 (grade {})  expenses {:.1}  payroll {:.1}  budgets {:.1}",
                    insight.overall_score,
                    insight.grade,
                    insight.expense_health,
                    insight.payroll_health,
                    insight.budget_adherence
                );
                for line in &insight.insights {
                    println!("- {}", line);
                }
            }
        }
        "burn-rate" => {
            let remaining =
                parse_non_negative(sub.get_one::<String>("remaining").unwrap(), "remaining")?;
            let b = burn_rate(&store::load_expenses(conn)?, remaining, today());
            if !maybe_print_json(json, jsonl, &b)? {
                println!(
                    "Burn rate {:.2}/month, runway {}, depletion {}, confidence {:.2}",
                    b.burn_rate,
                    b.runway_months
                        .map(|r| format!("{} months", r))
                        .unwrap_or_else(|| "unlimited".into()),
                    b.depletion_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".into()),
                    b.confidence
                );
            }
        }
        "overrun" => overrun(conn, sub, json, jsonl)?,
        "keywords" => {
            let text = sub.get_one::<String>("text").unwrap();
            let top = *sub.get_one::<usize>("top").unwrap();
            let words = extract_keywords(text, top);
            if !maybe_print_json(json, jsonl, &words)? {
                println!("{}", words.join(", "));
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct AnomalyCheck {
    category: String,
    amount: Decimal,
    is_anomaly: bool,
    stats: Option<CategoryStats>,
}

fn anomaly(conn: &Connection, sub: &clap::ArgMatches, json: bool, jsonl: bool) -> Result<()> {
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let amount = parse_non_negative(sub.get_one::<String>("amount").unwrap(), "amount")?;
    let history = store::load_expenses(conn)?;
    let check = AnomalyCheck {
        is_anomaly: is_anomaly(amount, &category, &history),
        stats: category_stats(&category, &history),
        category,
        amount,
    };
    if maybe_print_json(json, jsonl, &check)? {
        return Ok(());
    }
    match check.stats {
        Some(s) => println!(
            "{} in {}: {} (mean {:.2}, sd {:.2}, threshold {:.2}, n={})",
            check.amount,
            check.category,
            if check.is_anomaly { "ANOMALY" } else { "normal" },
            s.mean,
            s.std_dev,
            s.threshold(),
            s.count
        ),
        None => println!("No history for {}; not flagged", check.category),
    }
    Ok(())
}

fn forecast(conn: &Connection, sub: &clap::ArgMatches, json: bool, jsonl: bool) -> Result<()> {
    let months = *sub.get_one::<u32>("months").unwrap();
    let budget = match sub.get_one::<String>("budget") {
        Some(s) => parse_non_negative(s, "budget")?,
        None => Settings::load(conn)?.monthly_budget,
    };
    let predictions = predict_cash_flow(&store::load_expenses(conn)?, budget, months, today());
    if maybe_print_json(json, jsonl, &predictions)? {
        return Ok(());
    }
    let rows = predictions
        .iter()
        .map(|p| {
            vec![
                p.month.clone(),
                format!("{}", p.predicted_expenses),
                format!(
                    "{} - {}",
                    p.confidence_interval[0], p.confidence_interval[1]
                ),
                format!("{}", p.budget),
                if p.likely_overrun { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Predicted", "Interval", "Budget", "Overrun"], rows)
    );
    Ok(())
}

fn overrun(conn: &Connection, sub: &clap::ArgMatches, json: bool, jsonl: bool) -> Result<()> {
    let category = sub.get_one::<String>("category").unwrap().trim();
    let today = today();
    let budget = store::load_budgets(conn)?
        .into_iter()
        .find(|b| b.is_active && b.category == category && b.year == today.year())
        .ok_or_else(|| anyhow!("No active {} budget for {}", category, today.year()))?;
    let spent = current_month_spend(&store::load_expenses(conn)?, category, today);
    let projection =
        project_month_overrun(spent, budget.monthly_limit, today.day(), days_in_month(today));
    if !maybe_print_json(json, jsonl, &projection)? {
        println!(
            "{}: projected {:.2} vs limit {:.2}, overrun {:.2} (p={:.2}), {} days left",
            category,
            projection.predicted_total,
            budget.monthly_limit,
            projection.overrun_amount,
            projection.probability,
            projection.days_remaining
        );
    }
    Ok(())
}
