// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::payroll::PayrollRules;
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

pub const KEY_CURRENCY: &str = "currency";
pub const KEY_COMPANY: &str = "company_name";
pub const KEY_MONTHLY_BUDGET: &str = "monthly_budget";
pub const KEY_STANDARD_HOURS: &str = "payroll.standard_hours";
pub const KEY_WORKING_DAYS: &str = "payroll.working_days";
pub const KEY_OVERTIME_MULTIPLIER: &str = "payroll.overtime_multiplier";
pub const KEY_TAX_RATE: &str = "payroll.tax_rate";
pub const KEY_PF_RATE: &str = "payroll.provident_fund_rate";
pub const KEY_DEFAULT_INSURANCE: &str = "payroll.default_insurance";

/// Every recognised settings key.
pub const KEYS: &[&str] = &[
    KEY_CURRENCY,
    KEY_COMPANY,
    KEY_MONTHLY_BUDGET,
    KEY_STANDARD_HOURS,
    KEY_WORKING_DAYS,
    KEY_OVERTIME_MULTIPLIER,
    KEY_TAX_RATE,
    KEY_PF_RATE,
    KEY_DEFAULT_INSURANCE,
];

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub currency: String,
    pub company_name: String,
    pub monthly_budget: Decimal,
    pub payroll: PayrollRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            company_name: "GOJI".to_string(),
            monthly_budget: Decimal::ZERO,
            payroll: PayrollRules::default(),
        }
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if !KEYS.contains(&key) {
        return Err(anyhow!(
            "Unknown setting '{}' (known: {})",
            key,
            KEYS.join(", ")
        ));
    }
    if key != KEY_CURRENCY && key != KEY_COMPANY {
        let d = value
            .parse::<Decimal>()
            .with_context(|| format!("Setting '{}' expects a decimal, got '{}'", key, value))?;
        if d.is_sign_negative() && !d.is_zero() {
            return Err(anyhow!("Setting '{}' must not be negative", key));
        }
        if (key == KEY_STANDARD_HOURS || key == KEY_WORKING_DAYS) && d.is_zero() {
            return Err(anyhow!("Setting '{}' must be greater than zero", key));
        }
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn decimal_or(conn: &Connection, key: &str, default: Decimal) -> Result<Decimal> {
    match get_setting(conn, key)? {
        Some(s) => s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid decimal '{}' for setting {}", s, key)),
        None => Ok(default),
    }
}

impl Settings {
    pub fn load(conn: &Connection) -> Result<Self> {
        let d = Settings::default();
        Ok(Self {
            currency: get_setting(conn, KEY_CURRENCY)?.unwrap_or(d.currency),
            company_name: get_setting(conn, KEY_COMPANY)?.unwrap_or(d.company_name),
            monthly_budget: decimal_or(conn, KEY_MONTHLY_BUDGET, d.monthly_budget)?,
            payroll: PayrollRules {
                standard_hours: decimal_or(conn, KEY_STANDARD_HOURS, d.payroll.standard_hours)?,
                working_days: decimal_or(conn, KEY_WORKING_DAYS, d.payroll.working_days)?,
                overtime_multiplier: decimal_or(
                    conn,
                    KEY_OVERTIME_MULTIPLIER,
                    d.payroll.overtime_multiplier,
                )?,
                tax_rate: decimal_or(conn, KEY_TAX_RATE, d.payroll.tax_rate)?,
                provident_fund_rate: decimal_or(conn, KEY_PF_RATE, d.payroll.provident_fund_rate)?,
                default_insurance: decimal_or(
                    conn,
                    KEY_DEFAULT_INSURANCE,
                    d.payroll.default_insurance,
                )?,
            },
        })
    }

    /// Flattened `(key, value)` pairs in `KEYS` order.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let p = &self.payroll;
        vec![
            (KEY_CURRENCY.into(), self.currency.clone()),
            (KEY_COMPANY.into(), self.company_name.clone()),
            (KEY_MONTHLY_BUDGET.into(), self.monthly_budget.to_string()),
            (KEY_STANDARD_HOURS.into(), p.standard_hours.to_string()),
            (KEY_WORKING_DAYS.into(), p.working_days.to_string()),
            (KEY_OVERTIME_MULTIPLIER.into(), p.overtime_multiplier.to_string()),
            (KEY_TAX_RATE.into(), p.tax_rate.to_string()),
            (KEY_PF_RATE.into(), p.provident_fund_rate.to_string()),
            (KEY_DEFAULT_INSURANCE.into(), p.default_insurance.to_string()),
        ]
    }
}
