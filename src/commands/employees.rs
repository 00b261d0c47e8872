// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Settings;
use crate::models::{Employee, EmploymentType};
use crate::store;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("deactivate", sub)) => {
            let code = sub.get_one::<String>("code").unwrap().trim();
            store::deactivate_employee(conn, code)?;
            println!("Employee {} deactivated", code);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let arg = |name: &str| sub.get_one::<String>(name).unwrap().trim().to_string();
    let employee = Employee {
        id: 0,
        employee_id: arg("code").to_uppercase(),
        name: arg("name"),
        designation: arg("designation"),
        department: arg("department"),
        base_salary: parse_decimal(&arg("salary"))?,
        currency: sub
            .get_one::<String>("currency")
            .map(|c| c.trim().to_uppercase())
            .unwrap_or(settings.currency),
        date_of_joining: parse_date(&arg("joined"))?,
        employment_type: arg("type").parse::<EmploymentType>()?,
        is_active: true,
    };
    let id = store::insert_employee(conn, &employee)?;
    info!(employee = id, code = %employee.employee_id, "employee added");
    println!("Added employee {} ({})", employee.employee_id, employee.name);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let employees = store::load_employees(conn, !sub.get_flag("all"))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &employees)? {
        return Ok(());
    }
    let rows = employees
        .iter()
        .map(|e| {
            vec![
                e.employee_id.clone(),
                e.name.clone(),
                e.designation.clone(),
                e.department.clone(),
                format!("{:.2} {}", e.base_salary, e.currency),
                e.employment_type.as_str().to_string(),
                e.date_of_joining.to_string(),
                if e.is_active { "yes".into() } else { "no".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Code", "Name", "Designation", "Department", "Salary", "Type", "Joined", "Active"],
            rows
        )
    );
    Ok(())
}
