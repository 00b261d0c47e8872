// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command};

fn req(name: &'static str) -> Arg {
    Arg::new(name).long(name).required(true)
}

fn opt(name: &'static str) -> Arg {
    Arg::new(name).long(name)
}

/// Month counts for the analytic reports, bounded to ten years.
fn months(default: &'static str) -> Arg {
    opt("months")
        .default_value(default)
        .value_parser(clap::value_parser!(u32).range(1..=120))
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn payroll_adjustment_args(cmd: Command) -> Command {
    cmd.arg(opt("overtime-hours").default_value("0"))
        .arg(opt("bonus").default_value("0"))
        .arg(opt("allowances").default_value("0"))
        .arg(opt("tax").help("Override computed tax"))
        .arg(opt("insurance").help("Override default insurance"))
        .arg(opt("provident-fund").help("Override computed provident fund"))
        .arg(opt("loan").default_value("0").help("Loan repayment"))
        .arg(opt("other-deductions").default_value("0"))
        .arg(
            opt("paid-leaves")
                .default_value("0")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            opt("unpaid-leaves")
                .default_value("0")
                .value_parser(clap::value_parser!(u32)),
        )
}

pub fn build_cli() -> Command {
    Command::new("goji")
        .about("Expense analytics and payroll from the terminal")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Read and write settings")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                )
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("expense")
                .about("Record and review expenses")
                .subcommand(
                    Command::new("add")
                        .arg(req("title"))
                        .arg(req("amount"))
                        .arg(req("date").help("YYYY-MM-DD"))
                        .arg(opt("description").default_value(""))
                        .arg(opt("currency"))
                        .arg(opt("category").help("Skip auto-categorisation"))
                        .arg(opt("vendor"))
                        .arg(opt("payment-method"))
                        .arg(opt("receipt-url")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("category"))
                        .arg(opt("status"))
                        .arg(opt("month").help("YYYY-MM"))
                        .arg(
                            Arg::new("anomalies")
                                .long("anomalies")
                                .action(ArgAction::SetTrue)
                                .help("Only flagged expenses"),
                        ),
                ))
                .subcommand(
                    Command::new("approve")
                        .arg(req("id").value_parser(clap::value_parser!(i64))),
                )
                .subcommand(
                    Command::new("reject").arg(req("id").value_parser(clap::value_parser!(i64))),
                )
                .subcommand(
                    Command::new("update")
                        .about("Change fields of a recorded expense")
                        .arg(req("id").value_parser(clap::value_parser!(i64)))
                        .arg(opt("title"))
                        .arg(opt("amount"))
                        .arg(opt("date").help("YYYY-MM-DD"))
                        .arg(opt("description"))
                        .arg(opt("currency"))
                        .arg(opt("category"))
                        .arg(opt("vendor").help("Empty clears the vendor"))
                        .arg(opt("payment-method"))
                        .arg(opt("receipt-url")),
                )
                .subcommand(
                    Command::new("delete").arg(req("id").value_parser(clap::value_parser!(i64))),
                )
                .subcommand(
                    Command::new("reassess")
                        .about("Re-run categorisation and anomaly detection")
                        .arg(req("id").value_parser(clap::value_parser!(i64))),
                )
                .subcommand(json_flags(Command::new("summary"))),
        )
        .subcommand(
            Command::new("budget")
                .about("Category budgets")
                .subcommand(
                    Command::new("set")
                        .arg(req("category"))
                        .arg(req("year").value_parser(clap::value_parser!(i32)))
                        .arg(req("monthly"))
                        .arg(opt("yearly").help("Defaults to monthly x 12"))
                        .arg(opt("alert-threshold").default_value("80")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Include inactive budgets"),
                    ),
                ))
                .subcommand(json_flags(Command::new("status").arg(opt("category"))))
                .subcommand(
                    Command::new("deactivate")
                        .arg(req("category"))
                        .arg(req("year").value_parser(clap::value_parser!(i32))),
                ),
        )
        .subcommand(
            Command::new("employee")
                .about("Employee roster")
                .subcommand(
                    Command::new("add")
                        .arg(req("code").help("Employee code, e.g. EMP001"))
                        .arg(req("name"))
                        .arg(req("designation"))
                        .arg(req("department"))
                        .arg(req("salary").help("Monthly base salary"))
                        .arg(req("joined").help("YYYY-MM-DD"))
                        .arg(opt("currency"))
                        .arg(opt("type").default_value("full_time")),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("all")
                            .long("all")
                            .action(ArgAction::SetTrue)
                            .help("Include inactive employees"),
                    ),
                ))
                .subcommand(Command::new("deactivate").arg(req("code"))),
        )
        .subcommand(
            Command::new("payroll")
                .about("Monthly payroll runs")
                .subcommand(payroll_adjustment_args(
                    Command::new("run")
                        .about("Create draft records for a month")
                        .arg(req("month").help("YYYY-MM"))
                        .arg(opt("employee").help("Only this employee code")),
                ))
                .subcommand(json_flags(payroll_adjustment_args(
                    Command::new("preview")
                        .about("Compute without storing")
                        .arg(req("month").help("YYYY-MM"))
                        .arg(req("employee")),
                )))
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(opt("month").help("YYYY-MM"))
                        .arg(opt("status")),
                ))
                .subcommand(
                    Command::new("process")
                        .arg(req("employee"))
                        .arg(req("month")),
                )
                .subcommand(
                    Command::new("pay")
                        .arg(req("employee"))
                        .arg(req("month"))
                        .arg(opt("date").help("Payment date, defaults to today")),
                )
                .subcommand(
                    Command::new("slip")
                        .arg(req("employee"))
                        .arg(req("month")),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Remove an unpaid record so it can be run again")
                        .arg(req("employee"))
                        .arg(req("month")),
                ),
        )
        .subcommand(
            Command::new("insights")
                .about("Spend analytics")
                .subcommand(json_flags(
                    Command::new("categorize")
                        .arg(req("title"))
                        .arg(opt("description").default_value(""))
                        .arg(opt("amount").default_value("0")),
                ))
                .subcommand(json_flags(
                    Command::new("anomaly")
                        .arg(req("category"))
                        .arg(req("amount")),
                ))
                .subcommand(json_flags(
                    Command::new("forecast")
                        .arg(months("3"))
                        .arg(opt("budget").help("Monthly budget, defaults to the setting")),
                ))
                .subcommand(json_flags(Command::new("patterns").arg(months("6"))))
                .subcommand(json_flags(
                    Command::new("trends")
                        .about("Monthly totals, oldest first")
                        .arg(months("6")),
                ))
                .subcommand(json_flags(Command::new("health")))
                .subcommand(json_flags(
                    Command::new("burn-rate").arg(req("remaining").help("Remaining budget")),
                ))
                .subcommand(json_flags(Command::new("overrun").arg(req("category"))))
                .subcommand(json_flags(
                    Command::new("keywords").arg(req("text")).arg(
                        opt("top")
                            .default_value("10")
                            .value_parser(clap::value_parser!(usize)),
                    ),
                )),
        )
        .subcommand(
            Command::new("import")
                .about("Import from CSV")
                .subcommand(Command::new("expenses").arg(req("path"))),
        )
        .subcommand(
            Command::new("export")
                .about("Export to CSV or JSON")
                .subcommand(
                    Command::new("expenses")
                        .arg(opt("format").default_value("csv"))
                        .arg(req("out")),
                )
                .subcommand(
                    Command::new("payroll")
                        .arg(opt("format").default_value("csv"))
                        .arg(req("out")),
                ),
        )
        .subcommand(Command::new("doctor").about("Check data integrity"))
}
