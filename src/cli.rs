// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn file_arg() -> Arg {
    Arg::new("file")
        .long("file")
        .value_name("PATH")
        .env("RUNWAY_FILE")
        .required(true)
        .help("CSV file with date, amount, type, category, restricted")
}

fn as_of_arg() -> Arg {
    Arg::new("as_of")
        .long("as-of")
        .value_name("YYYY-MM")
        .env("RUNWAY_AS_OF")
        .help("Ignore transactions after a given month")
}

fn cash_args(starting_required: bool) -> [Arg; 3] {
    [
        Arg::new("starting_cash")
            .long("starting-cash")
            .value_name("AMOUNT")
            .env("RUNWAY_STARTING_CASH")
            .required(starting_required)
            .allow_hyphen_values(true)
            .help("Starting available cash balance"),
        Arg::new("reserved_cash")
            .long("reserved-cash")
            .value_name("AMOUNT")
            .env("RUNWAY_RESERVED_CASH")
            .allow_hyphen_values(true)
            .help("Reserved/restricted cash to exclude from runway"),
        Arg::new("window")
            .long("window")
            .value_name("MONTHS")
            .env("RUNWAY_WINDOW")
            .value_parser(value_parser!(usize))
            .help("Use last N months for average burn calculation (0 = all)"),
    ]
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

pub fn build_cli() -> Command {
    Command::new("runway")
        .about("Funding runway: burn rate and months of cash remaining from a CSV ledger")
        .version(clap::crate_version!())
        .subcommand(
            Command::new("report")
                .about("Full runway report")
                .arg(file_arg())
                .args(cash_args(true))
                .arg(as_of_arg())
                .arg(json_flag())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_name("PATH")
                        .help("Write JSON report to PATH"),
                ),
        )
        .subcommand(
            Command::new("months")
                .about("Monthly inflow, outflow, net and running balance")
                .arg(file_arg())
                .args(cash_args(false))
                .arg(as_of_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("categories")
                .about("Outflow (or inflow) totals by category")
                .arg(file_arg())
                .arg(as_of_arg())
                .arg(
                    Arg::new("inflow")
                        .long("inflow")
                        .action(ArgAction::SetTrue)
                        .help("Show inflow sources instead of outflow categories"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .help("Only show the first N categories"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("export")
                .about("Export aggregates")
                .subcommand_required(true)
                .subcommand(
                    Command::new("months")
                        .arg(file_arg())
                        .args(cash_args(false))
                        .arg(as_of_arg())
                        .arg(format_arg())
                        .arg(out_arg()),
                )
                .subcommand(
                    Command::new("categories")
                        .arg(file_arg())
                        .arg(as_of_arg())
                        .arg(format_arg())
                        .arg(out_arg()),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("List rows that would be skipped and why")
                .arg(file_arg())
                .arg(as_of_arg()),
        )
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_name("FORMAT")
        .default_value("csv")
        .help("csv|json")
}

fn out_arg() -> Arg {
    Arg::new("out")
        .long("out")
        .value_name("PATH")
        .required(true)
}
