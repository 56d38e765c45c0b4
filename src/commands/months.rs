// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{MonthBalance, Report};
use crate::utils::{fmt_money, load_report, maybe_print_json, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(sub: &clap::ArgMatches) -> Result<()> {
    let report = load_report(sub)?;
    let data = month_rows(&report);
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.month.clone(),
                    fmt_money(&r.inflow),
                    fmt_money(&r.outflow),
                    fmt_money(&r.net),
                    fmt_money(&r.balance),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Inflow", "Outflow", "Net", "Balance"], rows)
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct MonthRow {
    pub month: String,
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub net: Decimal,
    pub balance: Decimal,
}

/// Sorted months joined with their running balance.
pub fn month_rows(report: &Report) -> Vec<MonthRow> {
    report
        .months
        .iter()
        .zip(&report.balances)
        .map(|(m, MonthBalance { net, balance, .. })| MonthRow {
            month: m.month.clone(),
            inflow: m.inflow,
            outflow: m.outflow,
            net: *net,
            balance: *balance,
        })
        .collect()
}
