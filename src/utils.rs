// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount::parse_amount;
use crate::engine::{LedgerOptions, analyze};
use crate::error::{RunwayError, RunwayResult};
use crate::models::Report;
use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::fs;
use tracing::warn;

pub fn parse_month(s: &str) -> RunwayResult<String> {
    let s = s.trim();
    let valid = s.len() == 7
        && chrono::NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").is_ok();
    if !valid {
        return Err(RunwayError::InvalidOption(format!(
            "Invalid month '{}', expected YYYY-MM",
            s
        )));
    }
    Ok(s.to_string())
}

/// Money options accept the same notation as ledger amounts.
pub fn parse_money(name: &str, s: &str) -> RunwayResult<Decimal> {
    parse_amount(s)
        .map_err(|_| RunwayError::InvalidOption(format!("Invalid {} amount '{}'", name, s)))
}

pub fn fmt_money(d: &Decimal) -> String {
    let rounded = d.round_dp(2);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${:.2}", rounded.abs())
    }
}

/// Dollar amount for f64 averages, signed the same way as `fmt_money`.
pub fn fmt_amount(v: f64) -> String {
    let cents = format!("{:.2}", v.abs());
    if v < 0.0 && cents != "0.00" {
        format!("-${}", cents)
    } else {
        format!("${}", cents)
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

/// Invalid UTF-8 is replaced per character so one bad cell stays in its row.
pub fn read_ledger(path: &str) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to open file: {}", path))?;
    let text = String::from_utf8_lossy(&bytes);
    if matches!(text, Cow::Owned(_)) {
        warn!(path, "ledger is not valid UTF-8; replaced invalid bytes");
    }
    Ok(text.into_owned())
}

/// Collect run options from a subcommand's matches. Absent args use defaults.
pub fn ledger_options(sub: &clap::ArgMatches) -> Result<LedgerOptions> {
    let mut options = LedgerOptions::default();
    if let Ok(Some(raw)) = sub.try_get_one::<String>("starting_cash") {
        options.starting_cash = parse_money("starting cash", raw)?;
    }
    if let Ok(Some(raw)) = sub.try_get_one::<String>("reserved_cash") {
        options.reserved_cash = parse_money("reserved cash", raw)?;
    }
    if let Ok(Some(window)) = sub.try_get_one::<usize>("window") {
        options.window_months = *window;
    }
    if let Ok(Some(raw)) = sub.try_get_one::<String>("as_of") {
        options.as_of = Some(parse_month(raw)?);
    }
    Ok(options)
}

/// Read the `--file` ledger and run it with the subcommand's options.
pub fn load_report(sub: &clap::ArgMatches) -> Result<Report> {
    let path = sub
        .get_one::<String>("file")
        .context("--file is required")?
        .trim();
    let options = ledger_options(sub)?;
    let text = read_ledger(path)?;
    let report = analyze(text.lines(), options).with_context(|| format!("Read {}", path))?;
    Ok(report)
}
