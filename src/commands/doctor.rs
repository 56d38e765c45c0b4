// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{LedgerOptions, analyze};
use crate::utils::{ledger_options, pretty_table, read_ledger};
use anyhow::{Context, Result};

pub fn handle(sub: &clap::ArgMatches) -> Result<()> {
    let path = sub
        .get_one::<String>("file")
        .context("--file is required")?
        .trim();
    let text = read_ledger(path)?;
    let rows = diagnose(&text, ledger_options(sub)?);

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Line", "Issue"], rows));
    }
    Ok(())
}

/// One row per problem: a missing header, or each skipped data line.
pub fn diagnose(text: &str, options: LedgerOptions) -> Vec<Vec<String>> {
    match analyze(text.lines(), options) {
        Ok(report) => report
            .skipped
            .iter()
            .map(|s| vec![s.line.to_string(), s.reason.describe().to_string()])
            .collect(),
        Err(err) if err.is_missing_header() => vec![vec!["1".to_string(), err.to_string()]],
        Err(err) => vec![vec!["-".to_string(), err.to_string()]],
    }
}
