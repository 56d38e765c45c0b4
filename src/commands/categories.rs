// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::metrics::top_categories;
use crate::models::{CategoryShare, Report};
use crate::utils::{fmt_money, load_report, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(sub: &clap::ArgMatches) -> Result<()> {
    let report = load_report(sub)?;
    let inflow = sub.get_flag("inflow");
    let limit = sub.get_one::<usize>("limit").copied();
    let data = category_rows(&report, inflow, limit);

    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    fmt_money(&c.total),
                    c.count.to_string(),
                    format!("{:.1}%", c.share_pct),
                ]
            })
            .collect();
        let hdr = if inflow { "Inflow" } else { "Outflow" };
        println!(
            "{}",
            pretty_table(&["Category", hdr, "Items", "Share"], rows)
        );
    }
    Ok(())
}

/// Categories in report order with their share of the matching total.
pub fn category_rows(report: &Report, inflow: bool, limit: Option<usize>) -> Vec<CategoryShare> {
    let (buckets, total) = if inflow {
        (&report.inflow_categories, report.summary.total_inflow)
    } else {
        (&report.outflow_categories, report.summary.total_outflow)
    };
    top_categories(buckets, limit.unwrap_or(buckets.len()), total)
}
