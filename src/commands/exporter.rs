// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::categories::category_rows;
use crate::commands::months::month_rows;
use crate::utils::load_report;
use anyhow::{Result, anyhow};
use serde_json::json;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("months", sub)) => export_months(sub),
        Some(("categories", sub)) => export_categories(sub),
        _ => Ok(()),
    }
}

fn output_format(sub: &clap::ArgMatches) -> Result<String> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "csv".to_string());
    match fmt.as_str() {
        "csv" | "json" => Ok(fmt),
        _ => Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
}

fn out_path(sub: &clap::ArgMatches) -> Result<&str> {
    sub.get_one::<String>("out")
        .map(|s| s.trim())
        .ok_or_else(|| anyhow!("--out is required"))
}

fn export_months(sub: &clap::ArgMatches) -> Result<()> {
    let fmt = output_format(sub)?;
    let out = out_path(sub)?;
    let rows = month_rows(&load_report(sub)?);

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["month", "inflow", "outflow", "net", "balance"])?;
            for r in &rows {
                wtr.write_record([
                    r.month.clone(),
                    format!("{:.2}", r.inflow),
                    format!("{:.2}", r.outflow),
                    format!("{:.2}", r.net),
                    format!("{:.2}", r.balance),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = rows
                .iter()
                .map(|r| {
                    json!({
                        "month": r.month,
                        "inflow": format!("{:.2}", r.inflow),
                        "outflow": format!("{:.2}", r.outflow),
                        "net": format!("{:.2}", r.net),
                        "balance": format!("{:.2}", r.balance),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    println!("Exported {} months to {}", rows.len(), out);
    Ok(())
}

fn export_categories(sub: &clap::ArgMatches) -> Result<()> {
    let fmt = output_format(sub)?;
    let out = out_path(sub)?;
    let report = load_report(sub)?;
    let outflow = category_rows(&report, false, None);
    let inflow = category_rows(&report, true, None);

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["direction", "category", "total", "count", "share_pct"])?;
            for (direction, rows) in [("outflow", &outflow), ("inflow", &inflow)] {
                for c in rows {
                    wtr.write_record([
                        direction.to_string(),
                        c.name.clone(),
                        format!("{:.2}", c.total),
                        c.count.to_string(),
                        format!("{:.2}", c.share_pct),
                    ])?;
                }
            }
            wtr.flush()?;
        }
        _ => {
            let doc = json!({ "outflow": outflow, "inflow": inflow });
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
        }
    }
    println!(
        "Exported {} categories to {}",
        outflow.len() + inflow.len(),
        out
    );
    Ok(())
}
