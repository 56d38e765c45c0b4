// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::metrics::top_categories;
use crate::models::{CategoryShare, MonthAmount, MonthBucket, Report};
use crate::utils::{fmt_amount, fmt_money, load_report, pretty_table};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use std::fmt::Write;

pub const RECENT_MONTHS: usize = 6;
pub const TOP_CATEGORIES: usize = 5;

pub fn handle(sub: &clap::ArgMatches) -> Result<()> {
    let report = load_report(sub)?;
    let doc = report_json(&report);

    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print!("{}", render_text(&report)?);
    }

    if let Some(out) = sub.get_one::<String>("out") {
        std::fs::write(out, serde_json::to_string_pretty(&doc)?)
            .with_context(|| format!("Failed to write JSON to {}", out))?;
        if !sub.get_flag("json") {
            println!("\nJSON report written to {}", out);
        }
    }
    Ok(())
}

fn money(d: Decimal) -> f64 {
    d.round_dp(2).to_f64().unwrap_or(0.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn month_of(m: &Option<MonthAmount>) -> Value {
    m.as_ref().map_or(Value::Null, |m| json!(m.month))
}

fn amount_of(m: &Option<MonthAmount>) -> Value {
    m.as_ref().map_or(Value::Null, |m| json!(money(m.amount)))
}

fn recent(report: &Report) -> &[MonthBucket] {
    let start = report.months.len().saturating_sub(RECENT_MONTHS);
    &report.months[start..]
}

pub fn report_json(report: &Report) -> Value {
    let s = &report.summary;
    let m = &report.metrics;

    let recent_months: Vec<Value> = recent(report)
        .iter()
        .map(|b| {
            json!({
                "month": b.month,
                "inflow": money(b.inflow),
                "outflow": money(b.outflow),
                "net": money(b.net()),
            })
        })
        .collect();
    let categories = |shares: Vec<CategoryShare>| -> Vec<Value> {
        shares
            .into_iter()
            .map(|c| {
                json!({
                    "category": c.name,
                    "total": money(c.total),
                    "count": c.count,
                    "share_pct": round2(c.share_pct),
                })
            })
            .collect()
    };
    let outflow_top = categories(top_categories(
        &report.outflow_categories,
        TOP_CATEGORIES,
        s.total_outflow,
    ));
    let inflow_top = categories(top_categories(
        &report.inflow_categories,
        TOP_CATEGORIES,
        s.total_inflow,
    ));
    let balances: Vec<Value> = report
        .balances
        .iter()
        .map(|b| json!({"month": b.month, "net": money(b.net), "balance": money(b.balance)}))
        .collect();

    let cash_flow = json!({
        "ending_balance": money(s.ending_balance),
        "min_balance": amount_of(&s.min_balance),
        "min_balance_month": month_of(&s.min_balance),
        "depletion_month": s.depletion.as_ref().map(|d| d.month.clone()),
        "depletion_balance": s.depletion.as_ref().map(|d| money(d.balance)),
        "depletion_month_index": s.depletion.as_ref().map(|d| d.month_index),
        "balances": balances,
    });
    let peaks = json!({
        "inflow_month": month_of(&s.peak_inflow),
        "inflow": amount_of(&s.peak_inflow),
        "outflow_month": month_of(&s.peak_outflow),
        "outflow": amount_of(&s.peak_outflow),
    });
    let net_extremes = json!({
        "best_month": month_of(&s.best_net),
        "best_net": amount_of(&s.best_net),
        "worst_month": month_of(&s.worst_net),
        "worst_net": amount_of(&s.worst_net),
    });
    let deficit_streak = json!({
        "longest_months": s.deficit_streak.longest_months,
        "longest_start": s.deficit_streak.longest_start,
        "longest_end": s.deficit_streak.longest_end,
        "current_months": s.deficit_streak.current_months,
    });
    let net_swing = json!({
        "largest_abs": s.net_swing.as_ref().map(|w| money(w.change.abs())),
        "change": s.net_swing.as_ref().map(|w| money(w.change)),
        "from_month": s.net_swing.as_ref().map(|w| w.from_month.clone()),
        "to_month": s.net_swing.as_ref().map(|w| w.to_month.clone()),
    });
    let trend = json!({
        "recent_average_net": round2(m.trend.recent_avg),
        "recent_months": m.trend.recent_months,
        "prior_average_net": round2(m.trend.prior_avg),
        "prior_months": m.trend.prior_months,
        "delta": round2(m.trend.delta),
    });

    json!({
        "records": report.record_count,
        "months": report.months.len(),
        "skipped": report.skipped_count,
        "as_of": report.as_of.clone().unwrap_or_default(),
        "window_months": m.window_months,
        "totals": {
            "inflow": money(s.total_inflow),
            "outflow": money(s.total_outflow),
            "net": money(s.net),
            "restricted_outflow": money(s.restricted_outflow),
        },
        "cash": {
            "starting": money(s.starting_cash),
            "reserved": money(s.reserved_cash),
            "available": money(s.available_cash),
        },
        "burn": {
            "average_monthly": round2(m.avg_burn),
            "months_used": m.burn_months,
            "estimated_runway_months": m.runway_months.map(round2),
        },
        "net": {
            "average_monthly": round2(m.avg_net),
            "months_used": m.months_used,
            "volatility": round2(m.net_volatility),
        },
        "averages": {
            "inflow": round2(m.avg_inflow),
            "outflow": round2(m.avg_outflow),
            "outflow_coverage_months": m.outflow_coverage.map(round2),
        },
        "runway_risk": m.risk_level.label(),
        "trend": trend,
        "cash_flow": cash_flow,
        "peaks": peaks,
        "net_extremes": net_extremes,
        "deficit_months": s.deficit_months,
        "deficit_streak": deficit_streak,
        "net_swing": net_swing,
        "recent_months": recent_months,
        "top_categories": outflow_top,
        "top_inflow_sources": inflow_top,
    })
}

pub fn render_text(report: &Report) -> Result<String> {
    let s = &report.summary;
    let m = &report.metrics;
    let mut out = String::new();

    writeln!(out, "Funding Runway")?;
    writeln!(
        out,
        "Records: {} | Months: {} | Skipped: {}",
        report.record_count,
        report.months.len(),
        report.skipped_count
    )?;
    writeln!(
        out,
        "Totals: Inflow {} | Outflow {} | Net {}",
        fmt_money(&s.total_inflow),
        fmt_money(&s.total_outflow),
        fmt_money(&s.net)
    )?;
    writeln!(
        out,
        "Starting cash: {} | Reserved cash: {} | Available: {}",
        fmt_money(&s.starting_cash),
        fmt_money(&s.reserved_cash),
        fmt_money(&s.available_cash)
    )?;
    match m.runway_months {
        Some(runway) => {
            writeln!(
                out,
                "Average monthly burn (negative net): {} across {} months",
                fmt_amount(m.avg_burn),
                m.burn_months
            )?;
            writeln!(
                out,
                "Average monthly net: {} across {} months",
                fmt_amount(m.avg_net),
                m.months_used
            )?;
            writeln!(
                out,
                "Estimated runway: {:.1} months ({})",
                runway,
                m.risk_level.label()
            )?;
        }
        None => {
            writeln!(out, "Average monthly burn: $0.00 (no negative net months)")?;
            writeln!(
                out,
                "Average monthly net: {} across {} months",
                fmt_amount(m.avg_net),
                m.months_used
            )?;
            writeln!(out, "Estimated runway: Not at risk based on current net flow")?;
        }
    }
    writeln!(out, "Net volatility: {}", fmt_amount(m.net_volatility))?;
    if let Some(coverage) = m.outflow_coverage {
        writeln!(out, "Outflow coverage: {:.1} months", coverage)?;
    }
    if m.trend.prior_months == 0 {
        writeln!(out, "Trend: insufficient history")?;
    } else {
        writeln!(
            out,
            "Trend: recent avg net {} vs prior {} (delta {})",
            fmt_amount(m.trend.recent_avg),
            fmt_amount(m.trend.prior_avg),
            fmt_amount(m.trend.delta)
        )?;
    }
    if s.restricted_outflow > Decimal::ZERO {
        writeln!(
            out,
            "Restricted outflow total: {}",
            fmt_money(&s.restricted_outflow)
        )?;
    }
    if let Some(d) = &s.depletion {
        writeln!(
            out,
            "Cash depleted in {} (balance {})",
            d.month,
            fmt_money(&d.balance)
        )?;
    }
    if s.deficit_streak.longest_months > 0 {
        writeln!(
            out,
            "Longest deficit streak: {} months",
            s.deficit_streak.longest_months
        )?;
    }

    if !report.months.is_empty() {
        let rows = recent(report)
            .iter()
            .map(|b| {
                vec![
                    b.month.clone(),
                    fmt_money(&b.inflow),
                    fmt_money(&b.outflow),
                    fmt_money(&b.net()),
                ]
            })
            .collect();
        writeln!(out, "\nRecent months:")?;
        writeln!(out, "{}", pretty_table(&["Month", "In", "Out", "Net"], rows))?;
    }

    let top = top_categories(&report.outflow_categories, TOP_CATEGORIES, s.total_outflow);
    if !top.is_empty() {
        let rows = top
            .into_iter()
            .map(|c| {
                vec![
                    c.name,
                    fmt_money(&c.total),
                    c.count.to_string(),
                    format!("{:.1}%", c.share_pct),
                ]
            })
            .collect();
        writeln!(out, "\nTop outflow categories:")?;
        writeln!(
            out,
            "{}",
            pretty_table(&["Category", "Outflow", "Items", "Share"], rows)
        )?;
    }
    Ok(out)
}
