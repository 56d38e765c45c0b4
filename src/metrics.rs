// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runway metrics over sorted month buckets.

use crate::engine::LedgerOptions;
use crate::models::{
    CashFlowSummary, CategoryBucket, CategoryShare, DeficitStreak, Depletion, Metrics,
    MonthAmount, MonthBalance, MonthBucket, NetSwing, RiskLevel, Trend,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub const TREND_SLICE: usize = 3;

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation; 0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Trailing window of months. 0 or an oversized window means all months.
pub fn window(months: &[MonthBucket], window_months: usize) -> &[MonthBucket] {
    if window_months > 0 && months.len() > window_months {
        &months[months.len() - window_months..]
    } else {
        months
    }
}

pub fn risk_level(runway_months: Option<f64>) -> RiskLevel {
    match runway_months {
        None => RiskLevel::NotAtRisk,
        Some(r) if r < 3.0 => RiskLevel::Critical,
        Some(r) if r < 6.0 => RiskLevel::High,
        Some(r) if r < 12.0 => RiskLevel::Moderate,
        Some(_) => RiskLevel::Stable,
    }
}

/// Recent three months against the three before them.
pub fn trend(months: &[MonthBucket]) -> Trend {
    let recent_start = months.len().saturating_sub(TREND_SLICE);
    let prior_start = recent_start.saturating_sub(TREND_SLICE);
    let nets = |slice: &[MonthBucket]| -> Vec<f64> {
        slice.iter().map(|m| to_f64(m.net())).collect()
    };

    let recent = nets(&months[recent_start..]);
    let prior = nets(&months[prior_start..recent_start]);
    let recent_avg = mean(&recent);
    let prior_avg = mean(&prior);
    Trend {
        recent_avg,
        recent_months: recent.len(),
        prior_avg,
        prior_months: prior.len(),
        delta: recent_avg - prior_avg,
    }
}

pub fn compute_metrics(
    months: &[MonthBucket],
    window_months: usize,
    available_cash: Decimal,
) -> Metrics {
    let used = window(months, window_months);
    let nets: Vec<f64> = used.iter().map(|m| to_f64(m.net())).collect();
    let burns: Vec<f64> = nets.iter().filter(|n| **n < 0.0).map(|n| -n).collect();
    let inflows: Vec<f64> = used.iter().map(|m| to_f64(m.inflow)).collect();
    let outflows: Vec<f64> = used.iter().map(|m| to_f64(m.outflow)).collect();

    let available = to_f64(available_cash);
    let avg_burn = mean(&burns);
    let avg_outflow = mean(&outflows);
    let runway_months = (avg_burn > 0.0).then(|| available / avg_burn);

    Metrics {
        window_months,
        months_used: used.len(),
        avg_burn,
        burn_months: burns.len(),
        avg_net: mean(&nets),
        avg_inflow: mean(&inflows),
        avg_outflow,
        net_volatility: population_std_dev(&nets),
        runway_months,
        outflow_coverage: (avg_outflow > 0.0).then(|| available / avg_outflow),
        risk_level: risk_level(runway_months),
        trend: trend(months),
    }
}

fn month_amount(month: &MonthBucket, amount: Decimal) -> Option<MonthAmount> {
    Some(MonthAmount {
        month: month.month.clone(),
        amount,
    })
}

/// One forward pass over sorted months: running balance, extremes, streaks.
pub fn summarize(
    months: &[MonthBucket],
    options: &LedgerOptions,
    total_inflow: Decimal,
    total_outflow: Decimal,
    restricted_outflow: Decimal,
) -> (CashFlowSummary, Vec<MonthBalance>) {
    let available_cash = options.available_cash();
    let mut balance = available_cash;
    let mut balances = Vec::with_capacity(months.len());

    let mut min_balance: Option<MonthAmount> = None;
    let mut peak_inflow: Option<MonthAmount> = None;
    let mut peak_outflow: Option<MonthAmount> = None;
    let mut best_net: Option<MonthAmount> = None;
    let mut worst_net: Option<MonthAmount> = None;
    let mut depletion: Option<Depletion> = None;
    let mut streak = DeficitStreak::default();
    let mut net_swing: Option<NetSwing> = None;
    let mut deficit_months = 0;
    let mut prev_net: Option<Decimal> = None;

    for (i, m) in months.iter().enumerate() {
        let net = m.net();
        // saturate at the Decimal bounds rather than abort the report
        balance = balance.saturating_add(net);
        balances.push(MonthBalance {
            month: m.month.clone(),
            net,
            balance,
        });

        if min_balance.as_ref().is_none_or(|b| balance < b.amount) {
            min_balance = month_amount(m, balance);
        }
        if peak_inflow.as_ref().is_none_or(|b| m.inflow > b.amount) {
            peak_inflow = month_amount(m, m.inflow);
        }
        if peak_outflow.as_ref().is_none_or(|b| m.outflow > b.amount) {
            peak_outflow = month_amount(m, m.outflow);
        }
        if best_net.as_ref().is_none_or(|b| net > b.amount) {
            best_net = month_amount(m, net);
        }
        if worst_net.as_ref().is_none_or(|b| net < b.amount) {
            worst_net = month_amount(m, net);
        }
        if depletion.is_none() && balance < Decimal::ZERO {
            depletion = Some(Depletion {
                month: m.month.clone(),
                balance,
                month_index: i,
            });
        }

        if net < Decimal::ZERO {
            deficit_months += 1;
            streak.current_months += 1;
            if streak.current_months > streak.longest_months {
                streak.longest_months = streak.current_months;
                streak.longest_start = Some(months[i + 1 - streak.current_months].month.clone());
                streak.longest_end = Some(m.month.clone());
            }
        } else {
            streak.current_months = 0;
        }

        if let Some(prev) = prev_net {
            let change = net.saturating_sub(prev);
            if net_swing.as_ref().is_none_or(|s| change.abs() > s.change.abs()) {
                net_swing = Some(NetSwing {
                    from_month: months[i - 1].month.clone(),
                    to_month: m.month.clone(),
                    change,
                });
            }
        }
        prev_net = Some(net);
    }

    let summary = CashFlowSummary {
        total_inflow,
        total_outflow,
        net: total_inflow - total_outflow,
        restricted_outflow,
        starting_cash: options.starting_cash,
        reserved_cash: options.reserved_cash,
        available_cash,
        ending_balance: balance,
        min_balance,
        peak_inflow,
        peak_outflow,
        best_net,
        worst_net,
        deficit_months,
        depletion,
        deficit_streak: streak,
        net_swing,
    };
    (summary, balances)
}

/// Share of total outflow, in percent.
pub fn category_share(total: Decimal, total_outflow: Decimal) -> f64 {
    if total_outflow.is_zero() {
        0.0
    } else {
        to_f64(total) / to_f64(total_outflow) * 100.0
    }
}

/// The first `limit` categories with their share of `total_outflow`.
pub fn top_categories(
    categories: &[CategoryBucket],
    limit: usize,
    total_outflow: Decimal,
) -> Vec<CategoryShare> {
    categories
        .iter()
        .take(limit)
        .map(|c| CategoryShare {
            name: c.name.clone(),
            total: c.total,
            count: c.count,
            share_pct: category_share(c.total, total_outflow),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn month(key: &str, inflow: &str, outflow: &str) -> MonthBucket {
        MonthBucket {
            month: key.to_string(),
            inflow: dec(inflow),
            outflow: dec(outflow),
        }
    }

    fn series(nets: &[i64]) -> Vec<MonthBucket> {
        nets.iter()
            .enumerate()
            .map(|(i, n)| {
                let key = format!("2024-{:02}", i + 1);
                if *n >= 0 {
                    month(&key, &n.to_string(), "0")
                } else {
                    month(&key, "0", &(-n).to_string())
                }
            })
            .collect()
    }

    #[test]
    fn risk_boundaries() {
        assert_eq!(risk_level(Some(2.99)), RiskLevel::Critical);
        assert_eq!(risk_level(Some(3.0)), RiskLevel::High);
        assert_eq!(risk_level(Some(5.99)), RiskLevel::High);
        assert_eq!(risk_level(Some(6.0)), RiskLevel::Moderate);
        assert_eq!(risk_level(Some(12.0)), RiskLevel::Stable);
        assert_eq!(risk_level(None), RiskLevel::NotAtRisk);
    }

    #[test]
    fn runway_three_months_is_high() {
        let months = series(&[-1000]);
        let m = compute_metrics(&months, 0, dec("3000"));
        assert_eq!(m.avg_burn, 1000.0);
        assert_eq!(m.runway_months, Some(3.0));
        assert_eq!(m.risk_level, RiskLevel::High);
    }

    #[test]
    fn no_burn_is_not_at_risk() {
        let months = series(&[100, 0, 50]);
        let m = compute_metrics(&months, 0, dec("10"));
        assert_eq!(m.avg_burn, 0.0);
        assert_eq!(m.burn_months, 0);
        assert_eq!(m.runway_months, None);
        assert_eq!(m.risk_level, RiskLevel::NotAtRisk);
        assert_eq!(m.outflow_coverage, None);
    }

    #[test]
    fn window_clamps_to_all_months() {
        let months = series(&[1, 2, 3]);
        assert_eq!(window(&months, 0).len(), 3);
        assert_eq!(window(&months, 3).len(), 3);
        assert_eq!(window(&months, 10).len(), 3);
        assert_eq!(window(&months, 2)[0].month, "2024-02");
    }

    #[test]
    fn windowed_averages_and_volatility() {
        let months = series(&[-900, 200, -400, 0]);
        let m = compute_metrics(&months, 3, dec("1200"));
        assert_eq!(m.months_used, 3);
        assert_eq!(m.burn_months, 1);
        assert_eq!(m.avg_burn, 400.0);
        assert_eq!(m.runway_months, Some(3.0));
        assert!((m.avg_net - (-200.0 / 3.0)).abs() < 1e-9);
        // nets 200, -400, 0 around mean -66.67
        let expected = ((266.666_666_666_666_7f64.powi(2)
            + 333.333_333_333_333_3f64.powi(2)
            + 66.666_666_666_666_67f64.powi(2))
            / 3.0)
            .sqrt();
        assert!((m.net_volatility - expected).abs() < 1e-6);
        assert!((m.avg_outflow - 400.0 / 3.0).abs() < 1e-9);
        assert!((m.outflow_coverage.unwrap() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn volatility_of_empty_window_is_zero() {
        let m = compute_metrics(&[], 0, dec("100"));
        assert_eq!(m.net_volatility, 0.0);
        assert_eq!(m.avg_net, 0.0);
        assert_eq!(m.months_used, 0);
    }

    #[test]
    fn trend_compares_recent_to_prior() {
        let t = trend(&series(&[5, 10, 20, 30, -10, -20, 60]));
        assert_eq!(t.recent_months, 3);
        assert_eq!(t.prior_months, 3);
        assert!((t.recent_avg - 10.0).abs() < 1e-9);
        assert!((t.prior_avg - 20.0).abs() < 1e-9);
        assert!((t.delta + 10.0).abs() < 1e-9);
    }

    #[test]
    fn trend_clamps_short_history() {
        let t = trend(&series(&[10, 20]));
        assert_eq!(t.recent_months, 2);
        assert_eq!(t.prior_months, 0);
        assert_eq!(t.prior_avg, 0.0);
        assert!((t.delta - 15.0).abs() < 1e-9);

        let t = trend(&series(&[1, 2, 3, 4]));
        assert_eq!(t.prior_months, 1);
    }

    #[test]
    fn summary_tracks_balance_and_extremes() {
        let months = vec![
            month("2024-01", "500", "800"),
            month("2024-02", "900", "300"),
            month("2024-03", "100", "1200"),
            month("2024-04", "0", "200"),
        ];
        let options = LedgerOptions {
            starting_cash: dec("1500"),
            reserved_cash: dec("500"),
            ..LedgerOptions::default()
        };
        let (s, balances) = summarize(&months, &options, dec("1500"), dec("2500"), dec("0"));

        let running: Vec<Decimal> = balances.iter().map(|b| b.balance).collect();
        assert_eq!(running, [dec("700"), dec("1300"), dec("200"), dec("0")]);
        assert_eq!(s.available_cash, dec("1000"));
        assert_eq!(s.ending_balance, s.available_cash + s.net);
        assert_eq!(s.min_balance.unwrap().month, "2024-04");
        assert_eq!(s.peak_inflow.unwrap().month, "2024-02");
        assert_eq!(s.peak_outflow.unwrap().amount, dec("1200"));
        assert_eq!(s.best_net.unwrap().amount, dec("600"));
        assert_eq!(s.worst_net.unwrap().month, "2024-03");
        assert_eq!(s.deficit_months, 3);
        assert_eq!(s.depletion, None);
        assert_eq!(s.deficit_streak.longest_months, 2);
        assert_eq!(s.deficit_streak.longest_start.as_deref(), Some("2024-03"));
        assert_eq!(s.deficit_streak.longest_end.as_deref(), Some("2024-04"));
        assert_eq!(s.deficit_streak.current_months, 2);
        let swing = s.net_swing.unwrap();
        assert_eq!(swing.from_month, "2024-02");
        assert_eq!(swing.to_month, "2024-03");
        assert_eq!(swing.change, dec("-1700"));
    }

    #[test]
    fn depletion_and_negative_balances() {
        let months = series(&[-400, -400, 100]);
        let options = LedgerOptions {
            starting_cash: dec("500"),
            reserved_cash: dec("900"),
            ..LedgerOptions::default()
        };
        let (s, balances) = summarize(&months, &options, dec("100"), dec("800"), dec("0"));
        assert_eq!(s.available_cash, Decimal::ZERO);
        assert_eq!(balances[1].balance, dec("-800"));
        let d = s.depletion.unwrap();
        assert_eq!(d.month, "2024-01");
        assert_eq!(d.month_index, 0);
        assert_eq!(d.balance, dec("-400"));
        assert_eq!(s.ending_balance, dec("-700"));
    }

    #[test]
    fn shares_follow_totals() {
        let cats = vec![
            CategoryBucket {
                name: "A".into(),
                total: dec("600"),
                count: 2,
            },
            CategoryBucket {
                name: "B".into(),
                total: dec("300"),
                count: 1,
            },
            CategoryBucket {
                name: "C".into(),
                total: dec("100"),
                count: 1,
            },
        ];
        let top = top_categories(&cats, 2, dec("1000"));
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].share_pct, 600.0 / 1000.0 * 100.0);
        assert!(top.iter().map(|c| c.share_pct).sum::<f64>() <= 100.0);
        assert_eq!(category_share(dec("5"), Decimal::ZERO), 0.0);
    }

    #[test]
    fn balance_saturates_at_decimal_bounds() {
        let months = vec![
            MonthBucket {
                month: "2024-01".to_string(),
                inflow: Decimal::MAX,
                outflow: Decimal::ZERO,
            },
            MonthBucket {
                month: "2024-02".to_string(),
                inflow: Decimal::ZERO,
                outflow: Decimal::MAX,
            },
        ];
        let options = LedgerOptions {
            starting_cash: Decimal::MAX,
            reserved_cash: Decimal::MIN,
            ..LedgerOptions::default()
        };
        let (s, balances) = summarize(&months, &options, Decimal::MAX, Decimal::MAX, Decimal::ZERO);
        assert_eq!(s.available_cash, Decimal::MAX);
        assert_eq!(balances[0].balance, Decimal::MAX);
        assert_eq!(balances[1].balance, Decimal::ZERO);
        assert_eq!(s.net_swing.unwrap().change, Decimal::MIN);
    }
}
