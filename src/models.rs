// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inflow,
    Outflow,
}

/// One accepted ledger row, reduced to what aggregation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub month: String, // YYYY-MM
    pub amount: Decimal,
    pub direction: Direction,
    pub category: String,
    pub restricted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: String, // YYYY-MM
    pub inflow: Decimal,
    pub outflow: Decimal,
}

impl MonthBucket {
    pub fn new(month: &str) -> Self {
        Self {
            month: month.to_string(),
            inflow: Decimal::ZERO,
            outflow: Decimal::ZERO,
        }
    }

    pub fn net(&self) -> Decimal {
        self.inflow - self.outflow
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBucket {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
}

impl CategoryBucket {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total: Decimal::ZERO,
            count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBalance {
    pub month: String,
    pub net: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TooFewFields,
    InvalidAmount,
    AmountOutOfRange,
    InvalidDate,
    AfterCutoff,
}

impl SkipReason {
    pub fn describe(self) -> &'static str {
        match self {
            SkipReason::TooFewFields => "too few fields",
            SkipReason::InvalidAmount => "invalid amount",
            SkipReason::AmountOutOfRange => "amount out of range",
            SkipReason::InvalidDate => "missing or short date",
            SkipReason::AfterCutoff => "after as-of month",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: usize, // 1-based, header is line 1
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Critical,
    High,
    Moderate,
    Stable,
    NotAtRisk,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Critical => "critical",
            RiskLevel::High => "high",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Stable => "stable",
            RiskLevel::NotAtRisk => "not_at_risk",
        }
    }
}

/// A month paired with an amount, used for extremes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthAmount {
    pub month: String,
    pub amount: Decimal,
}

/// Totals and extremes from the forward pass over sorted months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowSummary {
    pub total_inflow: Decimal,
    pub total_outflow: Decimal,
    pub net: Decimal,
    pub restricted_outflow: Decimal,
    pub starting_cash: Decimal,
    pub reserved_cash: Decimal,
    pub available_cash: Decimal,
    pub ending_balance: Decimal,
    pub min_balance: Option<MonthAmount>,
    pub peak_inflow: Option<MonthAmount>,
    pub peak_outflow: Option<MonthAmount>,
    pub best_net: Option<MonthAmount>,
    pub worst_net: Option<MonthAmount>,
    pub deficit_months: usize,
    pub depletion: Option<Depletion>,
    pub deficit_streak: DeficitStreak,
    pub net_swing: Option<NetSwing>,
}

/// First month the running balance drops below zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Depletion {
    pub month: String,
    pub balance: Decimal,
    pub month_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeficitStreak {
    pub longest_months: usize,
    pub longest_start: Option<String>,
    pub longest_end: Option<String>,
    pub current_months: usize,
}

/// Largest month-over-month change in net.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetSwing {
    pub from_month: String,
    pub to_month: String,
    pub change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub window_months: usize,
    pub months_used: usize,
    pub avg_burn: f64,
    pub burn_months: usize,
    pub avg_net: f64,
    pub avg_inflow: f64,
    pub avg_outflow: f64,
    pub net_volatility: f64,
    /// `None` when there is no burn, i.e. not at risk.
    pub runway_months: Option<f64>,
    pub outflow_coverage: Option<f64>,
    pub risk_level: RiskLevel,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub recent_avg: f64,
    pub recent_months: usize,
    pub prior_avg: f64,
    pub prior_months: usize,
    pub delta: f64,
}

/// Everything a run produces. Owned by the caller once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub as_of: Option<String>,
    pub record_count: usize,
    pub skipped_count: usize,
    pub skipped: Vec<SkippedRow>,
    pub months: Vec<MonthBucket>,
    pub outflow_categories: Vec<CategoryBucket>,
    pub inflow_categories: Vec<CategoryBucket>,
    pub balances: Vec<MonthBalance>,
    pub summary: CashFlowSummary,
    pub metrics: Metrics,
}
