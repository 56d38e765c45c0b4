// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Single-pass aggregation of ledger lines into month and category buckets.

use crate::classify::read_row;
use crate::error::{RunwayError, RunwayResult};
use crate::fields::{MAX_FIELDS, split_fields};
use crate::header::ColumnMap;
use crate::metrics::{compute_metrics, summarize};
use crate::models::{
    CategoryBucket, Direction, MonthBucket, Report, SkipReason, SkippedRow, Transaction,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, hash_map::Entry};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerOptions {
    pub starting_cash: Decimal,
    pub reserved_cash: Decimal,
    /// 0 means every month.
    pub window_months: usize,
    /// Inclusive YYYY-MM cutoff.
    pub as_of: Option<String>,
}

impl LedgerOptions {
    pub fn available_cash(&self) -> Decimal {
        self.starting_cash
            .saturating_sub(self.reserved_cash)
            .max(Decimal::ZERO)
    }
}

/// Keyed buckets that remember first-seen order.
#[derive(Debug)]
struct Tally<T> {
    label: &'static str,
    index: HashMap<String, usize>,
    items: Vec<T>,
}

impl<T> Tally<T> {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            index: HashMap::new(),
            items: Vec::new(),
        }
    }

    fn upsert(&mut self, key: &str, make: impl FnOnce(&str) -> T) -> RunwayResult<&mut T> {
        let idx = match self.index.entry(key.to_string()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                self.items
                    .try_reserve(1)
                    .map_err(|_| RunwayError::Capacity(self.label))?;
                self.items.push(make(key));
                *entry.insert(self.items.len() - 1)
            }
        };
        Ok(&mut self.items[idx])
    }

    fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&idx| &self.items[idx])
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Aggregation state for one run. Build it from the header line, feed it
/// data lines, then call [`Ledger::finish`].
#[derive(Debug)]
pub struct Ledger {
    columns: ColumnMap,
    options: LedgerOptions,
    months: Tally<MonthBucket>,
    outflow_categories: Tally<CategoryBucket>,
    inflow_categories: Tally<CategoryBucket>,
    total_inflow: Decimal,
    total_outflow: Decimal,
    restricted_outflow: Decimal,
    record_count: usize,
    skipped: Vec<SkippedRow>,
    lines_seen: usize,
}

impl Ledger {
    pub fn from_header(header_line: &str, options: LedgerOptions) -> RunwayResult<Self> {
        let header = split_fields(header_line, MAX_FIELDS);
        let columns = ColumnMap::resolve(&header)?;
        debug!(?columns, "resolved ledger header");
        Ok(Self {
            columns,
            options,
            months: Tally::new("months"),
            outflow_categories: Tally::new("outflow categories"),
            inflow_categories: Tally::new("inflow categories"),
            total_inflow: Decimal::ZERO,
            total_outflow: Decimal::ZERO,
            restricted_outflow: Decimal::ZERO,
            record_count: 0,
            skipped: Vec::new(),
            lines_seen: 1,
        })
    }

    /// Parse and aggregate one data line. Bad rows are skipped, not errors.
    pub fn ingest_line(&mut self, line: &str) -> RunwayResult<Option<SkipReason>> {
        self.lines_seen += 1;
        let fields = split_fields(line, MAX_FIELDS);
        let row = read_row(&fields, &self.columns, self.options.as_of.as_deref())
            .and_then(|tx| self.check_range(&tx).map(|()| tx));
        match row {
            Ok(tx) => {
                self.record(tx)?;
                Ok(None)
            }
            Err(reason) => {
                debug!(line = self.lines_seen, reason = reason.describe(), "skipping row");
                self.skipped.push(SkippedRow {
                    line: self.lines_seen,
                    reason,
                });
                Ok(Some(reason))
            }
        }
    }

    /// Reject a row that would push any running sum outside `Decimal` range.
    fn check_range(&self, tx: &Transaction) -> Result<(), SkipReason> {
        let add = |sum: Decimal| {
            sum.checked_add(tx.amount)
                .ok_or(SkipReason::AmountOutOfRange)
        };
        let (mut inflow, mut outflow) = self
            .months
            .get(&tx.month)
            .map_or((Decimal::ZERO, Decimal::ZERO), |m| (m.inflow, m.outflow));
        let (mut total_inflow, mut total_outflow) = (self.total_inflow, self.total_outflow);
        let categories = match tx.direction {
            Direction::Inflow => {
                inflow = add(inflow)?;
                total_inflow = add(total_inflow)?;
                &self.inflow_categories
            }
            Direction::Outflow => {
                outflow = add(outflow)?;
                total_outflow = add(total_outflow)?;
                if tx.restricted {
                    add(self.restricted_outflow)?;
                }
                &self.outflow_categories
            }
        };
        if let Some(category) = categories.get(&tx.category) {
            add(category.total)?;
        }
        // month and overall net must stay representable too
        inflow
            .checked_sub(outflow)
            .and_then(|_| total_inflow.checked_sub(total_outflow))
            .map(|_| ())
            .ok_or(SkipReason::AmountOutOfRange)
    }

    fn record(&mut self, tx: Transaction) -> RunwayResult<()> {
        let bucket = self.months.upsert(&tx.month, MonthBucket::new)?;
        let categories = match tx.direction {
            Direction::Inflow => {
                bucket.inflow += tx.amount;
                self.total_inflow += tx.amount;
                &mut self.inflow_categories
            }
            Direction::Outflow => {
                bucket.outflow += tx.amount;
                self.total_outflow += tx.amount;
                if tx.restricted {
                    self.restricted_outflow += tx.amount;
                }
                &mut self.outflow_categories
            }
        };
        let category = categories.upsert(&tx.category, CategoryBucket::new)?;
        category.total += tx.amount;
        category.count += 1;
        self.record_count += 1;
        Ok(())
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Sort the buckets and derive balances and metrics.
    pub fn finish(self) -> Report {
        let mut months = self.months.into_items();
        months.sort_by(|a, b| a.month.cmp(&b.month));

        let mut outflow_categories = self.outflow_categories.into_items();
        outflow_categories.sort_by(|a, b| b.total.cmp(&a.total));
        let mut inflow_categories = self.inflow_categories.into_items();
        inflow_categories.sort_by(|a, b| b.total.cmp(&a.total));

        let (summary, balances) = summarize(
            &months,
            &self.options,
            self.total_inflow,
            self.total_outflow,
            self.restricted_outflow,
        );
        let metrics = compute_metrics(&months, self.options.window_months, summary.available_cash);

        info!(
            records = self.record_count,
            skipped = self.skipped.len(),
            months = months.len(),
            "ledger aggregated"
        );
        if !self.skipped.is_empty() {
            warn!("{} rows skipped", self.skipped.len());
        }

        Report {
            as_of: self.options.as_of,
            record_count: self.record_count,
            skipped_count: self.skipped.len(),
            skipped: self.skipped,
            months,
            outflow_categories,
            inflow_categories,
            balances,
            summary,
            metrics,
        }
    }
}

/// Run a whole ledger: the first line is the header, the rest are data rows.
pub fn analyze<I, S>(lines: I, options: LedgerOptions) -> RunwayResult<Report>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter();
    let header = lines.next().ok_or_else(|| RunwayError::MissingHeader {
        missing: vec!["date", "amount", "type", "category"],
    })?;
    let mut ledger = Ledger::from_header(header.as_ref(), options)?;
    for line in lines {
        ledger.ingest_line(line.as_ref())?;
    }
    Ok(ledger.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn opts(starting: &str) -> LedgerOptions {
        LedgerOptions {
            starting_cash: dec(starting),
            ..LedgerOptions::default()
        }
    }

    const HEADER: &str = "date,amount,type,category,restricted";

    #[test]
    fn two_month_scenario() {
        let lines = [
            HEADER,
            "2024-01-05,5000,grant,Foundation,no",
            "2024-01-20,6000,expense,Payroll,no",
            "2024-02-05,5000,grant,Foundation,no",
            "2024-02-20,4000,expense,Payroll,no",
        ];
        let report = analyze(lines, opts("10000")).unwrap();
        assert_eq!(report.summary.total_inflow, dec("10000"));
        assert_eq!(report.summary.total_outflow, dec("10000"));
        assert_eq!(report.summary.net, Decimal::ZERO);
        assert_eq!(report.metrics.avg_burn, 1000.0);
        assert_eq!(report.metrics.runway_months, Some(10.0));
        assert_eq!(report.metrics.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn counts_every_data_line() {
        let lines = [
            HEADER,
            "2024-01-05,100,income,Gifts,",
            "",
            "2024-01-06,abc,expense,Rent,",
            "2024,50,expense,Rent,",
            "2024-01-07,(25),,Rent,",
        ];
        let report = analyze(lines, opts("0")).unwrap();
        assert_eq!(report.record_count, 2);
        assert_eq!(report.skipped_count, 3);
        assert_eq!(report.record_count + report.skipped_count, lines.len() - 1);
        assert_eq!(
            report.skipped,
            vec![
                SkippedRow {
                    line: 3,
                    reason: SkipReason::TooFewFields,
                },
                SkippedRow {
                    line: 4,
                    reason: SkipReason::InvalidAmount,
                },
                SkippedRow {
                    line: 5,
                    reason: SkipReason::InvalidDate,
                },
            ]
        );
    }

    #[test]
    fn totals_are_order_independent() {
        let rows = [
            "2024-03-01,10.10,expense,A,",
            "2024-01-01,20.20,income,B,",
            "2024-02-01,30.30,expense,A,",
            "2024-01-15,-5.05,,C,",
        ];
        let forward: Vec<&str> = std::iter::once(HEADER).chain(rows).collect();
        let backward: Vec<&str> = std::iter::once(HEADER).chain(rows.into_iter().rev()).collect();
        let a = analyze(forward, opts("0")).unwrap();
        let b = analyze(backward, opts("0")).unwrap();
        assert_eq!(a.months, b.months);
        assert_eq!(a.summary.total_outflow, dec("45.45"));
        let month_outflow: Decimal = a.months.iter().map(|m| m.outflow).sum();
        let month_inflow: Decimal = a.months.iter().map(|m| m.inflow).sum();
        assert_eq!(month_outflow, a.summary.total_outflow);
        assert_eq!(month_inflow, a.summary.total_inflow);
        let keys: Vec<&str> = a.months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, ["2024-01", "2024-02", "2024-03"]);
    }

    #[test]
    fn categories_sort_descending_with_stable_ties() {
        let lines = [
            HEADER,
            "2024-01-01,100,expense,Rent,",
            "2024-01-02,100,expense,Travel,",
            "2024-01-03,300,expense,Payroll,",
            "2024-01-04,50,expense,,",
            "2024-01-05,900,grant,Foundation,",
            "2024-01-06,5,expense,Rent,",
        ];
        let report = analyze(lines, opts("0")).unwrap();
        let names: Vec<&str> = report
            .outflow_categories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["Payroll", "Rent", "Travel", "Uncategorized"]);
        assert_eq!(report.outflow_categories[1].count, 2);
        assert_eq!(report.inflow_categories.len(), 1);
        assert_eq!(report.inflow_categories[0].total, dec("900"));
    }

    #[test]
    fn restricted_outflow_tracked_separately() {
        let lines = [
            HEADER,
            "2024-01-01,100,expense,Program,yes",
            "2024-01-02,40,expense,Program,no",
        ];
        let report = analyze(lines, opts("1000")).unwrap();
        assert_eq!(report.summary.restricted_outflow, dec("100"));
        assert_eq!(report.summary.available_cash, dec("1000"));
    }

    #[test]
    fn as_of_cutoff_is_inclusive() {
        let options = LedgerOptions {
            as_of: Some("2024-02".to_string()),
            ..opts("0")
        };
        let lines = [
            HEADER,
            "2024-02-28,10,expense,A,",
            "2024-03-01,10,expense,A,",
        ];
        let report = analyze(lines, options).unwrap();
        assert_eq!(report.record_count, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::AfterCutoff);
        assert_eq!(report.as_of.as_deref(), Some("2024-02"));
    }

    #[test]
    fn missing_header_aborts() {
        let err = analyze(["date,amount,category", "2024-01-01,1,x"], opts("0")).unwrap_err();
        assert!(err.is_missing_header());
        let empty: [&str; 0] = [];
        assert!(analyze(empty, opts("0")).unwrap_err().is_missing_header());
    }

    #[test]
    fn incremental_ingest_reports_skips() {
        let mut ledger = Ledger::from_header(HEADER, opts("0")).unwrap();
        assert_eq!(ledger.ingest_line("2024-01-01,5,income,A,").unwrap(), None);
        assert_eq!(
            ledger.ingest_line("bad").unwrap(),
            Some(SkipReason::TooFewFields)
        );
        assert_eq!(ledger.record_count(), 1);
        assert_eq!(ledger.skipped_count(), 1);
    }

    #[test]
    fn oversized_amounts_are_skipped_not_summed() {
        let lines = [
            HEADER,
            "2024-01-01,50000000000000000000000000000,grant,A,",
            "2024-01-02,50000000000000000000000000000,grant,A,",
            "2024-01-03,123456789012345678901234567890,expense,B,",
            "2024-01-04,10,expense,B,",
        ];
        let report = analyze(lines, opts("0")).unwrap();
        assert_eq!(report.record_count, 2);
        assert_eq!(
            report.skipped,
            vec![
                SkippedRow {
                    line: 3,
                    reason: SkipReason::AmountOutOfRange,
                },
                SkippedRow {
                    line: 4,
                    reason: SkipReason::AmountOutOfRange,
                },
            ]
        );
        assert_eq!(
            report.summary.total_inflow,
            dec("50000000000000000000000000000")
        );
        assert_eq!(report.summary.total_outflow, dec("10"));
    }

    #[test]
    fn overflowing_row_leaves_buckets_untouched() {
        let lines = [
            HEADER,
            "2024-01-01,70000000000000000000000000000,expense,A,",
            "2024-02-01,-10000000000000000000000000000,expense,A,",
            "2024-03-01,30000000000000000000000000000,expense,A,",
        ];
        let report = analyze(lines, opts("0")).unwrap();
        assert_eq!(report.record_count, 2);
        assert_eq!(report.skipped[0].reason, SkipReason::AmountOutOfRange);
        assert_eq!(report.months.len(), 2);
        assert_eq!(
            report.outflow_categories[0].total,
            dec("60000000000000000000000000000")
        );
        assert_eq!(report.outflow_categories[0].count, 2);
    }
}
