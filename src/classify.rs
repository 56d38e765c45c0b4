// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::amount::{AmountError, is_truthy, parse_amount};
use crate::header::ColumnMap;
use crate::models::{Direction, SkipReason, Transaction, UNCATEGORIZED};
use rust_decimal::Decimal;

const INFLOW_TYPES: [&str; 5] = ["inflow", "income", "credit", "grant", "deposit"];
const OUTFLOW_TYPES: [&str; 5] = ["outflow", "expense", "debit", "spend", "withdrawal"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Inflow(Decimal),
    Outflow(Decimal),
}

impl Flow {
    pub fn direction(self) -> Direction {
        match self {
            Flow::Inflow(_) => Direction::Inflow,
            Flow::Outflow(_) => Direction::Outflow,
        }
    }

    pub fn amount(self) -> Decimal {
        match self {
            Flow::Inflow(a) | Flow::Outflow(a) => a,
        }
    }
}

/// Decide the direction of a row. Unknown type tokens fall back to the sign.
pub fn classify(amount: Decimal, type_token: &str) -> Flow {
    let token = type_token.trim().to_lowercase();
    if INFLOW_TYPES.contains(&token.as_str()) {
        Flow::Inflow(amount)
    } else if OUTFLOW_TYPES.contains(&token.as_str()) {
        Flow::Outflow(amount)
    } else if amount.is_sign_negative() && !amount.is_zero() {
        Flow::Outflow(-amount)
    } else {
        Flow::Inflow(amount)
    }
}

/// Turn one parsed data row into a transaction, or the reason it was skipped.
pub fn read_row(
    fields: &[String],
    columns: &ColumnMap,
    as_of: Option<&str>,
) -> Result<Transaction, SkipReason> {
    if fields.len() < columns.required_width() {
        return Err(SkipReason::TooFewFields);
    }

    let amount = parse_amount(&fields[columns.amount]).map_err(|err| match err {
        AmountError::NoDigits => SkipReason::InvalidAmount,
        AmountError::OutOfRange => SkipReason::AmountOutOfRange,
    })?;

    let date = &fields[columns.date];
    if date.chars().count() < 7 {
        return Err(SkipReason::InvalidDate);
    }
    let month: String = date.chars().take(7).collect();

    if as_of.is_some_and(|cutoff| month.as_str() > cutoff) {
        return Err(SkipReason::AfterCutoff);
    }

    let field = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or("");
    let flow = classify(amount, field(columns.kind));

    let category = match field(columns.category) {
        "" => UNCATEGORIZED.to_string(),
        name => name.to_string(),
    };
    let restricted = flow.direction() == Direction::Outflow
        && columns.restricted.is_some_and(|idx| is_truthy(field(idx)));

    Ok(Transaction {
        month,
        amount: flow.amount(),
        direction: flow.direction(),
        category,
        restricted,
    })
}
