// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    /// No digit before the numeric part ended.
    NoDigits,
    /// Digits that do not fit in a `Decimal`.
    OutOfRange,
}

/// Normalize a free-form money token into a signed amount.
///
/// Accepts accounting notation `($1,234.56)`, currency prefixes and plain
/// `-12.5`. A `(` or `-` anywhere marks the value negative.
pub fn parse_amount(raw: &str) -> Result<Decimal, AmountError> {
    let mut digits = String::with_capacity(raw.len());
    let mut negative = false;
    let mut saw_digit = false;
    let mut saw_point = false;
    let mut closed = false;

    for c in raw.chars() {
        match c {
            '(' | '-' => negative = true,
            ')' | '+' | '$' | ',' => {}
            c if c.is_whitespace() => {}
            '.' if !closed => {
                if saw_point {
                    // a second point ends the number
                    closed = true;
                } else {
                    saw_point = true;
                    digits.push('.');
                }
            }
            c if c.is_ascii_digit() && !closed => {
                saw_digit = true;
                digits.push(c);
            }
            _ => {}
        }
    }

    if !saw_digit {
        return Err(AmountError::NoDigits);
    }
    if digits.starts_with('.') {
        digits.insert(0, '0');
    }
    if digits.ends_with('.') {
        digits.pop();
    }

    let value = Decimal::from_str(&digits).map_err(|_| AmountError::OutOfRange)?;
    Ok(if negative { -value } else { value })
}

/// `yes`, `y`, `true` and `1` (any case) mark a restricted outflow.
pub fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}
