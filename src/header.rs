// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{RunwayError, RunwayResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Date,
    Amount,
    Type,
    Category,
    Restricted,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Date => "date",
            Role::Amount => "amount",
            Role::Type => "type",
            Role::Category => "category",
            Role::Restricted => "restricted",
        }
    }
}

static SYNONYMS: Lazy<HashMap<&'static str, Role>> = Lazy::new(|| {
    let table: [(&[&str], Role); 5] = [
        (&["date", "transactiondate", "txn", "txndate"], Role::Date),
        (&["amount", "value", "net"], Role::Amount),
        (&["type", "direction", "flow"], Role::Type),
        (&["category", "memo", "bucket"], Role::Category),
        (
            &["restricted", "restrictedflag", "restrictedfunds"],
            Role::Restricted,
        ),
    ];
    table
        .iter()
        .flat_map(|(keys, role)| keys.iter().map(move |k| (*k, *role)))
        .collect()
});

/// Lower-case a header cell and strip spaces, underscores and hyphens.
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn role_for(raw: &str) -> Option<Role> {
    SYNONYMS.get(normalize_key(raw).as_str()).copied()
}

/// Column positions of each semantic role in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub amount: usize,
    pub kind: usize,
    pub category: usize,
    pub restricted: Option<usize>,
}

impl ColumnMap {
    /// Resolve the header row. The first column matching a role wins.
    pub fn resolve(header: &[String]) -> RunwayResult<Self> {
        let mut found: HashMap<Role, usize> = HashMap::new();
        for (idx, cell) in header.iter().enumerate() {
            if let Some(role) = role_for(cell) {
                found.entry(role).or_insert(idx);
            }
        }

        let missing: Vec<&'static str> = [Role::Date, Role::Amount, Role::Type, Role::Category]
            .into_iter()
            .filter(|r| !found.contains_key(r))
            .map(Role::name)
            .collect();
        if !missing.is_empty() {
            return Err(RunwayError::MissingHeader { missing });
        }

        Ok(Self {
            date: found[&Role::Date],
            amount: found[&Role::Amount],
            kind: found[&Role::Type],
            category: found[&Role::Category],
            restricted: found.get(&Role::Restricted).copied(),
        })
    }

    /// Highest of the date and amount positions; shorter rows are unusable.
    pub fn required_width(&self) -> usize {
        self.date.max(self.amount) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalizes_separators_and_case() {
        assert_eq!(normalize_key("Transaction Date"), "transactiondate");
        assert_eq!(normalize_key("Restricted_Funds"), "restrictedfunds");
        assert_eq!(normalize_key("txn-date"), "txndate");
    }

    #[test]
    fn resolves_synonyms_in_any_order() {
        let map = ColumnMap::resolve(&cells(&["Memo", "Flow", "Value", "Txn Date"])).unwrap();
        assert_eq!(
            map,
            ColumnMap {
                date: 3,
                amount: 2,
                kind: 1,
                category: 0,
                restricted: None,
            }
        );
        assert_eq!(map.required_width(), 4);
    }

    #[test]
    fn optional_restricted_column() {
        let map =
            ColumnMap::resolve(&cells(&["date", "amount", "type", "category", "Restricted Flag"]))
                .unwrap();
        assert_eq!(map.restricted, Some(4));
    }

    #[test]
    fn duplicate_synonym_keeps_first() {
        let map =
            ColumnMap::resolve(&cells(&["date", "amount", "net", "type", "category"])).unwrap();
        assert_eq!(map.amount, 1);
    }

    #[test]
    fn reports_every_missing_role() {
        let err = ColumnMap::resolve(&cells(&["date", "amount", "payee"])).unwrap_err();
        match err {
            RunwayError::MissingHeader { missing } => assert_eq!(missing, ["type", "category"]),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
