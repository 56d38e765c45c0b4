// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures that abort a runway computation before any report is produced.
///
/// Row-level problems never surface here; they are counted as skipped rows.
#[derive(Error, Debug)]
pub enum RunwayError {
    #[error("Missing required headers: {}. Need date, amount, type, category", missing.join(", "))]
    MissingHeader { missing: Vec<&'static str> },

    #[error("Failed to grow {0} table")]
    Capacity(&'static str),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl RunwayError {
    pub fn is_missing_header(&self) -> bool {
        matches!(self, Self::MissingHeader { .. })
    }
}

pub type RunwayResult<T> = Result<T, RunwayError>;
