// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod amount;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod engine;
pub mod error;
pub mod fields;
pub mod header;
pub mod metrics;
pub mod models;
pub mod utils;

pub use engine::{Ledger, LedgerOptions, analyze};
pub use error::{RunwayError, RunwayResult};
pub use models::Report;
