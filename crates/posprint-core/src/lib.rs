// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// posprint — Core types, configuration and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod requests;
pub mod types;

pub use config::{BridgeConfig, BusyPolicy};
pub use error::PosError;
pub use requests::*;
pub use types::*;
