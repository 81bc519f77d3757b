// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Alignment;

/// What to do when a job is submitted while another is still printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// Fail the second submission with `PosError::Busy`.
    #[default]
    Reject,
    /// Hold the second submission until the printer is free.
    Queue,
}

/// Defaults applied by the receipt composite to items that omit them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptDefaults {
    pub align: Alignment,
    pub font_size: i32,
}

impl Default for ReceiptDefaults {
    fn default() -> Self {
        Self {
            align: Alignment::Left,
            font_size: 24,
        }
    }
}

/// Persistent bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Upper bound on waiting for the printer's finish/error signal.
    pub submit_timeout_secs: u64,
    /// Upper bound on the SDK initialization handshake.
    pub init_timeout_secs: u64,
    pub busy_policy: BusyPolicy,
    pub receipt: ReceiptDefaults,
}

impl BridgeConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout_secs)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            submit_timeout_secs: 60,
            init_timeout_secs: 30,
            busy_policy: BusyPolicy::Reject,
            receipt: ReceiptDefaults::default(),
        }
    }
}
