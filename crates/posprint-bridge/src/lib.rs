// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! posprint — Vendor POS SDK boundary.
//!
//! This crate defines the traits the vendor SDK binding implements and a
//! simulated SDK used on desktop/CI builds. Higher-level code never talks to
//! the vendor API directly; it receives an `Arc<dyn PosSdk>`.

pub mod simulated;
pub mod traits;

use std::sync::Arc;

pub use simulated::SimulatedSdk;
pub use traits::{InitListener, NativeDevice, NativePrinter, PosSdk, PrinterListener};

/// Retrieves the SDK implementation for the current build.
///
/// Terminal builds register their vendor binding with
/// `PosSession::with_sdk`; everything else gets the simulator.
pub fn platform_sdk() -> Arc<dyn PosSdk> {
    tracing::debug!("using simulated POS SDK");
    Arc::new(SimulatedSdk::new())
}
