// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Read-only device telemetry.
//
// Queries fail soft: an uninitialised device or an SDK error yields `None`
// (or 0.0 for mileage) and a log line. Clearing the mileage mutates the
// device and therefore reports its failures.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use posprint_core::error::{PosError, Result};
use posprint_core::types::{PrinterStatus, VersionInfo};

use crate::device::PosDevice;

/// Serial numbers the SDK returns in place of a real one.
fn is_placeholder_serial(sn: &str) -> bool {
    let sn = sn.trim();
    sn.is_empty() || sn.eq_ignore_ascii_case("unknown") || sn.starts_with("Error:")
}

#[derive(Clone)]
pub struct StatusAccessor {
    device: Arc<PosDevice>,
}

impl StatusAccessor {
    pub fn new(device: Arc<PosDevice>) -> Self {
        Self { device }
    }

    #[instrument(skip(self))]
    pub fn query_printer_status(&self) -> Option<PrinterStatus> {
        let printer = self.device.printer().ok()?;
        match printer.printer_status() {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(error = %e, "printer status unavailable");
                None
            }
        }
    }

    /// Paper used, in millimetres. 0.0 when the value cannot be read; use
    /// [`try_query_printer_mileage`](Self::try_query_printer_mileage) to
    /// tell the cases apart.
    pub fn query_printer_mileage(&self) -> f64 {
        self.try_query_printer_mileage().unwrap_or_else(|e| {
            debug!(error = %e, "mileage unavailable, reporting 0");
            0.0
        })
    }

    pub fn try_query_printer_mileage(&self) -> Result<f64> {
        self.device.printer()?.printer_mileage()
    }

    #[instrument(skip(self))]
    pub fn clear_printer_mileage(&self) -> Result<()> {
        match self.device.printer()?.clear_printer_mileage()? {
            0 => {
                info!("printer mileage cleared");
                Ok(())
            }
            code => Err(PosError::Sdk {
                operation: "Clear printer mileage",
                code,
            }),
        }
    }

    pub fn query_version_info(&self) -> Option<VersionInfo> {
        let device = self.device.device().ok()?;
        device
            .version_info()
            .inspect_err(|e| warn!(error = %e, "version info unavailable"))
            .ok()
    }

    pub fn query_device_serial_number(&self) -> Option<String> {
        let device = self.device.device().ok()?;
        match device.device_sn() {
            Ok(sn) if is_placeholder_serial(&sn) => {
                debug!(sn = %sn, "device reported no usable serial number");
                None
            }
            Ok(sn) => Some(sn),
            Err(e) => {
                warn!(error = %e, "serial number unavailable");
                None
            }
        }
    }
}
