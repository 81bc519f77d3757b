// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the vendor POS SDK.
//
// The traits follow the shape of the vendor's own API: a process-wide SDK
// object that is initialised once through a listener, then hands out a
// printer and a device handle. Printing completes through another listener.
// Nothing here re-models the callbacks; `posprint-print` does that.

use std::sync::Arc;

use posprint_core::error::Result;
use posprint_core::types::{
    Alignment, BarcodeType, Bitmap, FontSelection, PrintOptions, PrinterStatus, TextInfo,
    VersionInfo,
};

/// Receives the outcome of `PosSdk::init_pos_sdk`.
pub trait InitListener: Send + Sync {
    fn on_init_success(&self);

    fn on_init_fail(&self, error_code: i32);
}

/// Receives notifications for one `NativePrinter::start_printing` call.
///
/// A well-behaved SDK calls exactly one of `on_finish` / `on_error`, but
/// implementations must not rely on it.
pub trait PrinterListener: Send + Sync {
    fn on_error(&self, error_code: i32);

    fn on_finish(&self);

    /// Reserved progress channel. Carries no caller-visible meaning.
    fn on_report(&self, event: i32);
}

/// Entry point of the vendor SDK.
pub trait PosSdk: Send + Sync {
    /// Human-readable SDK / platform name (e.g. "WisePOS 2.1", "Simulated").
    fn platform_name(&self) -> &str;

    /// Start the initialization handshake. The listener may be called from
    /// any thread, before or after this method returns.
    fn init_pos_sdk(&self, listener: Arc<dyn InitListener>);

    /// Printer handle. `None` until the handshake has succeeded.
    fn printer(&self) -> Option<Arc<dyn NativePrinter>>;

    /// Device-information handle. `None` until the handshake has succeeded.
    fn device(&self) -> Option<Arc<dyn NativeDevice>>;
}

/// The thermal printer. Methods returning `i32` forward the SDK's result
/// code unchanged (0 is success).
pub trait NativePrinter: Send + Sync {
    fn printer_status(&self) -> Result<PrinterStatus>;

    /// Cumulative paper usage, in millimetres.
    fn printer_mileage(&self) -> Result<f64>;

    fn clear_printer_mileage(&self) -> Result<i32>;

    /// Reset printer settings and the SDK's content buffer.
    fn init_printer(&self) -> Result<i32>;

    fn set_gray_level(&self, level: i32) -> Result<i32>;

    fn set_print_font(&self, font: &FontSelection) -> Result<()>;

    fn set_line_spacing(&self, spacing: i32) -> Result<()>;

    fn add_single_text(&self, info: &TextInfo) -> Result<()>;

    fn add_multi_text(&self, infos: &[TextInfo]) -> Result<()>;

    fn add_picture(&self, align: Alignment, bitmap: &Bitmap) -> Result<()>;

    fn add_bar_code(&self, kind: BarcodeType, width: u32, height: u32, data: &str) -> Result<()>;

    fn add_qr_code(&self, width: u32, height: u32, data: &str) -> Result<()>;

    fn feed_paper(&self, dots: u32) -> Result<()>;

    /// Print everything buffered so far. Completion is reported to `listener`.
    fn start_printing(&self, options: &PrintOptions, listener: Arc<dyn PrinterListener>)
    -> Result<()>;
}

/// Terminal identity and firmware information.
pub trait NativeDevice: Send + Sync {
    fn version_info(&self) -> Result<VersionInfo>;

    fn device_sn(&self) -> Result<String>;
}
