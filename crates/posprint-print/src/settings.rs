// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer-wide settings applied directly to the device: reset, print
// density, font and line spacing. Arguments are range-checked before the
// device is consulted.

use std::sync::Arc;

use tracing::{info, instrument};

use posprint_core::error::{PosError, Result};
use posprint_core::requests::FontConfig;
use posprint_core::types::FontSelection;

use crate::device::PosDevice;

pub const MIN_GRAY_LEVEL: i32 = 1;
pub const MAX_GRAY_LEVEL: i32 = 5;
pub const MAX_LINE_SPACING: i32 = 32;

/// Resolve a font config to exactly one font source.
pub fn prepare_font(config: &FontConfig) -> Result<FontSelection> {
    let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);
    let sources = [
        non_empty(&config.font).map(FontSelection::Named),
        non_empty(&config.system_font).map(FontSelection::System),
        non_empty(&config.path).map(FontSelection::Path),
    ];
    let mut chosen = sources.into_iter().flatten();
    match (chosen.next(), chosen.next()) {
        (Some(font), None) => Ok(font),
        (None, _) => Err(PosError::validation(
            "One of font, systemFont or path is required",
        )),
        (Some(_), Some(_)) => Err(PosError::validation(
            "Only one of font, systemFont or path may be given",
        )),
    }
}

pub fn check_gray_level(level: i32) -> Result<()> {
    if (MIN_GRAY_LEVEL..=MAX_GRAY_LEVEL).contains(&level) {
        Ok(())
    } else {
        Err(PosError::validation("Gray level must be between 1 and 5"))
    }
}

pub fn check_line_spacing(spacing: i32) -> Result<()> {
    if (0..=MAX_LINE_SPACING).contains(&spacing) {
        Ok(())
    } else {
        Err(PosError::validation("Line spacing must be between 0 and 32"))
    }
}

/// Settings operations against the shared device.
#[derive(Clone)]
pub struct PrinterSettings {
    device: Arc<PosDevice>,
}

impl PrinterSettings {
    pub fn new(device: Arc<PosDevice>) -> Self {
        Self { device }
    }

    /// Reset printer settings and the SDK-side content buffer.
    #[instrument(skip(self))]
    pub fn init_printer(&self) -> Result<()> {
        let printer = self.device.printer()?;
        match printer.init_printer()? {
            0 => {
                info!("printer reset");
                Ok(())
            }
            code => Err(PosError::Sdk {
                operation: "Init printer",
                code,
            }),
        }
    }

    #[instrument(skip(self))]
    pub fn set_gray_level(&self, level: i32) -> Result<()> {
        check_gray_level(level)?;
        let printer = self.device.printer()?;
        match printer.set_gray_level(level)? {
            0 => Ok(()),
            code => Err(PosError::Sdk {
                operation: "Set gray level",
                code,
            }),
        }
    }

    #[instrument(skip(self, config))]
    pub fn set_print_font(&self, config: &FontConfig) -> Result<()> {
        let font = prepare_font(config)?;
        let printer = self.device.printer()?;
        printer.set_print_font(&font)?;
        info!(source = font.bundle_key(), font = font.value(), "print font set");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn set_line_spacing(&self, spacing: i32) -> Result<()> {
        check_line_spacing(spacing)?;
        self.device.printer()?.set_line_spacing(spacing)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use posprint_bridge::simulated::{SdkCall, SimScript, SimulatedSdk};

    use super::*;

    async fn ready(script: SimScript) -> (SimulatedSdk, PrinterSettings) {
        let sdk = SimulatedSdk::with_script(script);
        let device = Arc::new(PosDevice::new(
            Arc::new(sdk.clone()),
            Duration::from_secs(1),
        ));
        device.initialize().await.expect("init");
        (sdk, PrinterSettings::new(device))
    }

    #[test]
    fn font_needs_exactly_one_source() {
        let none = FontConfig::default();
        assert!(prepare_font(&none).is_err());

        let two = FontConfig {
            font: Some("mono".into()),
            path: Some("/fonts/a.ttf".into()),
            ..Default::default()
        };
        assert!(prepare_font(&two).is_err());

        let empty_plus_one = FontConfig {
            font: Some(String::new()),
            system_font: Some("DroidSans".into()),
            ..Default::default()
        };
        assert_eq!(
            prepare_font(&empty_plus_one).expect("one source"),
            FontSelection::System("DroidSans".into())
        );
    }

    #[test]
    fn ranges_are_inclusive() {
        assert!(check_gray_level(0).is_err());
        assert!(check_gray_level(1).is_ok());
        assert!(check_gray_level(5).is_ok());
        assert!(check_gray_level(6).is_err());
        assert!(check_line_spacing(-1).is_err());
        assert!(check_line_spacing(0).is_ok());
        assert!(check_line_spacing(32).is_ok());
        assert!(check_line_spacing(33).is_err());
    }

    #[tokio::test]
    async fn settings_require_ready_device() {
        let sdk = SimulatedSdk::new();
        let device = Arc::new(PosDevice::new(Arc::new(sdk), Duration::from_secs(1)));
        let settings = PrinterSettings::new(device);
        assert!(matches!(
            settings.init_printer(),
            Err(PosError::NotInitialized(_))
        ));
        assert!(matches!(
            settings.set_line_spacing(4),
            Err(PosError::NotInitialized(_))
        ));
        // Range errors win over readiness.
        assert!(matches!(
            settings.set_gray_level(9),
            Err(PosError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn init_printer_surfaces_code() {
        let (_sdk, settings) = ready(SimScript {
            init_printer_code: 3,
            ..Default::default()
        })
        .await;
        let err = settings.init_printer().expect_err("non-zero code");
        assert_eq!(err.to_string(), "Init printer failed with code: 3");
    }

    #[tokio::test]
    async fn settings_reach_the_sdk() {
        let (sdk, settings) = ready(SimScript::default()).await;
        settings.init_printer().expect("init");
        settings.set_gray_level(3).expect("gray");
        settings.set_line_spacing(8).expect("spacing");
        settings
            .set_print_font(&FontConfig {
                path: Some("/sdcard/font.ttf".into()),
                ..Default::default()
            })
            .expect("font");

        let calls = sdk.calls();
        assert_eq!(
            &calls[1..],
            &[
                SdkCall::InitPrinter,
                SdkCall::SetGrayLevel(3),
                SdkCall::SetLineSpacing(8),
                SdkCall::SetFont(FontSelection::Path("/sdcard/font.ttf".into())),
            ]
        );
    }
}
