// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Simulated SDK for desktop/CI builds where no POS terminal is attached.
//
// The simulator records every call it receives, keeps a content buffer the
// way the vendor SDK does, and delivers scripted init/print outcomes. Scripts
// can also hold a listener back so a test decides when (and how often) the
// signal fires.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use posprint_core::error::{PosError, Result};
use posprint_core::types::{
    Alignment, BarcodeType, Bitmap, FontSelection, PrintOptions, PrinterStatus, StatusValue,
    TextInfo, VersionInfo,
};
use tracing::{debug, info, warn};

use crate::traits::*;

/// Paper advanced per dot, in millimetres (203 dpi head).
const MM_PER_DOT: f64 = 0.125;

/// Line height used for text without an explicit font size.
const DEFAULT_TEXT_DOTS: u32 = 24;

/// How the simulated handshake ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitScript {
    Succeed,
    Fail(i32),
    /// Keep the listener; fire it later with [`SimulatedSdk::complete_init`].
    Hold,
}

/// How a simulated print run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintScript {
    Finish,
    Fail(i32),
    /// One progress report, then finish.
    ReportThenFinish(i32),
    /// Finish, then a spurious error and a second finish.
    FinishTwice,
    /// Keep the listener; fire it later with the `pending_*` methods.
    Hold,
}

/// Every SDK call the simulator has seen, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkCall {
    InitSdk,
    InitPrinter,
    SetGrayLevel(i32),
    SetFont(FontSelection),
    SetLineSpacing(i32),
    AddText(TextInfo),
    AddMultiText(Vec<TextInfo>),
    AddPicture { align: Alignment, width: u32, height: u32 },
    AddBarCode { kind: BarcodeType, width: u32, height: u32, data: String },
    AddQrCode { width: u32, height: u32, data: String },
    Feed(u32),
    StartPrinting(PrintOptions),
    ClearMileage,
}

/// Scripted behaviour of the simulator.
#[derive(Debug, Clone)]
pub struct SimScript {
    pub init: InitScript,
    pub print: PrintScript,
    /// Result code returned by `init_printer`.
    pub init_printer_code: i32,
    /// Result code returned by `set_gray_level`.
    pub gray_level_code: i32,
    /// Result code returned by `clear_printer_mileage`.
    pub clear_mileage_code: i32,
    /// Make status and mileage queries fail.
    pub telemetry_fails: bool,
    /// Reject content once this many pieces have been buffered.
    pub content_limit: Option<usize>,
    pub serial_number: String,
    pub version_info: VersionInfo,
}

impl Default for SimScript {
    fn default() -> Self {
        let version_info = [
            ("sdkVersion", "2.1.0-sim"),
            ("firmwareVersion", "SIM-FW-1.0"),
            ("hardwareVersion", "SIM-HW-A"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        Self {
            init: InitScript::Succeed,
            print: PrintScript::Finish,
            init_printer_code: 0,
            gray_level_code: 0,
            clear_mileage_code: 0,
            telemetry_fails: false,
            content_limit: None,
            serial_number: "SIM0000000001".into(),
            version_info,
        }
    }
}

#[derive(Default)]
struct SimState {
    script: SimScript,
    calls: Vec<SdkCall>,
    /// Paper length, in dots, of the content buffered since the last run.
    buffered_dots: u32,
    /// Content calls accepted under the current script.
    buffered_calls: usize,
    mileage_mm: f64,
    ready: bool,
    printing: bool,
    held_init: Option<Arc<dyn InitListener>>,
    held_print: Option<(Arc<dyn PrinterListener>, u32)>,
}

/// In-process stand-in for the vendor SDK. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct SimulatedSdk {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedSdk {
    pub fn new() -> Self {
        Self::with_script(SimScript::default())
    }

    pub fn with_script(script: SimScript) -> Self {
        let state = SimState {
            script,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the script (affects subsequent calls only).
    pub fn set_script(&self, script: SimScript) {
        let mut state = self.state();
        state.script = script;
        state.buffered_calls = 0;
    }

    /// Snapshot of every call received so far.
    pub fn calls(&self) -> Vec<SdkCall> {
        self.state().calls.clone()
    }

    /// Whether `start_printing` has been called at least once.
    pub fn printing_started(&self) -> bool {
        self.state()
            .calls
            .iter()
            .any(|c| matches!(c, SdkCall::StartPrinting(_)))
    }

    /// Fire a held init listener. Returns false if none was held.
    pub fn complete_init(&self, outcome: std::result::Result<(), i32>) -> bool {
        let listener = {
            let mut state = self.state();
            let listener = state.held_init.take();
            if listener.is_some() && outcome.is_ok() {
                state.ready = true;
            }
            listener
        };
        match (listener, outcome) {
            (Some(l), Ok(())) => {
                l.on_init_success();
                true
            }
            (Some(l), Err(code)) => {
                l.on_init_fail(code);
                true
            }
            (None, _) => false,
        }
    }

    /// Finish a held print run. Returns false if none was held.
    pub fn finish_pending(&self) -> bool {
        let held = {
            let mut state = self.state();
            let held = state.held_print.take();
            if let Some((_, dots)) = &held {
                state.mileage_mm += f64::from(*dots) * MM_PER_DOT;
                state.printing = false;
            }
            held
        };
        match held {
            Some((listener, _)) => {
                listener.on_finish();
                true
            }
            None => false,
        }
    }

    /// Fail a held print run. Returns false if none was held.
    pub fn fail_pending(&self, code: i32) -> bool {
        let held = {
            let mut state = self.state();
            state.printing = false;
            state.held_print.take()
        };
        match held {
            Some((listener, _)) => {
                listener.on_error(code);
                true
            }
            None => false,
        }
    }

    /// Send a progress report on a held print run without ending it.
    pub fn report_pending(&self, event: i32) -> bool {
        let listener = self.state().held_print.as_ref().map(|(l, _)| Arc::clone(l));
        match listener {
            Some(l) => {
                l.on_report(event);
                true
            }
            None => false,
        }
    }

    /// Buffer one piece of content and record the call.
    fn buffer(&self, call: SdkCall, dots: u32) -> Result<()> {
        let mut state = self.state();
        if !state.ready {
            return Err(PosError::External("printer service not bound".into()));
        }
        if state
            .script
            .content_limit
            .is_some_and(|limit| state.buffered_calls >= limit)
        {
            return Err(PosError::External("content rejected".into()));
        }
        state.buffered_calls += 1;
        state.buffered_dots = state.buffered_dots.saturating_add(dots);
        state.calls.push(call);
        Ok(())
    }
}

impl PosSdk for SimulatedSdk {
    fn platform_name(&self) -> &str {
        "Simulated POS terminal"
    }

    fn init_pos_sdk(&self, listener: Arc<dyn InitListener>) {
        let script = {
            let mut state = self.state();
            state.calls.push(SdkCall::InitSdk);
            let init = state.script.init;
            match init {
                InitScript::Succeed => state.ready = true,
                InitScript::Hold => state.held_init = Some(Arc::clone(&listener)),
                InitScript::Fail(_) => {}
            }
            init
        };
        match script {
            InitScript::Succeed => {
                info!("simulated SDK initialised");
                listener.on_init_success();
            }
            InitScript::Fail(code) => {
                warn!(code, "simulated SDK initialisation failed");
                listener.on_init_fail(code);
            }
            InitScript::Hold => debug!("simulated SDK holding init listener"),
        }
    }

    fn printer(&self) -> Option<Arc<dyn NativePrinter>> {
        if self.state().ready {
            Some(Arc::new(self.clone()))
        } else {
            None
        }
    }

    fn device(&self) -> Option<Arc<dyn NativeDevice>> {
        if self.state().ready {
            Some(Arc::new(self.clone()))
        } else {
            None
        }
    }
}

impl NativePrinter for SimulatedSdk {
    fn printer_status(&self) -> Result<PrinterStatus> {
        let state = self.state();
        if state.script.telemetry_fails {
            return Err(PosError::External("status query failed".into()));
        }
        let mut status = PrinterStatus::new();
        let label = if state.printing { "printing" } else { "idle" };
        status.insert("status".into(), StatusValue::from(label));
        status.insert("paperAvailable".into(), StatusValue::Bool(true));
        status.insert("temperature".into(), StatusValue::Int(38));
        status.insert("voltage".into(), StatusValue::Float(7.4));
        Ok(status)
    }

    fn printer_mileage(&self) -> Result<f64> {
        let state = self.state();
        if state.script.telemetry_fails {
            return Err(PosError::External("mileage query failed".into()));
        }
        Ok(state.mileage_mm)
    }

    fn clear_printer_mileage(&self) -> Result<i32> {
        let mut state = self.state();
        state.calls.push(SdkCall::ClearMileage);
        let code = state.script.clear_mileage_code;
        if code == 0 {
            state.mileage_mm = 0.0;
        }
        Ok(code)
    }

    fn init_printer(&self) -> Result<i32> {
        let mut state = self.state();
        state.calls.push(SdkCall::InitPrinter);
        state.buffered_dots = 0;
        Ok(state.script.init_printer_code)
    }

    fn set_gray_level(&self, level: i32) -> Result<i32> {
        let mut state = self.state();
        state.calls.push(SdkCall::SetGrayLevel(level));
        Ok(state.script.gray_level_code)
    }

    fn set_print_font(&self, font: &FontSelection) -> Result<()> {
        self.state().calls.push(SdkCall::SetFont(font.clone()));
        Ok(())
    }

    fn set_line_spacing(&self, spacing: i32) -> Result<()> {
        self.state().calls.push(SdkCall::SetLineSpacing(spacing));
        Ok(())
    }

    fn add_single_text(&self, info: &TextInfo) -> Result<()> {
        let dots = info.font_size.unwrap_or(DEFAULT_TEXT_DOTS);
        self.buffer(SdkCall::AddText(info.clone()), dots)
    }

    fn add_multi_text(&self, infos: &[TextInfo]) -> Result<()> {
        let dots = infos
            .iter()
            .map(|i| i.font_size.unwrap_or(DEFAULT_TEXT_DOTS))
            .max()
            .unwrap_or(0);
        self.buffer(SdkCall::AddMultiText(infos.to_vec()), dots)
    }

    fn add_picture(&self, align: Alignment, bitmap: &Bitmap) -> Result<()> {
        let call = SdkCall::AddPicture {
            align,
            width: bitmap.width,
            height: bitmap.height,
        };
        self.buffer(call, bitmap.height)
    }

    fn add_bar_code(&self, kind: BarcodeType, width: u32, height: u32, data: &str) -> Result<()> {
        let call = SdkCall::AddBarCode {
            kind,
            width,
            height,
            data: data.to_owned(),
        };
        self.buffer(call, height)
    }

    fn add_qr_code(&self, width: u32, height: u32, data: &str) -> Result<()> {
        let call = SdkCall::AddQrCode {
            width,
            height,
            data: data.to_owned(),
        };
        self.buffer(call, height)
    }

    fn feed_paper(&self, dots: u32) -> Result<()> {
        self.buffer(SdkCall::Feed(dots), dots)
    }

    fn start_printing(
        &self,
        options: &PrintOptions,
        listener: Arc<dyn PrinterListener>,
    ) -> Result<()> {
        let (script, dots) = {
            let mut state = self.state();
            if !state.ready {
                return Err(PosError::External("printer service not bound".into()));
            }
            state.calls.push(SdkCall::StartPrinting(options.clone()));
            let dots = state
                .buffered_dots
                .saturating_add(options.feed_len.unwrap_or(0));
            state.buffered_dots = 0;
            let print = state.script.print;
            match print {
                PrintScript::Hold => {
                    state.printing = true;
                    state.held_print = Some((Arc::clone(&listener), dots));
                }
                PrintScript::Fail(_) => {}
                _ => state.mileage_mm += f64::from(dots) * MM_PER_DOT,
            }
            (print, dots)
        };

        debug!(dots, script = ?script, "simulated print run");
        match script {
            PrintScript::Finish => listener.on_finish(),
            PrintScript::Fail(code) => listener.on_error(code),
            PrintScript::ReportThenFinish(event) => {
                listener.on_report(event);
                listener.on_finish();
            }
            PrintScript::FinishTwice => {
                listener.on_finish();
                listener.on_error(-1);
                listener.on_finish();
            }
            PrintScript::Hold => {}
        }
        Ok(())
    }
}

impl NativeDevice for SimulatedSdk {
    fn version_info(&self) -> Result<VersionInfo> {
        Ok(self.state().script.version_info.clone())
    }

    fn device_sn(&self) -> Result<String> {
        Ok(self.state().script.serial_number.clone())
    }
}
