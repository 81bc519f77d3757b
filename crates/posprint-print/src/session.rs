// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `PosSession` — the bridge surface applications call.
//
// One session owns the device handle and wires the composer, submission
// controller, settings and status accessor to it. Operation names follow
// the application-facing bridge (`init_pos_sdk`, `add_single_text`,
// `start_printing`, ...).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, instrument};

use posprint_bridge::traits::PosSdk;
use posprint_core::config::BridgeConfig;
use posprint_core::error::{PosError, Result};
use posprint_core::requests::{BarcodeConfig, FontConfig, PictureConfig, QrConfig, TextConfig};
use posprint_core::types::{
    DeviceState, JobEntry, PrintElement, PrintJob, PrintOptions, PrinterStatus, VersionInfo,
};

use crate::composer::{
    JobComposer, prepare_bar_code, prepare_feed, prepare_line, prepare_picture, prepare_qr_code,
    prepare_text,
};
use crate::device::PosDevice;
use crate::settings::PrinterSettings;
use crate::status::StatusAccessor;
use crate::submission::SubmissionController;

pub struct PosSession {
    device: Arc<PosDevice>,
    composer: Mutex<JobComposer>,
    pub(crate) controller: SubmissionController,
    pub(crate) settings: PrinterSettings,
    status: StatusAccessor,
    config: BridgeConfig,
}

impl PosSession {
    /// A session over the SDK for the current build.
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_sdk(posprint_bridge::platform_sdk(), config)
    }

    /// A session over a specific SDK binding.
    pub fn with_sdk(sdk: Arc<dyn PosSdk>, config: BridgeConfig) -> Self {
        let device = Arc::new(PosDevice::new(sdk, config.init_timeout()));
        Self {
            controller: SubmissionController::from_config(Arc::clone(&device), &config),
            settings: PrinterSettings::new(Arc::clone(&device)),
            status: StatusAccessor::new(Arc::clone(&device)),
            composer: Mutex::new(JobComposer::new()),
            device,
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn device_state(&self) -> DeviceState {
        self.device.state()
    }

    pub fn platform_name(&self) -> &str {
        self.device.platform_name()
    }

    fn composer(&self) -> MutexGuard<'_, JobComposer> {
        self.composer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- Lifecycle --------------------------------------------------------

    pub async fn init_pos_sdk(&self) -> Result<()> {
        self.device.initialize().await
    }

    // -- Status -----------------------------------------------------------

    /// Printer status snapshot, or `None` when it cannot be read.
    pub fn get_printer(&self) -> Option<PrinterStatus> {
        self.status.query_printer_status()
    }

    pub fn get_printer_mileage(&self) -> f64 {
        self.status.query_printer_mileage()
    }

    pub fn try_get_printer_mileage(&self) -> Result<f64> {
        self.status.try_query_printer_mileage()
    }

    pub fn clear_printer_mileage(&self) -> Result<()> {
        self.status.clear_printer_mileage()
    }

    pub fn get_version_info(&self) -> Option<VersionInfo> {
        self.status.query_version_info()
    }

    pub fn get_device_sn(&self) -> Option<String> {
        self.status.query_device_serial_number()
    }

    // -- Settings ---------------------------------------------------------

    /// Settings stay untouched while a run holds the printer.
    fn idle_settings(&self) -> Result<&PrinterSettings> {
        if self.controller.is_busy() {
            debug!("refusing settings change while a job prints");
            return Err(PosError::Busy);
        }
        Ok(&self.settings)
    }

    pub fn init_printer(&self) -> Result<()> {
        self.idle_settings()?.init_printer()
    }

    pub fn set_gray_level(&self, level: i32) -> Result<()> {
        self.idle_settings()?.set_gray_level(level)
    }

    pub fn set_print_font(&self, config: &FontConfig) -> Result<()> {
        self.idle_settings()?.set_print_font(config)
    }

    pub fn set_line_spacing(&self, spacing: i32) -> Result<()> {
        self.idle_settings()?.set_line_spacing(spacing)
    }

    // -- Composition ------------------------------------------------------

    pub fn add_single_text(&self, config: &TextConfig) -> Result<()> {
        let info = prepare_text(config)?;
        self.append(JobEntry::Element(PrintElement::Text(info)))
    }

    pub fn add_multi_text(&self, configs: &[TextConfig]) -> Result<()> {
        let texts = prepare_line(configs)?;
        self.append(JobEntry::Line(texts))
    }

    pub fn add_picture(&self, config: &PictureConfig) -> Result<()> {
        let element = prepare_picture(config)?;
        self.append(JobEntry::Element(element))
    }

    pub fn add_bar_code(&self, config: &BarcodeConfig) -> Result<()> {
        let element = prepare_bar_code(config)?;
        self.append(JobEntry::Element(element))
    }

    pub fn add_qr_code(&self, config: &QrConfig) -> Result<()> {
        let element = prepare_qr_code(config)?;
        self.append(JobEntry::Element(element))
    }

    pub fn feed_paper(&self, dots: i32) -> Result<()> {
        let element = prepare_feed(dots)?;
        self.append(JobEntry::Element(element))
    }

    /// Validated entries are only accepted once the handshake is done.
    fn append(&self, entry: JobEntry) -> Result<()> {
        self.device.ensure_ready()?;
        self.composer().push(entry);
        Ok(())
    }

    /// Snapshot of the job being composed.
    pub fn pending_job(&self) -> PrintJob {
        self.composer().job().clone()
    }

    /// Drop the job being composed. Returns how many entries were dropped.
    pub fn discard_job(&self) -> usize {
        let mut composer = self.composer();
        let dropped = composer.len();
        composer.clear();
        dropped
    }

    // -- Submission -------------------------------------------------------

    /// Print the composed job and wait for the outcome.
    ///
    /// The job is cleared once it has reached the device, whatever the
    /// outcome. If it was turned away before that (empty, not initialised,
    /// printer busy) it stays pending, ahead of anything appended meanwhile.
    #[instrument(skip(self, options))]
    pub async fn start_printing(&self, options: &PrintOptions) -> Result<()> {
        let job = self.composer().take_job();
        let job_id = job.id;
        let result = self.controller.submit(&job, options).await;
        match &result {
            Err(e) if e.is_rejected_before_device() => {
                debug!(%job_id, error = %e, "job kept pending");
                self.composer().restore(job);
            }
            Ok(()) => info!(%job_id, "job printed"),
            Err(e) => debug!(%job_id, error = %e, "job dropped after reaching the device"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use posprint_bridge::simulated::{PrintScript, SdkCall, SimScript, SimulatedSdk};
    use posprint_core::types::Alignment;

    use super::*;

    fn session(script: SimScript) -> (SimulatedSdk, PosSession) {
        let sdk = SimulatedSdk::with_script(script);
        let config = BridgeConfig {
            submit_timeout_secs: 2,
            init_timeout_secs: 2,
            ..Default::default()
        };
        let session = PosSession::with_sdk(Arc::new(sdk.clone()), config);
        (sdk, session)
    }

    async fn ready_session(script: SimScript) -> (SimulatedSdk, PosSession) {
        let (sdk, session) = session(script);
        session.init_pos_sdk().await.expect("init");
        (sdk, session)
    }

    fn qr(width: i32, height: i32) -> QrConfig {
        QrConfig {
            width,
            height,
            data: Some("https://example.com".into()),
        }
    }

    #[tokio::test]
    async fn add_validates_before_readiness() {
        let (sdk, session) = session(SimScript::default());
        assert!(matches!(
            session.add_qr_code(&qr(500, 120)),
            Err(PosError::Validation(_))
        ));
        assert!(matches!(
            session.add_single_text(&TextConfig::new("hi")),
            Err(PosError::NotInitialized(_))
        ));
        assert!(session.pending_job().is_empty());
        assert!(sdk.calls().is_empty());
    }

    #[tokio::test]
    async fn oversized_qr_leaves_job_empty() {
        let (_sdk, session) = ready_session(SimScript::default()).await;
        let err = session.add_qr_code(&qr(500, 120)).expect_err("too wide");
        assert!(matches!(err, PosError::Validation(_)));
        assert!(session.pending_job().is_empty());
    }

    #[test]
    fn telemetry_before_init() {
        let (_sdk, session) = session(SimScript::default());
        assert_eq!(session.device_state(), DeviceState::Uninitialized);
        assert_eq!(session.get_printer_mileage(), 0.0);
        assert_eq!(session.get_printer(), None);
        assert!(matches!(
            session.clear_printer_mileage(),
            Err(PosError::NotInitialized(_))
        ));
    }

    #[tokio::test]
    async fn successful_print_clears_job() {
        let (sdk, session) = ready_session(SimScript::default()).await;
        session
            .add_single_text(
                &TextConfig::new("Hello")
                    .align(Alignment::Center)
                    .font_size(24)
                    .bold(true),
            )
            .expect("text");
        session.feed_paper(80).expect("feed");
        assert_eq!(session.pending_job().len(), 2);

        session
            .start_printing(&PrintOptions::default())
            .await
            .expect("print");
        assert!(session.pending_job().is_empty());
        assert!(sdk.printing_started());
        assert_eq!(session.get_printer_mileage(), 13.0);
    }

    #[tokio::test]
    async fn print_failure_still_clears_job() {
        let (_sdk, session) = ready_session(SimScript {
            print: PrintScript::Fail(-4),
            ..Default::default()
        })
        .await;
        session.feed_paper(10).expect("feed");
        let err = session
            .start_printing(&PrintOptions::default())
            .await
            .expect_err("fails");
        assert!(matches!(err, PosError::PrintFailed(-4)));
        assert!(session.pending_job().is_empty());
    }

    #[tokio::test]
    async fn empty_job_is_rejected_without_sdk_contact() {
        let (sdk, session) = ready_session(SimScript::default()).await;
        let err = session
            .start_printing(&PrintOptions::default())
            .await
            .expect_err("empty");
        assert_eq!(err.to_string(), "Cannot start printing an empty job");
        assert_eq!(sdk.calls(), vec![SdkCall::InitSdk]);
    }

    #[tokio::test]
    async fn busy_rejection_keeps_job_pending() {
        let (sdk, session) = ready_session(SimScript {
            print: PrintScript::Hold,
            ..Default::default()
        })
        .await;
        let session = Arc::new(session);

        session.feed_paper(10).expect("feed");
        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.start_printing(&PrintOptions::default()).await }
        });
        while !sdk.printing_started() {
            tokio::task::yield_now().await;
        }

        session.feed_paper(20).expect("second job");
        let err = session
            .start_printing(&PrintOptions::default())
            .await
            .expect_err("busy");
        assert!(matches!(err, PosError::Busy));
        assert_eq!(session.pending_job().len(), 1);

        assert!(sdk.finish_pending());
        first.await.expect("join").expect("first job");

        sdk.set_script(SimScript::default());
        session
            .start_printing(&PrintOptions::default())
            .await
            .expect("kept job prints");
        assert!(session.pending_job().is_empty());
    }

    #[tokio::test]
    async fn discard_reports_dropped_entries() {
        let (_sdk, session) = ready_session(SimScript::default()).await;
        session.feed_paper(1).expect("feed");
        session.feed_paper(2).expect("feed");
        assert_eq!(session.discard_job(), 2);
        assert!(session.pending_job().is_empty());
    }

    #[tokio::test]
    async fn timeout_counts_as_reaching_device() {
        let sdk = SimulatedSdk::with_script(SimScript {
            print: PrintScript::Hold,
            ..Default::default()
        });
        let config = BridgeConfig {
            submit_timeout_secs: 0,
            ..Default::default()
        };
        let session = PosSession::with_sdk(Arc::new(sdk), config);
        session.init_pos_sdk().await.expect("init");
        session.feed_paper(5).expect("feed");
        let err = session
            .start_printing(&PrintOptions::default())
            .await
            .expect_err("timeout");
        assert!(matches!(err, PosError::Timeout { .. }));
        assert!(session.pending_job().is_empty());
    }

    #[tokio::test]
    async fn settings_are_refused_during_a_run() {
        let (sdk, session) = ready_session(SimScript {
            print: PrintScript::Hold,
            ..Default::default()
        })
        .await;
        let session = Arc::new(session);

        session.feed_paper(10).expect("feed");
        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.start_printing(&PrintOptions::default()).await }
        });
        while !sdk.printing_started() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(session.init_printer(), Err(PosError::Busy)));
        assert!(matches!(session.set_gray_level(3), Err(PosError::Busy)));
        assert!(matches!(session.set_line_spacing(2), Err(PosError::Busy)));
        assert!(matches!(
            session.set_print_font(&FontConfig::default()),
            Err(PosError::Busy)
        ));
        assert!(matches!(
            sdk.calls().last(),
            Some(SdkCall::StartPrinting(_))
        ));

        assert!(sdk.finish_pending());
        first.await.expect("join").expect("first job");
        session.set_gray_level(3).expect("idle again");
        assert_eq!(sdk.calls().last(), Some(&SdkCall::SetGrayLevel(3)));
    }

    #[tokio::test]
    async fn partial_hand_off_drops_job_and_flushes_buffer() {
        let (sdk, session) = ready_session(SimScript {
            content_limit: Some(1),
            ..Default::default()
        })
        .await;
        session.feed_paper(10).expect("feed");
        session.add_qr_code(&qr(120, 120)).expect("qr");

        let err = session
            .start_printing(&PrintOptions::default())
            .await
            .expect_err("qr rejected");
        assert!(matches!(err, PosError::External(_)));
        assert!(session.pending_job().is_empty());
        assert_eq!(
            sdk.calls(),
            vec![SdkCall::InitSdk, SdkCall::Feed(10), SdkCall::InitPrinter]
        );

        sdk.set_script(SimScript::default());
        session.feed_paper(8).expect("feed");
        session
            .start_printing(&PrintOptions::default())
            .await
            .expect("next job");
        assert_eq!(session.get_printer_mileage(), 1.0);
    }
}
