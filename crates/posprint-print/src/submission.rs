// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Submission controller: hands a composed job to the printer and waits for
// the single terminal signal of that run.
//
// Checks run cheapest first, and none of them touch the SDK:
//
//   1. empty job            -> Validation
//   2. device not Ready     -> NotInitialized
//   3. another job in flight -> Busy (or wait, under BusyPolicy::Queue)
//
// Only then are the entries replayed into the SDK buffer and printing
// started. A hand-off that fails partway flushes the SDK buffer. The permit
// is held until the run resolves or times out; a signal arriving after that
// is dropped by the resolver.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, instrument, warn};

use posprint_bridge::traits::{NativePrinter, PrinterListener};
use posprint_core::config::{BridgeConfig, BusyPolicy};
use posprint_core::error::{PosError, Result};
use posprint_core::types::{JobEntry, JobId, PrintElement, PrintJob, PrintOptions};

use crate::device::PosDevice;
use crate::signal::Resolver;

/// Printer listener for one run. Forwards the first terminal signal only.
struct PrintSignal {
    job_id: JobId,
    resolver: Resolver<std::result::Result<(), i32>>,
}

impl PrinterListener for PrintSignal {
    fn on_error(&self, error_code: i32) {
        if !self.resolver.resolve(Err(error_code)) {
            debug!(job_id = %self.job_id, error_code, "ignoring print error after resolution");
        }
    }

    fn on_finish(&self) {
        if !self.resolver.resolve(Ok(())) {
            debug!(job_id = %self.job_id, "ignoring repeated finish");
        }
    }

    fn on_report(&self, event: i32) {
        debug!(job_id = %self.job_id, event, "print progress report");
    }
}

/// Serialises print runs on the shared device.
pub struct SubmissionController {
    device: Arc<PosDevice>,
    in_flight: Semaphore,
    policy: BusyPolicy,
    timeout: Duration,
}

impl SubmissionController {
    pub fn new(device: Arc<PosDevice>, policy: BusyPolicy, timeout: Duration) -> Self {
        Self {
            device,
            in_flight: Semaphore::new(1),
            policy,
            timeout,
        }
    }

    pub fn from_config(device: Arc<PosDevice>, config: &BridgeConfig) -> Self {
        Self::new(device, config.busy_policy, config.submit_timeout())
    }

    /// Whether a run is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.available_permits() == 0
    }

    /// Print `job` and wait for the device to report the outcome.
    pub async fn submit(&self, job: &PrintJob, options: &PrintOptions) -> Result<()> {
        if job.is_empty() {
            return Err(empty_job());
        }
        self.reserve().await?.submit(job, options).await
    }

    /// Claim the printer for one run without handing anything over yet.
    ///
    /// Fails (or waits, under `BusyPolicy::Queue`) exactly as `submit`
    /// would. No other submission can start while the reservation lives.
    pub async fn reserve(&self) -> Result<Reservation<'_>> {
        let printer = self.device.printer()?;
        let permit = self.acquire().await?;
        Ok(Reservation {
            controller: self,
            printer,
            _permit: permit,
        })
    }

    #[instrument(skip_all, fields(job_id = %job.id, entries = job.len()))]
    async fn run(
        &self,
        printer: &dyn NativePrinter,
        job: &PrintJob,
        options: &PrintOptions,
    ) -> Result<()> {
        let (resolver, rx) = Resolver::channel();
        let listener = Arc::new(PrintSignal {
            job_id: job.id,
            resolver,
        });
        hand_off(printer, job, options, listener)?;
        debug!("job handed to printer");

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(Ok(()))) => {
                info!(elements = job.element_count(), "print job finished");
                Ok(())
            }
            Ok(Ok(Err(code))) => {
                warn!(code, "print job failed");
                Err(PosError::PrintFailed(code))
            }
            Ok(Err(_)) => {
                warn!("SDK dropped the print listener without answering");
                Err(PosError::External(
                    "SDK dropped the print listener without answering".into(),
                ))
            }
            Err(_) => {
                warn!(after = ?self.timeout, "print job timed out");
                Err(PosError::Timeout {
                    operation: "Print job",
                    after: self.timeout,
                })
            }
        }
    }

    async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        match self.policy {
            BusyPolicy::Reject => self.in_flight.try_acquire().map_err(|_| {
                debug!("rejecting submission while another job prints");
                PosError::Busy
            }),
            BusyPolicy::Queue => {
                if self.is_busy() {
                    debug!("waiting for the job in flight");
                }
                self.in_flight
                    .acquire()
                    .await
                    .map_err(|_| PosError::External("submission queue closed".into()))
            }
        }
    }
}

/// Exclusive claim on the printer. Released when dropped or when the run
/// it carries resolves.
pub struct Reservation<'a> {
    controller: &'a SubmissionController,
    printer: Arc<dyn NativePrinter>,
    _permit: SemaphorePermit<'a>,
}

impl Reservation<'_> {
    /// Print `job` under this reservation and wait for the outcome.
    pub async fn submit(self, job: &PrintJob, options: &PrintOptions) -> Result<()> {
        if job.is_empty() {
            return Err(empty_job());
        }
        self.controller
            .run(self.printer.as_ref(), job, options)
            .await
    }
}

fn empty_job() -> PosError {
    PosError::validation("Cannot start printing an empty job")
}

/// Replay every entry into the SDK buffer, in order, then start printing.
///
/// On failure the SDK buffer is flushed with `init_printer`, which also
/// resets printer settings, so no partial content leaks into the next run.
fn hand_off(
    printer: &dyn NativePrinter,
    job: &PrintJob,
    options: &PrintOptions,
    listener: Arc<dyn PrinterListener>,
) -> Result<()> {
    let handed = replay(printer, job).and_then(|()| printer.start_printing(options, listener));
    if let Err(e) = &handed {
        warn!(error = %e, "hand-off failed, flushing SDK buffer");
        match printer.init_printer() {
            Ok(0) => debug!("SDK buffer flushed"),
            Ok(code) => warn!(code, "printer reset after failed hand-off returned non-zero"),
            Err(flush) => warn!(error = %flush, "could not flush SDK buffer"),
        }
    }
    handed
}

fn replay(printer: &dyn NativePrinter, job: &PrintJob) -> Result<()> {
    for entry in job.entries() {
        match entry {
            JobEntry::Line(texts) => printer.add_multi_text(texts)?,
            JobEntry::Element(PrintElement::Text(info)) => printer.add_single_text(info)?,
            JobEntry::Element(PrintElement::Picture { align, bitmap }) => {
                printer.add_picture(*align, bitmap)?
            }
            JobEntry::Element(PrintElement::BarCode {
                kind,
                width,
                height,
                data,
            }) => printer.add_bar_code(*kind, *width, *height, data)?,
            JobEntry::Element(PrintElement::QrCode {
                width,
                height,
                data,
            }) => printer.add_qr_code(*width, *height, data)?,
            JobEntry::Element(PrintElement::Feed { dots }) => printer.feed_paper(*dots)?,
        }
    }
    Ok(())
}
