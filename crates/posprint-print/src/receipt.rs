// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-call receipt printing on top of the session.

use tracing::{info, instrument, warn};

use posprint_core::config::ReceiptDefaults;
use posprint_core::error::{PosError, Result};
use posprint_core::requests::{ReceiptItem, ReceiptOptions, TextConfig};
use posprint_core::types::{PrintJob, PrintOptions};

use crate::composer::JobComposer;
use crate::session::PosSession;
use crate::settings::{check_gray_level, check_line_spacing};

/// Fill in what a receipt line leaves unset.
fn item_config(item: &ReceiptItem, defaults: &ReceiptDefaults) -> TextConfig {
    TextConfig {
        text: Some(item.text.clone()),
        align: Some(item.align.unwrap_or(defaults.align)),
        font_size: Some(item.font_size.unwrap_or(defaults.font_size)),
        is_bold: Some(item.is_bold.unwrap_or(false)),
        ..Default::default()
    }
}

/// Zero means "not set" for the numeric receipt options.
fn given(value: Option<i32>) -> Option<i32> {
    value.filter(|&v| v != 0)
}

/// Compose the receipt body without touching the device.
fn compose(
    items: &[ReceiptItem],
    options: &ReceiptOptions,
    defaults: &ReceiptDefaults,
) -> Result<PrintJob> {
    let mut composer = JobComposer::new();
    for item in items {
        composer.append_text(&item_config(item, defaults))?;
    }
    if let Some(dots) = given(options.feed_at_end) {
        composer.append_feed(dots)?;
    }
    let job = composer.take_job();
    if job.is_empty() {
        return Err(PosError::validation("Cannot start printing an empty job"));
    }
    Ok(job)
}

impl PosSession {
    /// Reset the printer, apply the optional settings, print one text line
    /// per item, feed, and wait for the job to finish.
    ///
    /// Nothing reaches the device unless the printer is free. Once it is,
    /// any pending job is discarded. Every failure comes back wrapped in
    /// [`PosError::Receipt`].
    #[instrument(skip(self, items, options), fields(items = items.len()))]
    pub async fn print_receipt(&self, items: &[ReceiptItem], options: &ReceiptOptions) -> Result<()> {
        self.run_receipt(items, options)
            .await
            .map_err(|e| PosError::Receipt(Box::new(e)))
    }

    async fn run_receipt(&self, items: &[ReceiptItem], options: &ReceiptOptions) -> Result<()> {
        let job = compose(items, options, &self.config().receipt)?;
        let gray_level = given(options.gray_level);
        let line_spacing = given(options.line_spacing);
        if let Some(level) = gray_level {
            check_gray_level(level)?;
        }
        if let Some(spacing) = line_spacing {
            check_line_spacing(spacing)?;
        }

        let reservation = self.controller.reserve().await?;

        let dropped = self.discard_job();
        if dropped > 0 {
            warn!(dropped, "discarding pending job before printing receipt");
        }

        self.settings.init_printer()?;
        if let Some(level) = gray_level {
            self.settings.set_gray_level(level)?;
        }
        if let Some(spacing) = line_spacing {
            self.settings.set_line_spacing(spacing)?;
        }

        reservation.submit(&job, &PrintOptions::default()).await?;
        info!(job_id = %job.id, "receipt printed");
        Ok(())
    }
}
