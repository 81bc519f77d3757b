// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job composer: turns caller configuration objects into validated print
// elements and accumulates them, in order, into the in-progress job.
//
// Nothing here touches the device. Validation happens entirely up front so a
// rejected element never mutates the job and never reaches the SDK.

use tracing::{debug, instrument};

use posprint_core::error::{PosError, Result};
use posprint_core::requests::{BarcodeConfig, PictureConfig, QrConfig, TextConfig};
use posprint_core::types::{
    AUTO, JobEntry, MAX_LINE_TEXTS, MAX_SYMBOL_DOTS, PrintElement, PrintJob, TextInfo,
};

use crate::picture::decode_base64_image;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a text config and apply defaults (width and column spacing auto).
pub fn prepare_text(config: &TextConfig) -> Result<TextInfo> {
    let text = match config.text.as_deref() {
        Some(t) if !t.is_empty() => t,
        _ => return Err(PosError::validation("Text is required")),
    };

    let font_size = match config.font_size {
        Some(size) if size <= 0 => {
            return Err(PosError::validation("Font size must be a positive number"));
        }
        Some(size) => Some(size.unsigned_abs()),
        None => None,
    };

    let width = column_value(config.width, "Text width")?;
    let column_spacing = column_value(config.column_spacing, "Column spacing")?;

    Ok(TextInfo {
        text: text.to_owned(),
        align: config.align,
        font_size,
        width,
        column_spacing,
        bold: config.is_bold.unwrap_or(false),
        italic: config.is_italic.unwrap_or(false),
        underline: config.is_with_underline.unwrap_or(false),
        reverse: config.is_reverse_text.unwrap_or(false),
    })
}

/// Column width / spacing: omitted means auto, otherwise -1 or >= 0 dots.
fn column_value(value: Option<i32>, what: &str) -> Result<i32> {
    match value {
        None => Ok(AUTO),
        Some(v) if v >= AUTO => Ok(v),
        Some(_) => Err(PosError::Validation(format!(
            "{what} must be -1 (auto) or a number of dots"
        ))),
    }
}

/// Validate a multi-text line: 1 to 4 texts, each individually valid.
pub fn prepare_line(configs: &[TextConfig]) -> Result<Vec<TextInfo>> {
    if configs.is_empty() {
        return Err(PosError::validation(
            "Text config array is required and must not be empty",
        ));
    }
    if configs.len() > MAX_LINE_TEXTS {
        return Err(PosError::validation("Maximum 4 texts allowed per line"));
    }
    configs.iter().map(prepare_text).collect()
}

pub fn prepare_picture(config: &PictureConfig) -> Result<PrintElement> {
    let payload = match config.base64_image.as_deref() {
        Some(p) if !p.trim().is_empty() => p,
        _ => return Err(PosError::validation("Base64 image is required")),
    };
    let bitmap = decode_base64_image(payload)?;
    Ok(PrintElement::Picture {
        align: config.align,
        bitmap,
    })
}

pub fn prepare_bar_code(config: &BarcodeConfig) -> Result<PrintElement> {
    let data = required_data(config.data.as_deref(), "Barcode data is required")?;
    if config.width > MAX_SYMBOL_DOTS {
        return Err(PosError::validation("Barcode width cannot exceed 384 dots"));
    }
    if config.height > MAX_SYMBOL_DOTS {
        return Err(PosError::validation("Barcode height cannot exceed 384 dots"));
    }
    let (width, height) = positive_dims(config.width, config.height, "Barcode")?;
    Ok(PrintElement::BarCode {
        kind: config.kind,
        width,
        height,
        data,
    })
}

pub fn prepare_qr_code(config: &QrConfig) -> Result<PrintElement> {
    let data = required_data(config.data.as_deref(), "QR code data is required")?;
    if config.width > MAX_SYMBOL_DOTS || config.height > MAX_SYMBOL_DOTS {
        return Err(PosError::validation(
            "QR code dimensions cannot exceed 384 dots",
        ));
    }
    let (width, height) = positive_dims(config.width, config.height, "QR code")?;
    Ok(PrintElement::QrCode {
        width,
        height,
        data,
    })
}

pub fn prepare_feed(dots: i32) -> Result<PrintElement> {
    if dots < 0 {
        return Err(PosError::validation("Dots must be a positive number"));
    }
    Ok(PrintElement::Feed {
        dots: dots.unsigned_abs(),
    })
}

fn required_data(data: Option<&str>, msg: &str) -> Result<String> {
    match data {
        Some(d) if !d.is_empty() => Ok(d.to_owned()),
        _ => Err(PosError::validation(msg)),
    }
}

fn positive_dims(width: i32, height: i32, what: &str) -> Result<(u32, u32)> {
    if width <= 0 || height <= 0 {
        return Err(PosError::Validation(format!(
            "{what} dimensions must be positive"
        )));
    }
    Ok((width.unsigned_abs(), height.unsigned_abs()))
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

/// Accumulates validated entries into the in-progress job.
#[derive(Debug, Default)]
pub struct JobComposer {
    job: PrintJob,
}

impl JobComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, config: &TextConfig) -> Result<()> {
        let info = prepare_text(config)?;
        self.push(JobEntry::Element(PrintElement::Text(info)));
        Ok(())
    }

    /// Append 1-4 texts as one line. All-or-nothing.
    pub fn append_multi_text(&mut self, configs: &[TextConfig]) -> Result<()> {
        let texts = prepare_line(configs)?;
        self.push(JobEntry::Line(texts));
        Ok(())
    }

    pub fn append_picture(&mut self, config: &PictureConfig) -> Result<()> {
        let element = prepare_picture(config)?;
        self.push(JobEntry::Element(element));
        Ok(())
    }

    pub fn append_bar_code(&mut self, config: &BarcodeConfig) -> Result<()> {
        let element = prepare_bar_code(config)?;
        self.push(JobEntry::Element(element));
        Ok(())
    }

    pub fn append_qr_code(&mut self, config: &QrConfig) -> Result<()> {
        let element = prepare_qr_code(config)?;
        self.push(JobEntry::Element(element));
        Ok(())
    }

    pub fn append_feed(&mut self, dots: i32) -> Result<()> {
        let element = prepare_feed(dots)?;
        self.push(JobEntry::Element(element));
        Ok(())
    }

    /// Append an already-validated entry.
    pub fn push(&mut self, entry: JobEntry) {
        match &entry {
            JobEntry::Element(e) => debug!(job_id = %self.job.id, kind = e.kind_name(), "element appended"),
            JobEntry::Line(texts) => debug!(job_id = %self.job.id, texts = texts.len(), "line appended"),
        }
        self.job.push(entry);
    }

    /// Discard everything and start a fresh job.
    #[instrument(skip(self), fields(job_id = %self.job.id))]
    pub fn clear(&mut self) {
        debug!(entries = self.job.len(), "job cleared");
        self.job = PrintJob::new();
    }

    /// Hand over the current job, leaving a fresh one in its place.
    pub fn take_job(&mut self) -> PrintJob {
        std::mem::take(&mut self.job)
    }

    /// Put a job taken with [`take_job`](Self::take_job) back in front of
    /// anything appended since.
    pub fn restore(&mut self, job: PrintJob) {
        let later = std::mem::replace(&mut self.job, job);
        self.job.append_job(later);
    }

    pub fn job(&self) -> &PrintJob {
        &self.job
    }

    /// Number of entries (a multi-text line counts once).
    pub fn len(&self) -> usize {
        self.job.len()
    }

    pub fn element_count(&self) -> usize {
        self.job.element_count()
    }

    pub fn is_empty(&self) -> bool {
        self.job.is_empty()
    }
}
