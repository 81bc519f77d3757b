// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for posprint: print elements, jobs, and device snapshots.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PosError;

/// Largest barcode / QR code dimension the print head accepts, in dots.
pub const MAX_SYMBOL_DOTS: i32 = 384;

/// Most texts that can share one line in a multi-text group.
pub const MAX_LINE_TEXTS: usize = 4;

/// Sentinel for "let the SDK choose" on text column width and spacing.
pub const AUTO: i32 = -1;

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal alignment. Discriminants are the vendor SDK's bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Alignment {
    Left = 0x01,
    Center = 0x02,
    Right = 0x04,
}

impl Alignment {
    /// Wire value passed to the SDK.
    pub fn flag(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Alignment {
    type Error = PosError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Left),
            0x02 => Ok(Self::Center),
            0x04 => Ok(Self::Right),
            other => Err(PosError::Validation(format!(
                "unknown alignment flag: {other:#04x}"
            ))),
        }
    }
}

impl From<Alignment> for i32 {
    fn from(value: Alignment) -> Self {
        value.flag()
    }
}

/// Barcode symbology. Discriminants are the vendor SDK's type constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum BarcodeType {
    Code128 = 0x01,
    Pdf417 = 0x02,
    Code39 = 0x0A,
}

impl BarcodeType {
    pub fn flag(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for BarcodeType {
    type Error = PosError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Code128),
            0x02 => Ok(Self::Pdf417),
            0x0A => Ok(Self::Code39),
            other => Err(PosError::Validation(format!(
                "unknown barcode type: {other:#04x}"
            ))),
        }
    }
}

impl From<BarcodeType> for i32 {
    fn from(value: BarcodeType) -> Self {
        value.flag()
    }
}

/// One styled run of text, as the SDK's `TextInfo` expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInfo {
    pub text: String,
    /// `None` leaves alignment to the SDK default.
    pub align: Option<Alignment>,
    /// `None` leaves the font size to the SDK default.
    pub font_size: Option<u32>,
    /// Fixed column width, or [`AUTO`].
    pub width: i32,
    /// Column spacing, or [`AUTO`].
    pub column_spacing: i32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub reverse: bool,
}

impl TextInfo {
    /// Plain text with every optional field at its default.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            align: None,
            font_size: None,
            width: AUTO,
            column_spacing: AUTO,
            bold: false,
            italic: false,
            underline: false,
            reverse: false,
        }
    }
}

/// A decoded picture ready for the SDK: tightly packed RGBA8 rows.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// One unit of print content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintElement {
    Text(TextInfo),
    Picture { align: Alignment, bitmap: Bitmap },
    BarCode {
        kind: BarcodeType,
        width: u32,
        height: u32,
        data: String,
    },
    QrCode { width: u32, height: u32, data: String },
    Feed { dots: u32 },
}

impl PrintElement {
    /// Short name used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Picture { .. } => "picture",
            Self::BarCode { .. } => "barcode",
            Self::QrCode { .. } => "qrcode",
            Self::Feed { .. } => "feed",
        }
    }
}

/// An entry in a job: a single element, or up to four texts sharing a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEntry {
    Element(PrintElement),
    Line(Vec<TextInfo>),
}

impl JobEntry {
    /// Number of print elements this entry contributes.
    pub fn element_count(&self) -> usize {
        match self {
            Self::Element(_) => 1,
            Self::Line(texts) => texts.len(),
        }
    }
}

/// An ordered collection of entries printed in one physical operation.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: JobId,
    pub created_at: DateTime<Utc>,
    entries: Vec<JobEntry>,
}

impl PrintJob {
    pub fn new() -> Self {
        Self {
            id: JobId::new(),
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: JobEntry) {
        self.entries.push(entry);
    }

    /// Move every entry of `later` after this job's entries.
    pub fn append_job(&mut self, later: PrintJob) {
        self.entries.extend(later.entries);
    }

    pub fn entries(&self) -> &[JobEntry] {
        &self.entries
    }

    /// Number of entries (a multi-text line counts once).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of print elements (each text of a line counts).
    pub fn element_count(&self) -> usize {
        self.entries.iter().map(JobEntry::element_count).sum()
    }
}

impl Default for PrintJob {
    fn default() -> Self {
        Self::new()
    }
}

/// Font selection applied by `setPrintFont`. Exactly one source at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontSelection {
    /// A font bundled with the SDK, by name.
    Named(String),
    /// A font installed on the device's OS.
    System(String),
    /// A font file on the device filesystem.
    Path(String),
}

impl FontSelection {
    /// Key the SDK's font bundle expects for this source.
    pub fn bundle_key(&self) -> &'static str {
        match self {
            Self::Named(_) => "font",
            Self::System(_) => "systemFont",
            Self::Path(_) => "path",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Named(v) | Self::System(v) | Self::Path(v) => v,
        }
    }
}

/// Options bag forwarded to `startPrinting`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOptions {
    /// Paper to feed after the job, in dots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_len: Option<u32>,
}

/// One typed field of a printer status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for StatusValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for StatusValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for StatusValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for StatusValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for StatusValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Printer status snapshot, field name to typed value.
pub type PrinterStatus = BTreeMap<String, StatusValue>;

/// Firmware / SDK version strings reported by the device.
pub type VersionInfo = BTreeMap<String, String>;

/// Lifecycle of the SDK handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceState {
    Uninitialized,
    Initializing,
    Ready,
    /// The handshake failed with this SDK code. Terminal for the handle.
    Failed(i32),
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("uninitialized"),
            Self::Initializing => f.write_str("initializing"),
            Self::Ready => f.write_str("ready"),
            Self::Failed(code) => write!(f, "failed ({code})"),
        }
    }
}
