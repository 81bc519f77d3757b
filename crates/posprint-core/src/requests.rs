// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caller-supplied configuration objects.
//
// These mirror the loosely-typed key/value maps the application layer sends:
// field names are camelCase on the wire and required content is optional
// here so that a missing field surfaces as a validation error rather than a
// deserialization failure.

use serde::{Deserialize, Serialize};

use crate::types::{Alignment, BarcodeType};

/// One text run to add to the job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    pub text: Option<String>,
    pub align: Option<Alignment>,
    pub font_size: Option<i32>,
    pub width: Option<i32>,
    pub column_spacing: Option<i32>,
    pub is_bold: Option<bool>,
    pub is_italic: Option<bool>,
    pub is_with_underline: Option<bool>,
    pub is_reverse_text: Option<bool>,
}

impl TextConfig {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = Some(align);
        self
    }

    pub fn font_size(mut self, size: i32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.is_bold = Some(bold);
        self
    }
}

/// Font source for `setPrintFont`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontConfig {
    pub font: Option<String>,
    pub system_font: Option<String>,
    pub path: Option<String>,
}

/// A picture carried as base64-encoded image bytes (PNG, JPEG, BMP...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureConfig {
    pub align: Alignment,
    pub base64_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeConfig {
    #[serde(rename = "type")]
    pub kind: BarcodeType,
    pub width: i32,
    pub height: i32,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrConfig {
    pub width: i32,
    pub height: i32,
    pub data: Option<String>,
}

/// One line of the convenience receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub text: String,
    #[serde(default)]
    pub align: Option<Alignment>,
    #[serde(default)]
    pub font_size: Option<i32>,
    #[serde(default)]
    pub is_bold: Option<bool>,
}

impl ReceiptItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            align: None,
            font_size: None,
            is_bold: None,
        }
    }
}

/// Printer settings applied around the convenience receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptOptions {
    #[serde(default)]
    pub gray_level: Option<i32>,
    #[serde(default)]
    pub line_spacing: Option<i32>,
    #[serde(default)]
    pub feed_at_end: Option<i32>,
}
