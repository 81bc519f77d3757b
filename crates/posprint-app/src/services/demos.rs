// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sample jobs printed by the CLI.

use std::path::Path;

use chrono::{DateTime, Local};
use serde::Deserialize;
use tracing::info;

use posprint_core::error::Result;
use posprint_core::requests::{BarcodeConfig, QrConfig, ReceiptItem, ReceiptOptions, TextConfig};
use posprint_core::types::{Alignment, BarcodeType, PrintOptions};
use posprint_print::PosSession;

const RULE: &str = "--------------------------------\n";

fn centered(text: impl Into<String>, size: i32) -> TextConfig {
    TextConfig::new(text).align(Alignment::Center).font_size(size)
}

fn left(text: impl Into<String>, size: i32) -> TextConfig {
    TextConfig::new(text).align(Alignment::Left).font_size(size)
}

/// A message in large bold type followed by a timestamp.
pub async fn print_text(session: &PosSession, message: &str, gray_level: i32) -> Result<()> {
    let now = Local::now();
    session.init_printer()?;
    session.set_gray_level(gray_level)?;
    session.add_single_text(&centered(format!("{message}\n\n"), 24).bold(true))?;
    session.add_single_text(&left(
        format!("Printed at: {}\n\n", now.format("%Y-%m-%d %H:%M:%S")),
        18,
    ))?;
    session.start_printing(&PrintOptions::default()).await?;
    info!("text printed");
    Ok(())
}

/// The sample store receipt: header, items, total, QR code for the digital copy.
pub async fn print_store_receipt(session: &PosSession, gray_level: i32) -> Result<()> {
    let now = Local::now();
    session.init_printer()?;
    session.set_gray_level(gray_level)?;

    for line in store_receipt_lines(now) {
        session.add_single_text(&line)?;
    }
    session.add_qr_code(&QrConfig {
        width: 120,
        height: 120,
        data: Some(format!("receipt_{}", now.timestamp_millis())),
    })?;
    session.add_single_text(&centered("\nScan for digital receipt\n\n", 16))?;
    session.add_single_text(&centered("Thank you for your business!\n\n", 20))?;

    session.start_printing(&PrintOptions::default()).await?;
    info!("store receipt printed");
    Ok(())
}

fn store_receipt_lines(now: DateTime<Local>) -> Vec<TextConfig> {
    let receipt_no = now.timestamp_subsec_micros() % 10_000;
    vec![
        centered("DEMO STORE\n", 28).bold(true),
        centered("123 Demo Street\n", 20),
        centered("Tel: (555) 123-4567\n\n", 20),
        left(format!("Receipt #: {receipt_no}\n"), 20),
        left(format!("Date: {}\n", now.format("%Y-%m-%d")), 20),
        left(format!("Time: {}\n\n", now.format("%H:%M:%S")), 20),
        left("ITEMS:\n", 20).bold(true),
        left(RULE, 18),
        left("Demo Item 1          $10.00\n", 18),
        left("Demo Item 2          $15.50\n", 18),
        left(RULE, 18),
        left("TOTAL:               $25.50\n\n", 20).bold(true),
    ]
}

/// A Code 128 barcode with its human-readable digits underneath.
pub async fn print_barcode(session: &PosSession) -> Result<()> {
    const DIGITS: &str = "1234567890123";

    session.init_printer()?;
    session.add_single_text(&centered("BARCODE DEMO\n\n", 24).bold(true))?;
    session.add_bar_code(&BarcodeConfig {
        kind: BarcodeType::Code128,
        width: 300,
        height: 60,
        data: Some(DIGITS.into()),
    })?;
    session.add_single_text(&centered(format!("\n{DIGITS}\n\n"), 16))?;
    session.start_printing(&PrintOptions::default()).await?;
    info!("barcode printed");
    Ok(())
}

/// On-disk shape of a receipt for `receipt-file`.
#[derive(Debug, Deserialize)]
pub struct ReceiptFile {
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub options: ReceiptOptions,
}

pub fn load_receipt_file(path: &Path) -> Result<ReceiptFile> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub async fn print_receipt_file(session: &PosSession, path: &Path) -> Result<()> {
    let receipt = load_receipt_file(path)?;
    session.print_receipt(&receipt.items, &receipt.options).await?;
    info!(path = %path.display(), items = receipt.items.len(), "receipt file printed");
    Ok(())
}
