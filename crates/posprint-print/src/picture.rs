// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Picture payload decoding: base64 transfer encoding -> encoded image ->
// RGBA bitmap the SDK can rasterise.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, instrument};

use posprint_core::error::{PosError, Result};
use posprint_core::types::Bitmap;

/// Decode a base64 image payload (PNG, JPEG, BMP, ...) into a bitmap.
///
/// Accepts a bare payload or a `data:image/...;base64,` URL, with line
/// breaks anywhere in the payload.
#[instrument(skip(payload), fields(payload_len = payload.len()))]
pub fn decode_base64_image(payload: &str) -> Result<Bitmap> {
    let body = match payload.find("base64,") {
        Some(idx) if payload.starts_with("data:") => &payload[idx + "base64,".len()..],
        _ => payload,
    };
    let cleaned: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| PosError::Decode(format!("invalid base64: {e}")))?;

    let image = image::load_from_memory(&bytes)
        .map_err(|e| PosError::Decode(format!("unrecognised image data: {e}")))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(PosError::Decode("image has no pixels".into()));
    }

    let rgba = image.to_rgba8();
    debug!(width = rgba.width(), height = rgba.height(), "picture decoded");
    Ok(Bitmap {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    /// A small PNG, base64-encoded, for tests across the crate.
    pub(crate) fn png_base64(width: u32, height: u32) -> String {
        let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        STANDARD.encode(buf)
    }

    #[test]
    fn decodes_png_payload() {
        let bmp = decode_base64_image(&png_base64(3, 2)).expect("decode");
        assert_eq!((bmp.width, bmp.height), (3, 2));
        assert_eq!(bmp.pixels.len(), 3 * 2 * 4);
    }

    #[test]
    fn accepts_data_url_and_line_breaks() {
        let raw = png_base64(4, 4);
        let (a, b) = raw.split_at(raw.len() / 2);
        let payload = format!("data:image/png;base64,{a}\n{b}");
        let bmp = decode_base64_image(&payload).expect("decode");
        assert_eq!(bmp.width, 4);
    }

    #[test]
    fn rejects_bad_base64() {
        let err = decode_base64_image("not base64!!").expect_err("bad");
        assert!(matches!(err, PosError::Decode(_)));
    }

    #[test]
    fn rejects_non_image_bytes() {
        let err = decode_base64_image(&STANDARD.encode(b"hello world")).expect_err("bad");
        assert!(matches!(err, PosError::Decode(_)));
    }
}
