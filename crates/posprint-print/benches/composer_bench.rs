// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for job composition and picture decoding in the
// posprint-print crate.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{ImageFormat, Rgba, RgbaImage};

use posprint_core::requests::{QrConfig, TextConfig};
use posprint_core::types::Alignment;
use posprint_print::composer::JobComposer;
use posprint_print::picture::decode_base64_image;

/// A 384-dot wide logo, the widest picture the print head takes.
fn logo_base64() -> String {
    let img = RgbaImage::from_fn(384, 128, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    STANDARD.encode(buf)
}

/// Compose a typical 40-line receipt: header, item lines, QR code, feed.
fn bench_compose_receipt(c: &mut Criterion) {
    let header = TextConfig::new("CORNER STORE")
        .align(Alignment::Center)
        .font_size(32)
        .bold(true);
    let columns: Vec<TextConfig> = ["Coffee", "2", "3.50", "7.00"]
        .into_iter()
        .map(TextConfig::new)
        .collect();
    let qr = QrConfig {
        width: 200,
        height: 200,
        data: Some("https://example.com/r/000123".into()),
    };

    c.bench_function("compose_receipt (40 lines)", |b| {
        b.iter(|| {
            let mut composer = JobComposer::new();
            composer.append_text(black_box(&header)).expect("header");
            for _ in 0..40 {
                composer
                    .append_multi_text(black_box(&columns))
                    .expect("line");
            }
            composer.append_qr_code(black_box(&qr)).expect("qr");
            composer.append_feed(80).expect("feed");
            black_box(composer.take_job());
        });
    });
}

fn bench_decode_picture(c: &mut Criterion) {
    let payload = logo_base64();

    c.bench_function("decode_base64_image (384x128 png)", |b| {
        b.iter(|| {
            let bitmap = decode_base64_image(black_box(&payload)).expect("decode");
            black_box(bitmap);
        });
    });
}

criterion_group!(benches, bench_compose_receipt, bench_decode_picture);
criterion_main!(benches);
