// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the hot paths of the compress and split tools.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use folio_core::{OutputImageFormat, parse_page_range};
use folio_document::ImageProcessor;

/// Parse a busy range expression over a long document.
fn bench_page_range(c: &mut Criterion) {
    c.bench_function("parse_page_range (1000 pages)", |b| {
        b.iter(|| parse_page_range(black_box("1-10, 20, 30-300,999,  4-2, x, 500-2000"), 1000));
    });
}

/// Downscale a 3200x2400 photo-sized gradient and encode it as JPEG, the
/// per-image work done by the compress tool.
fn bench_compress_image(c: &mut Criterion) {
    let photo = DynamicImage::ImageRgb8(RgbImage::from_fn(3200, 2400, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    }));

    c.bench_function("fit_to_width + jpeg (3200x2400)", |b| {
        b.iter(|| {
            let bytes = ImageProcessor::from_dynamic(black_box(photo.clone()))
                .fit_to_width(1600)
                .encode(OutputImageFormat::Jpeg, 0.8);
            black_box(bytes.map(|b| b.len()).unwrap_or_default());
        });
    });
}

criterion_group!(benches, bench_page_range, bench_compress_image);
criterion_main!(benches);
