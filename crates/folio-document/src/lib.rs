// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — the engines behind Folio's tools.
//
// PDF page editing (extract, merge, rotate, reorder), PDF creation from
// images, page rasterisation through pdfium, image re-encoding, zip
// packaging, and OCR.

pub mod archive;
pub mod image;
pub mod pdf;
#[cfg(feature = "render")]
pub mod raster;
pub mod scan;

pub use archive::ArchiveBuilder;
pub use image::processor::ImageProcessor;
pub use pdf::reader::{PdfAssembler, PdfReader, merge_documents};
pub use pdf::writer::PdfWriter;
#[cfg(feature = "render")]
pub use raster::PdfRasterizer;
pub use scan::enhance::ScanEnhancer;

#[cfg(feature = "ocr")]
pub use scan::ocr::{OcrConfig, OcrEngine};
