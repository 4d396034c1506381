// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pre-OCR cleanup for photographed or scanned pages: grayscale, contrast
// boost, and global Otsu binarization.

use folio_core::error::FolioError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use tracing::{debug, info, instrument};

use crate::image::processor::ImageProcessor;

/// Contrast factor applied before recognition.
const OCR_CONTRAST: f32 = 1.4;

/// Enhances page images so the recogniser sees crisp dark-on-light text.
pub struct ScanEnhancer {
    image: DynamicImage,
}

impl ScanEnhancer {
    /// Create an enhancer from raw image bytes (JPEG, PNG, TIFF, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, FolioError> {
        let image = image::load_from_memory(data).map_err(|err| {
            FolioError::ImageError(format!("failed to decode scan image: {}", err))
        })?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Scan image loaded"
        );
        Ok(Self { image })
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Global binarization with the threshold chosen by Otsu's method.
    ///
    /// Pixels at or below the threshold become black, the rest white.
    #[instrument(skip(self))]
    pub fn binarize_otsu(self) -> Self {
        let gray = self.image.to_luma8();
        let threshold = otsu_level(&gray);
        debug!(threshold, "Otsu threshold computed");

        let output = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let val = gray.get_pixel(x, y).0[0];
            Luma([if val <= threshold { 0u8 } else { 255u8 }])
        });

        Self {
            image: DynamicImage::ImageLuma8(output),
        }
    }

    /// Grayscale plus a contrast boost. Keeps anti-aliased glyph edges,
    /// which the recogniser handles better than a hard threshold.
    #[instrument(skip(self))]
    pub fn prepare_for_ocr(self) -> Self {
        info!(contrast = OCR_CONTRAST, "Preparing image for OCR");
        let prepared = ImageProcessor::from_dynamic(self.image)
            .flatten_alpha()
            .grayscale()
            .adjust_contrast(OCR_CONTRAST)
            .into_dynamic();
        Self { image: prepared }
    }
}
