// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engines that need runtime resources (the pdfium library, OCR models) are
// bound on first use and then reused for the rest of the process. Builds
// without the `render` or `ocr` feature report `FeatureUnavailable` instead.

use std::path::PathBuf;

use folio_core::AppConfig;
use folio_core::error::{FolioError, Result};
use image::DynamicImage;
#[cfg(feature = "render")]
use tracing::info;

#[cfg(feature = "ocr")]
use folio_document::{OcrConfig, OcrEngine};
#[cfg(feature = "render")]
use folio_document::PdfRasterizer;

pub struct Engines {
    #[cfg_attr(not(feature = "render"), allow(dead_code))]
    pdfium_library_path: Option<PathBuf>,
    #[cfg_attr(not(feature = "ocr"), allow(dead_code))]
    ocr_model_dir: Option<PathBuf>,
    #[cfg(feature = "render")]
    rasterizer: Option<PdfRasterizer>,
    #[cfg(feature = "ocr")]
    ocr: Option<OcrEngine>,
}

impl Engines {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            pdfium_library_path: config.pdfium_library_path.clone(),
            ocr_model_dir: config.ocr_model_dir.clone(),
            #[cfg(feature = "render")]
            rasterizer: None,
            #[cfg(feature = "ocr")]
            ocr: None,
        }
    }

    #[cfg(feature = "render")]
    fn rasterizer(&mut self) -> Result<&PdfRasterizer> {
        if self.rasterizer.is_none() {
            let rasterizer = PdfRasterizer::new(self.pdfium_library_path.as_deref())?;
            info!("PDF renderer ready");
            self.rasterizer = Some(rasterizer);
        }
        self.rasterizer
            .as_ref()
            .ok_or_else(|| FolioError::Internal("renderer missing after bind".into()))
    }

    // -- Rendering ------------------------------------------------------------

    #[cfg(feature = "render")]
    pub fn page_count(&mut self, bytes: &[u8]) -> Result<u32> {
        self.rasterizer()?.page_count(bytes)
    }

    #[cfg(feature = "render")]
    pub fn render_pages(
        &mut self,
        bytes: &[u8],
        pages: &[u32],
        scale: f32,
    ) -> Result<Vec<(u32, DynamicImage)>> {
        self.rasterizer()?.render_pages(bytes, pages, scale)
    }

    #[cfg(feature = "render")]
    pub fn thumbnails(&mut self, bytes: &[u8], max_pages: u32) -> Result<Vec<Vec<u8>>> {
        self.rasterizer()?.thumbnails(bytes, max_pages)
    }

    #[cfg(feature = "render")]
    pub fn first_page_thumbnail(&mut self, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        self.rasterizer()?.first_page_thumbnail(bytes)
    }

    #[cfg(not(feature = "render"))]
    pub fn page_count(&mut self, _bytes: &[u8]) -> Result<u32> {
        Err(FolioError::FeatureUnavailable("render"))
    }

    #[cfg(not(feature = "render"))]
    pub fn render_pages(
        &mut self,
        _bytes: &[u8],
        _pages: &[u32],
        _scale: f32,
    ) -> Result<Vec<(u32, DynamicImage)>> {
        Err(FolioError::FeatureUnavailable("render"))
    }

    #[cfg(not(feature = "render"))]
    pub fn thumbnails(&mut self, _bytes: &[u8], _max_pages: u32) -> Result<Vec<Vec<u8>>> {
        Err(FolioError::FeatureUnavailable("render"))
    }

    #[cfg(not(feature = "render"))]
    pub fn first_page_thumbnail(&mut self, _bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        Err(FolioError::FeatureUnavailable("render"))
    }

    // -- OCR ------------------------------------------------------------------

    #[cfg(feature = "ocr")]
    pub fn recognize_text(&mut self, image: &DynamicImage) -> Result<String> {
        if self.ocr.is_none() {
            let config = OcrConfig::from_optional_dir(self.ocr_model_dir.as_deref());
            self.ocr = Some(OcrEngine::new(config)?);
        }
        match self.ocr.as_ref() {
            Some(engine) => engine.recognize_text(image),
            None => Err(FolioError::Internal("OCR engine missing after load".into())),
        }
    }

    #[cfg(not(feature = "ocr"))]
    pub fn recognize_text(&mut self, _image: &DynamicImage) -> Result<String> {
        Err(FolioError::FeatureUnavailable("ocr"))
    }
}
