// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF rasterisation through pdfium. pdfium is CPU-bound and keeps
// thread-local state, so callers run this on a blocking worker thread.

use std::path::{Path, PathBuf};

use folio_core::OutputImageFormat;
use folio_core::error::FolioError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;

/// Render scale used for thumbnails (1.0 = 72 DPI).
pub const THUMBNAIL_SCALE: f32 = 1.2;
/// JPEG quality for the first-page thumbnail shown next to a file.
pub const THUMBNAIL_QUALITY: f32 = 0.8;
/// JPEG quality for multi-page previews.
pub const PREVIEW_QUALITY: f32 = 0.85;

/// Environment variable naming an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// A bound pdfium instance.
pub struct PdfRasterizer {
    pdfium: Pdfium,
}

impl PdfRasterizer {
    /// Bind pdfium, trying in order: `library_path`, `$PDFIUM_LIB_PATH`, the
    /// working directory, then the system library search path.
    ///
    /// A path may name the library file itself or the directory holding it.
    #[instrument(skip_all)]
    pub fn new(library_path: Option<&Path>) -> Result<Self, FolioError> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(path) = library_path {
            candidates.push(path.to_path_buf());
        }
        if let Ok(env_path) = std::env::var(PDFIUM_LIB_PATH_ENV) {
            candidates.push(PathBuf::from(env_path));
        }
        candidates.push(PathBuf::from("."));

        let mut last_error = String::from("no candidate paths");
        for candidate in candidates {
            let lib = if candidate.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&candidate)
            } else {
                candidate
            };
            match Pdfium::bind_to_library(&lib) {
                Ok(bindings) => {
                    info!(library = %lib.display(), "pdfium bound");
                    return Ok(Self {
                        pdfium: Pdfium::new(bindings),
                    });
                }
                Err(err) => {
                    debug!(library = %lib.display(), error = %err, "pdfium not found here");
                    last_error = format!("{}: {}", lib.display(), err);
                }
            }
        }

        match Pdfium::bind_to_system_library() {
            Ok(bindings) => {
                info!("pdfium bound from system library");
                Ok(Self {
                    pdfium: Pdfium::new(bindings),
                })
            }
            Err(err) => Err(FolioError::RenderError(format!(
                "failed to bind to pdfium ({last_error}; system: {err}). \
                 Set {PDFIUM_LIB_PATH_ENV}=/path/to/libpdfium"
            ))),
        }
    }

    fn load<'a>(&'a self, bytes: &'a [u8]) -> Result<PdfDocument<'a>, FolioError> {
        self.pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|err| FolioError::PdfError(format!("pdfium could not open the PDF: {}", err)))
    }

    pub fn page_count(&self, bytes: &[u8]) -> Result<u32, FolioError> {
        Ok(self.load(bytes)?.pages().len() as u32)
    }

    /// Render the given 1-based pages at `scale`, in the order given.
    /// Pages beyond the end of the document are skipped with a warning.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len(), pages = pages.len()))]
    pub fn render_pages(
        &self,
        bytes: &[u8],
        pages: &[u32],
        scale: f32,
    ) -> Result<Vec<(u32, DynamicImage)>, FolioError> {
        let document = self.load(bytes)?;
        let doc_pages = document.pages();
        let total = doc_pages.len() as u32;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);

        let mut rendered = Vec::with_capacity(pages.len());
        for &number in pages {
            if number == 0 || number > total {
                warn!(page = number, total, "Skipping page outside the document");
                continue;
            }

            let page = doc_pages.get((number - 1) as u16).map_err(|err| {
                FolioError::RenderError(format!("page {}: {}", number, err))
            })?;
            let bitmap = page.render_with_config(&config).map_err(|err| {
                FolioError::RenderError(format!("page {}: {}", number, err))
            })?;
            let image = bitmap.as_image();
            debug!(page = number, width = image.width(), height = image.height(), "Page rendered");

            rendered.push((number, image));
        }

        Ok(rendered)
    }

    /// JPEG thumbnails of the first `min(page_count, max_pages)` pages.
    pub fn thumbnails(&self, bytes: &[u8], max_pages: u32) -> Result<Vec<Vec<u8>>, FolioError> {
        let count = self.page_count(bytes)?.min(max_pages);
        let pages: Vec<u32> = (1..=count).collect();
        self.render_pages(bytes, &pages, THUMBNAIL_SCALE)?
            .into_iter()
            .map(|(_, image)| {
                ImageProcessor::from_dynamic(image).encode(OutputImageFormat::Jpeg, PREVIEW_QUALITY)
            })
            .collect()
    }

    /// JPEG thumbnail of page 1, or `None` for a document without pages.
    pub fn first_page_thumbnail(&self, bytes: &[u8]) -> Result<Option<Vec<u8>>, FolioError> {
        let mut rendered = self.render_pages(bytes, &[1], THUMBNAIL_SCALE)?;
        match rendered.pop() {
            Some((_, image)) => ImageProcessor::from_dynamic(image)
                .encode(OutputImageFormat::Jpeg, THUMBNAIL_QUALITY)
                .map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // pdfium is a runtime dependency; these tests only assert behaviour that
    // holds whether or not the library is installed.

    #[test]
    fn bogus_library_path_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        match PdfRasterizer::new(Some(&dir.path().join("missing.so"))) {
            Ok(_) => {}
            Err(FolioError::RenderError(msg)) => assert!(msg.contains(PDFIUM_LIB_PATH_ENV)),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn renders_requested_pages_when_pdfium_is_available() {
        let Ok(rasterizer) = PdfRasterizer::new(None) else {
            return;
        };
        let bytes = crate::pdf::fixtures::sample_pdf(3, "R");

        assert_eq!(rasterizer.page_count(&bytes).unwrap(), 3);
        let rendered = rasterizer.render_pages(&bytes, &[3, 1, 9], 1.0).unwrap();
        let numbers: Vec<u32> = rendered.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![3, 1]);
        assert!(rendered[0].1.width() > 0);

        let thumbs = rasterizer.thumbnails(&bytes, 2).unwrap();
        assert_eq!(thumbs.len(), 2);
        assert!(rasterizer.first_page_thumbnail(&bytes).unwrap().is_some());
    }
}
