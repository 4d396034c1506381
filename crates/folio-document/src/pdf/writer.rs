// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — create new PDF documents from raster images using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use folio_core::PaperSize;
use folio_core::error::FolioError;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

use crate::image::processor::ImageProcessor;

/// At 72 DPI one image pixel is one PDF point, which keeps the placement
/// arithmetic in a single unit.
const PLACEMENT_DPI: f32 = 72.0;

const DOCUMENT_TITLE: &str = "Folio Images";

/// Creates new PDF documents from raster images, one image per page.
pub struct PdfWriter {
    paper_size: PaperSize,
}

/// Where an image lands on its page, in points from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl PdfWriter {
    /// Create a new writer targeting the given paper size.
    pub fn new(paper_size: PaperSize) -> Self {
        Self { paper_size }
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Scale an image of `width` x `height` pixels to fill the page as far as
    /// its aspect ratio allows (upscaling small images), centred.
    pub fn placement(&self, width: u32, height: u32) -> Placement {
        let (page_w, page_h) = self.paper_size.dimensions_pt();
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let scale = (page_w / w).min(page_h / h);
        Placement {
            x: (page_w - w * scale) / 2.0,
            y: (page_h - h * scale) / 2.0,
            scale,
        }
    }

    // -- Images to PDF --------------------------------------------------------

    /// Create a PDF with one page per image, in the order given.
    ///
    /// Each entry is `(name, encoded image bytes)`; the name is only used in
    /// error messages and logs. Transparent areas are flattened onto white.
    #[instrument(skip_all, fields(images = images.len()))]
    pub fn create_from_images(&self, images: &[(&str, &[u8])]) -> Result<Vec<u8>, FolioError> {
        if images.is_empty() {
            return Err(FolioError::NoMatchingInput("No images found".into()));
        }

        let (page_w, page_h) = self.page_dimensions();
        info!(paper = ?self.paper_size, count = images.len(), "Creating image PDF");

        let mut doc = PdfDocument::new(DOCUMENT_TITLE);
        let mut pages = Vec::with_capacity(images.len());

        for &(name, bytes) in images {
            let rgb = ImageProcessor::from_bytes(bytes)
                .map_err(|err| match err {
                    FolioError::ImageError(detail) => {
                        FolioError::ImageError(format!("{name}: {detail}"))
                    }
                    other => other,
                })?
                .flatten_alpha()
                .into_dynamic()
                .to_rgb8();
            let (width, height) = rgb.dimensions();

            let raw = RawImage {
                pixels: RawImageData::U8(rgb.into_raw()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let placement = self.placement(width, height);
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(placement.x)),
                    translate_y: Some(Pt(placement.y)),
                    scale_x: Some(placement.scale),
                    scale_y: Some(placement.scale),
                    dpi: Some(PLACEMENT_DPI),
                    rotate: None,
                },
            }];
            pages.push(PdfPage::new(page_w, page_h, ops));

            debug!(name, width, height, scale = placement.scale, "Image placed on page");
            info!("Added {}", name);
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(warnings = warnings.len(), output_bytes = output.len(), "Image PDF saved");

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 120, 200, 128]),
        ));
        let mut buffer = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn wide_image_fills_page_width() {
        let writer = PdfWriter::new(PaperSize::A4);
        let (page_w, page_h) = PaperSize::A4.dimensions_pt();
        let placed = writer.placement(2000, 1000);

        assert!((2000.0 * placed.scale - page_w).abs() < 0.01);
        assert!(placed.x.abs() < 0.01);
        assert!((placed.y - (page_h - 1000.0 * placed.scale) / 2.0).abs() < 0.01);
    }

    #[test]
    fn small_image_is_upscaled() {
        let placed = PdfWriter::new(PaperSize::A4).placement(10, 10);
        assert!(placed.scale > 1.0);
    }

    #[test]
    fn one_page_per_image() {
        let writer = PdfWriter::new(PaperSize::A4);
        let first = png(40, 20);
        let second = png(20, 40);
        let output = writer
            .create_from_images(&[("a.png", first.as_slice()), ("b.png", second.as_slice())])
            .unwrap();

        let doc = lopdf::Document::load_mem(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn no_images_is_nothing_to_do() {
        let result = PdfWriter::new(PaperSize::A4).create_from_images(&[]);
        assert!(matches!(result, Err(FolioError::NoMatchingInput(_))));
    }

    #[test]
    fn undecodable_image_names_the_file() {
        let err = PdfWriter::new(PaperSize::A4)
            .create_from_images(&[("broken.jpg", &b"nope"[..])])
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("image processing failed: broken.jpg: "), "got {message}");
        assert_eq!(message.matches("image processing failed").count(), 1, "got {message}");
    }
}
