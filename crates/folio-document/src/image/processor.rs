// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — downscale, flatten, grayscale, contrast, and re-encode
// in-memory images using the `image` crate.

use folio_core::{OutputImageFormat, jpeg_quality};
use folio_core::error::FolioError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::{debug, info, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let bytes = ImageProcessor::from_bytes(&input)?
///     .fit_to_width(1600)
///     .encode(OutputImageFormat::Jpeg, 0.8)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, FolioError> {
        let img = image::load_from_memory(data).map_err(|err| {
            FolioError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Resize the image to fit within `max_width` x `max_height`, preserving
    /// aspect ratio.
    pub fn resize(self, max_width: u32, max_height: u32) -> Self {
        let resized = self
            .image
            .resize(max_width, max_height, FilterType::Lanczos3);
        Self { image: resized }
    }

    /// Shrink the image so it is at most `max_width` pixels wide, preserving
    /// aspect ratio. Never upscales. New dimensions are rounded down (and kept
    /// at least one pixel).
    #[instrument(skip(self), fields(max_width))]
    pub fn fit_to_width(self, max_width: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        let ratio = (max_width as f64 / width.max(1) as f64).min(1.0);
        if ratio >= 1.0 {
            return self;
        }

        let new_w = ((width as f64 * ratio).floor() as u32).max(1);
        let new_h = ((height as f64 * ratio).floor() as u32).max(1);
        info!(from_w = width, from_h = height, new_w, new_h, "Downscaling image");

        Self {
            image: self.image.resize_exact(new_w, new_h, FilterType::CatmullRom),
        }
    }

    /// Shrink so the longest edge is at most `max_edge` pixels.
    pub fn thumbnail(self, max_edge: u32) -> Self {
        if self.image.width() <= max_edge && self.image.height() <= max_edge {
            return self;
        }
        Self {
            image: self.image.thumbnail(max_edge, max_edge),
        }
    }

    /// Composite the image over an opaque white background.
    pub fn flatten_alpha(self) -> Self {
        if !self.image.color().has_alpha() {
            return self;
        }

        let rgba = self.image.to_rgba8();
        let flattened = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let alpha = a as u32;
            let over_white = |channel: u8| -> u8 {
                ((channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8
            };
            Rgba([over_white(r), over_white(g), over_white(b), 255])
        });

        Self {
            image: DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(flattened).to_rgb8()),
        }
    }

    /// Convert the image to grayscale (luma).
    pub fn grayscale(self) -> Self {
        Self {
            image: self.image.grayscale(),
        }
    }

    /// Adjust contrast by a factor. Values > 1.0 increase contrast; values
    /// < 1.0 decrease it. A value of 1.0 is a no-op.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        let rgba = self.image.to_rgba8();

        let contrasted = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
            let adjust = |channel: u8| -> u8 {
                let val = factor * (channel as f32 - 128.0) + 128.0;
                val.clamp(0.0, 255.0) as u8
            };
            Rgba([adjust(r), adjust(g), adjust(b), a])
        });

        Self {
            image: DynamicImage::ImageRgba8(contrasted),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode in the requested output format. `quality` (0.0–1.0) applies to
    /// JPEG only; JPEG output is flattened onto white first.
    pub fn encode(&self, format: OutputImageFormat, quality: f32) -> Result<Vec<u8>, FolioError> {
        match format {
            OutputImageFormat::Png => self.to_png_bytes(),
            OutputImageFormat::Jpeg => {
                self.to_jpeg_bytes(jpeg_quality(quality))
            }
        }
    }

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, FolioError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, FolioError> {
        let mut buffer = Vec::new();
        let rgb = ImageProcessor::from_dynamic(self.image.clone())
            .flatten_alpha()
            .into_dynamic()
            .to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            FolioError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, FolioError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| FolioError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, pixel: Rgba<u8>) -> ImageProcessor {
        ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width, height, pixel,
        )))
    }

    #[test]
    fn fit_to_width_downscales_proportionally() {
        let out = solid(3200, 101, Rgba([0, 0, 0, 255])).fit_to_width(1600);
        assert_eq!((out.width(), out.height()), (1600, 50));
    }

    #[test]
    fn fit_to_width_never_upscales() {
        let out = solid(800, 600, Rgba([0, 0, 0, 255])).fit_to_width(1600);
        assert_eq!((out.width(), out.height()), (800, 600));
    }

    #[test]
    fn fit_to_width_keeps_at_least_one_pixel() {
        let out = solid(1000, 1, Rgba([0, 0, 0, 255])).fit_to_width(10);
        assert_eq!((out.width(), out.height()), (10, 1));
    }

    #[test]
    fn flatten_turns_transparent_white() {
        let out = solid(2, 2, Rgba([0, 0, 0, 0])).flatten_alpha().into_dynamic();
        assert!(!out.color().has_alpha());
        assert_eq!(out.to_rgb8().get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn encode_png_and_jpeg() {
        let img = solid(16, 8, Rgba([200, 10, 10, 255]));

        let png = img.encode(OutputImageFormat::Png, 0.5).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);

        let jpeg = img.encode(OutputImageFormat::Jpeg, 0.5).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn lower_quality_is_smaller() {
        // A gradient gives the encoder something to throw away.
        let gradient = RgbaImage::from_fn(128, 128, |x, y| {
            Rgba([(x * 2) as u8, (y * 2) as u8, ((x + y) % 256) as u8, 255])
        });
        let img = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(gradient));
        let low = img.encode(OutputImageFormat::Jpeg, 0.1).unwrap();
        let high = img.encode(OutputImageFormat::Jpeg, 1.0).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn thumbnail_bounds_longest_edge() {
        let out = solid(640, 320, Rgba([1, 2, 3, 255])).thumbnail(320);
        assert_eq!(out.width(), 320);
        assert!(out.height() <= 160);
    }

    #[test]
    fn decode_failure_is_image_error() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"\x00\x01"),
            Err(FolioError::ImageError(_))
        ));
    }
}
