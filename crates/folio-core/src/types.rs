// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Folio.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// Identifier for a file in the session list. Unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('#');
        trimmed
            .parse::<u64>()
            .map(FileId)
            .map_err(|_| FolioError::InvalidOption(format!("not a file id: {s}")))
    }
}

/// Supported input document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    WebP,
    /// Anything else. Kept in the file list but ignored by every tool.
    Other,
}

impl DocumentType {
    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::WebP => "image/webp",
            Self::Other => "application/octet-stream",
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }

    /// True for every `image/*` type.
    pub fn is_image(&self) -> bool {
        self.mime_type().starts_with("image/")
    }

    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Identify a document from its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            return Some(Self::Pdf);
        }
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            image::ImageFormat::Tiff => Some(Self::Tiff),
            image::ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    /// Resolve the type of a newly added file.
    ///
    /// Content sniffing wins, then the file extension (so a damaged file named
    /// `*.pdf` is still offered to the PDF tools). Anything else is `Other`.
    pub fn detect(name: &str, bytes: &[u8]) -> Self {
        Self::sniff(bytes)
            .or_else(|| {
                name.rsplit_once('.')
                    .and_then(|(_, ext)| Self::from_extension(ext))
            })
            .unwrap_or(Self::Other)
    }
}

/// The eight document tools. Exactly one is selected at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Merge,
    Split,
    PdfToImages,
    ImagesToPdf,
    Compress,
    Rotate,
    Reorder,
    Ocr,
}

impl Tool {
    pub const ALL: [Tool; 8] = [
        Tool::Merge,
        Tool::Split,
        Tool::PdfToImages,
        Tool::ImagesToPdf,
        Tool::Compress,
        Tool::Rotate,
        Tool::Reorder,
        Tool::Ocr,
    ];

    /// Short key used on the command line and in the shell.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Split => "split",
            Self::PdfToImages => "pdf2img",
            Self::ImagesToPdf => "img2pdf",
            Self::Compress => "compress",
            Self::Rotate => "rotate",
            Self::Reorder => "reorder",
            Self::Ocr => "ocr",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Tool {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Tool::ALL
            .into_iter()
            .find(|tool| tool.key() == wanted)
            .ok_or_else(|| FolioError::InvalidOption(format!("unknown tool: {s}")))
    }
}

/// Encoding used for rasterised pages and compressed images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputImageFormat {
    Png,
    #[default]
    Jpeg,
}

impl OutputImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension: `png` for PNG output, `jpg` for everything else.
    pub fn extension(&self) -> &'static str {
        if self.mime_type().contains("png") {
            "png"
        } else {
            "jpg"
        }
    }
}

impl FromStr for OutputImageFormat {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" | "image/png" => Ok(Self::Png),
            "jpg" | "jpeg" | "image/jpeg" => Ok(Self::Jpeg),
            other => Err(FolioError::InvalidOption(format!(
                "unknown image format: {other} (expected png or jpeg)"
            ))),
        }
    }
}

/// Standard paper sizes for image-to-PDF pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (1/72 inch).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_pt(w as f32), mm_to_pt(h as f32))
    }
}

impl FromStr for PaperSize {
    type Err = FolioError;

    /// Accepts the named sizes (`a4`, `letter`, …) or `WIDTHxHEIGHT` in mm.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "a4" => return Ok(Self::A4),
            "a3" => return Ok(Self::A3),
            "a5" => return Ok(Self::A5),
            "letter" => return Ok(Self::Letter),
            "legal" => return Ok(Self::Legal),
            "tabloid" => return Ok(Self::Tabloid),
            _ => {}
        }
        let custom = lower.split_once('x').and_then(|(w, h)| {
            let width_mm = w.trim().parse::<u32>().ok()?;
            let height_mm = h.trim().parse::<u32>().ok()?;
            (width_mm > 0 && height_mm > 0).then_some(Self::Custom {
                width_mm,
                height_mm,
            })
        });
        custom.ok_or_else(|| FolioError::InvalidOption(format!("unknown paper size: {s}")))
    }
}

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// One produced output file, ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: "application/pdf",
            bytes,
        }
    }

    pub fn zip(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: "application/zip",
            bytes,
        }
    }
}
