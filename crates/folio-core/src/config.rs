// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::types::{OutputImageFormat, PaperSize};

const CONFIG_FILE: &str = "config.json";

/// Fallback when `max_width` is zero.
pub const DEFAULT_MAX_WIDTH: u32 = 1600;

/// The options every tool reads from. Mirrors the controls next to the
/// tool buttons: quality slider, max width, page range, output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    /// Lossy encoder quality in 0.0..=1.0 (ignored for PNG).
    pub image_quality: f32,
    /// Maximum width in pixels for the compress tool. 0 means the default.
    pub max_width: u32,
    /// Page selection (`"1-3,5"`) or, for reorder, page order (`"3,1,2"`).
    pub page_range: String,
    /// Encoding for rasterised pages and compressed images.
    pub output_format: OutputImageFormat,
    /// Page size for images-to-PDF.
    pub paper_size: PaperSize,
    /// Render scale for PDF-to-images (1.0 = 72 DPI).
    pub render_scale: f32,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            image_quality: 0.8,
            max_width: DEFAULT_MAX_WIDTH,
            page_range: String::new(),
            output_format: OutputImageFormat::Jpeg,
            paper_size: PaperSize::A4,
            render_scale: 2.0,
        }
    }
}

/// Map a 0.0–1.0 quality onto the 1–100 scale used by JPEG encoders.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

impl ToolOptions {
    /// Max width with 0 replaced by [`DEFAULT_MAX_WIDTH`].
    pub fn effective_max_width(&self) -> u32 {
        if self.max_width == 0 {
            DEFAULT_MAX_WIDTH
        } else {
            self.max_width
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.image_quality) {
            return Err(FolioError::InvalidOption(format!(
                "image quality must be between 0.0 and 1.0, got {}",
                self.image_quality
            )));
        }
        if !(self.render_scale > 0.0 && self.render_scale <= 10.0) {
            return Err(FolioError::InvalidOption(format!(
                "render scale must be in (0, 10], got {}",
                self.render_scale
            )));
        }
        Ok(())
    }
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default tool options; command-line flags override them per run.
    pub options: ToolOptions,
    /// Where output files are written. `None` means the working directory.
    pub output_dir: Option<PathBuf>,
    /// Directory holding the OCR detection and recognition models.
    pub ocr_model_dir: Option<PathBuf>,
    /// Explicit path to the pdfium shared library.
    pub pdfium_library_path: Option<PathBuf>,
    /// Render a first-page thumbnail for each PDF added to a session.
    pub thumbnails: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            options: ToolOptions::default(),
            output_dir: None,
            ocr_model_dir: None,
            pdfium_library_path: None,
            thumbnails: true,
        }
    }
}

impl AppConfig {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };
        let config: Self = serde_json::from_str(&data)?;
        config.options.validate()?;
        Ok(config)
    }

    /// Write settings to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Default location: `$XDG_CONFIG_HOME/folio/config.json`, falling back to
    /// `~/.config/folio/config.json`.
    pub fn default_path() -> PathBuf {
        config_dir().join("folio").join(CONFIG_FILE)
    }
}

fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    PathBuf::from(".")
}
