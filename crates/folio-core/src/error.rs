// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use thiserror::Error;

use crate::types::FileId;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Input selection --
    /// The tool had nothing to work on. The message is the status line shown
    /// to the user, e.g. "No PDFs to merge".
    #[error("{0}")]
    NoMatchingInput(String),

    #[error("No pages matched")]
    NoPagesMatched,

    #[error("no file with id {0} in this session")]
    UnknownFile(FileId),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    // -- Document errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF rendering failed: {0}")]
    RenderError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("archive creation failed: {0}")]
    ArchiveError(String),

    #[error("{0} support was not compiled into this build")]
    FeatureUnavailable(&'static str),

    // -- Storage --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A worker thread panicked or a lock was poisoned.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
