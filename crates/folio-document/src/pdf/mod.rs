// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading, extracting, merging, rotating, and creating PDFs.

pub mod reader;
pub mod writer;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

pub use reader::{PdfAssembler, PdfReader, merge_documents};
pub use writer::PdfWriter;
