// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — Core types, errors, configuration, and page-range parsing shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod page_range;
pub mod types;

pub use config::{AppConfig, ToolOptions, jpeg_quality};
pub use error::FolioError;
pub use page_range::{parse_page_order, parse_page_range};
pub use types::*;
