// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Zip packaging for multi-file tool output.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use folio_core::error::FolioError;
use tracing::{debug, instrument};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Builds a deflate-compressed zip in memory. Entries keep insertion order.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    names: HashSet<String>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            names: HashSet::new(),
        }
    }

    /// Add an entry. If `name` is already taken, ` (2)`, ` (3)`, ... is
    /// inserted before the extension. Returns the name actually used.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<String, FolioError> {
        let entry_name = unique_name(&self.names, name);

        self.writer
            .start_file(entry_name.as_str(), self.options)
            .map_err(|err| FolioError::ArchiveError(format!("{}: {}", entry_name, err)))?;
        self.writer
            .write_all(bytes)
            .map_err(|err| FolioError::ArchiveError(format!("{}: {}", entry_name, err)))?;

        debug!(entry = %entry_name, bytes = bytes.len(), "Archive entry added");
        self.names.insert(entry_name.clone());
        Ok(entry_name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Write the central directory and return the archive bytes.
    #[instrument(skip(self), fields(entries = self.names.len()))]
    pub fn finish(self) -> Result<Vec<u8>, FolioError> {
        let cursor = self
            .writer
            .finish()
            .map_err(|err| FolioError::ArchiveError(format!("failed to finish zip: {}", err)))?;
        Ok(cursor.into_inner())
    }
}

fn unique_name(taken: &HashSet<String>, name: &str) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };
    (2..)
        .map(|n| format!("{stem} ({n}){ext}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}
