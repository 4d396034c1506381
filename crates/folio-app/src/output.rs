// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output naming and writing.

use std::path::{Path, PathBuf};

use folio_core::Artifact;
use folio_core::error::Result;
use tracing::info;

/// `report.PDF` -> `report`. Only a trailing `.pdf` (any case) is removed.
pub fn pdf_stem(name: &str) -> &str {
    let len = name.len();
    if len >= 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".pdf") {
        &name[..len - 4]
    } else {
        name
    }
}

/// `holiday.photo.jpeg` -> `holiday.photo`. Strips the last `.ext` when the
/// extension is non-empty; a name without one is returned unchanged.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => &name[..dot],
        _ => name,
    }
}

/// Human-readable size as shown in the file list: KB with one decimal.
pub fn format_size(bytes: usize) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// First path in `dir` for `name` that does not exist yet: `name`, then
/// `stem (2).ext`, `stem (3).ext`, ...
pub fn available_path(dir: &Path, name: &str) -> PathBuf {
    let first = dir.join(name);
    if !first.exists() {
        return first;
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };
    (2u32..)
        .map(|n| dir.join(format!("{stem} ({n}){ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}

/// Write `artifact` into `dir` (created if missing) without overwriting
/// anything. Returns the path written.
pub fn write_artifact(dir: &Path, artifact: &Artifact) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = available_path(dir, &artifact.name);
    std::fs::write(&path, &artifact.bytes)?;
    info!(path = %path.display(), mime = artifact.mime, bytes = artifact.bytes.len(), "Wrote output");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_stem_is_case_insensitive() {
        assert_eq!(pdf_stem("report.pdf"), "report");
        assert_eq!(pdf_stem("Report.PDF"), "Report");
        assert_eq!(pdf_stem("notes.pdf.txt"), "notes.pdf.txt");
        assert_eq!(pdf_stem("scan"), "scan");
    }

    #[test]
    fn file_stem_strips_last_extension() {
        assert_eq!(file_stem("holiday.photo.jpeg"), "holiday.photo");
        assert_eq!(file_stem("IMG_0001.PNG"), "IMG_0001");
        assert_eq!(file_stem("README"), "README");
        assert_eq!(file_stem("trailing."), "trailing.");
    }

    #[test]
    fn size_has_one_decimal() {
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(0), "0.0 KB");
    }

    #[test]
    fn existing_files_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact::pdf("merged.pdf", b"%PDF-first".to_vec());

        let first = write_artifact(dir.path(), &artifact).unwrap();
        let second = write_artifact(dir.path(), &Artifact::pdf("merged.pdf", b"%PDF-second".to_vec()))
            .unwrap();
        let third = write_artifact(dir.path(), &artifact).unwrap();

        assert_eq!(first, dir.path().join("merged.pdf"));
        assert_eq!(second, dir.path().join("merged (2).pdf"));
        assert_eq!(third, dir.path().join("merged (3).pdf"));
        assert_eq!(std::fs::read(&first).unwrap(), b"%PDF-first");
        assert_eq!(std::fs::read(&second).unwrap(), b"%PDF-second");
    }

    #[test]
    fn output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("today");
        let path = write_artifact(&nested, &Artifact::zip("a.zip", vec![1, 2, 3])).unwrap();
        assert!(path.starts_with(&nested));
    }
}
