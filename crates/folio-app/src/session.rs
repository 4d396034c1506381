// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The working set: the files the user has added, the selected tool, and the
// tool options. Nothing here is persisted.

use std::path::Path;

use folio_core::error::{FolioError, Result};
use folio_core::{DocumentType, FileId, Tool, ToolOptions};
use tracing::{debug, info};

/// One added file.
#[derive(Debug, Clone)]
pub struct SessionFile {
    pub id: FileId,
    pub name: String,
    pub document_type: DocumentType,
    pub bytes: Vec<u8>,
    /// JPEG preview of the first page (PDFs) or `None` when not generated.
    pub thumb: Option<Vec<u8>>,
}

impl SessionFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    files: Vec<SessionFile>,
    next_id: u64,
    active_tool: Tool,
    pub options: ToolOptions,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ToolOptions::default())
    }
}

impl Session {
    pub fn new(options: ToolOptions) -> Self {
        Self {
            files: Vec::new(),
            next_id: 1,
            active_tool: Tool::default(),
            options,
        }
    }

    /// Append a file. Its type comes from the content, falling back to the name.
    pub fn add(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> FileId {
        let name = name.into();
        let id = FileId(self.next_id);
        self.next_id += 1;

        let document_type = DocumentType::detect(&name, &bytes);
        debug!(%id, name, mime = document_type.mime_type(), bytes = bytes.len(), "File added");

        self.files.push(SessionFile {
            id,
            name,
            document_type,
            bytes,
            thumb: None,
        });
        id
    }

    /// Read `path` and add it under its file name.
    pub fn add_path(&mut self, path: &Path) -> Result<FileId> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.add(name, bytes))
    }

    pub fn remove(&mut self, id: FileId) -> Result<SessionFile> {
        let index = self
            .files
            .iter()
            .position(|f| f.id == id)
            .ok_or(FolioError::UnknownFile(id))?;
        let removed = self.files.remove(index);
        info!(%id, name = %removed.name, "File removed");
        Ok(removed)
    }

    /// Drop every file. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[SessionFile] {
        &self.files
    }

    pub fn get(&self, id: FileId) -> Option<&SessionFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn set_thumb(&mut self, id: FileId, thumb: Vec<u8>) -> Result<()> {
        let file = self
            .files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(FolioError::UnknownFile(id))?;
        file.thumb = Some(thumb);
        Ok(())
    }

    /// PDFs in the order they were added.
    pub fn pdfs(&self) -> impl Iterator<Item = &SessionFile> {
        self.files.iter().filter(|f| f.document_type.is_pdf())
    }

    /// Images in the order they were added.
    pub fn images(&self) -> impl Iterator<Item = &SessionFile> {
        self.files.iter().filter(|f| f.document_type.is_image())
    }

    pub fn first_pdf(&self) -> Option<&SessionFile> {
        self.pdfs().next()
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.active_tool = tool;
    }

    pub fn active_tool(&self) -> Tool {
        self.active_tool
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_never_reused() {
        let mut session = Session::default();
        let a = session.add("a.pdf", b"%PDF-1.4".to_vec());
        let b = session.add("b.pdf", b"%PDF-1.4".to_vec());
        assert_ne!(a, b);

        session.remove(b).unwrap();
        session.clear();
        let c = session.add("c.pdf", b"%PDF-1.4".to_vec());
        assert_eq!(c, FileId(3));
    }

    #[test]
    fn removing_unknown_id_fails() {
        let mut session = Session::default();
        session.add("a.pdf", b"%PDF-1.4".to_vec());
        assert!(matches!(
            session.remove(FileId(42)),
            Err(FolioError::UnknownFile(FileId(42)))
        ));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn filters_keep_insertion_order() {
        let mut session = Session::default();
        session.add("one.pdf", b"%PDF-1.4".to_vec());
        session.add("pic.png", b"\x89PNG\r\n\x1a\n".to_vec());
        session.add("notes.txt", b"hello".to_vec());
        session.add("two.pdf", b"%PDF-1.7".to_vec());

        let pdfs: Vec<&str> = session.pdfs().map(|f| f.name.as_str()).collect();
        assert_eq!(pdfs, ["one.pdf", "two.pdf"]);
        let images: Vec<&str> = session.images().map(|f| f.name.as_str()).collect();
        assert_eq!(images, ["pic.png"]);
        assert_eq!(session.first_pdf().map(|f| f.name.as_str()), Some("one.pdf"));
        assert_eq!(
            session.files()[2].document_type,
            DocumentType::Other
        );
    }

    #[test]
    fn tool_selection() {
        let mut session = Session::default();
        assert_eq!(session.active_tool(), Tool::Merge);
        session.select_tool(Tool::Ocr);
        assert_eq!(session.active_tool(), Tool::Ocr);
    }

    #[test]
    fn add_path_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Scan.PDF");
        std::fs::write(&path, b"not really a pdf").unwrap();

        let mut session = Session::default();
        let id = session.add_path(&path).unwrap();
        let file = session.get(id).unwrap();
        assert_eq!(file.name, "Scan.PDF");
        assert_eq!(file.document_type, DocumentType::Pdf);
        assert_eq!(file.size(), 16);
    }
}
