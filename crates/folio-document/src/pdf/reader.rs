// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open, inspect, extract, reorder, merge, and rotate existing PDF
// documents using the `lopdf` crate.

use std::collections::HashSet;

use folio_core::error::FolioError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, instrument, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
/// They are copied onto a page before it leaves its original tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards the parent walk against malformed (cyclic) page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Reads and manipulates existing PDF files.
///
/// Wraps `lopdf::Document` and provides higher-level operations such as
/// extracting page selections, rotating pages, and merging documents.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, FolioError> {
        let document = Document::load_mem(data).map_err(|err| {
            FolioError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// The rotation a viewer applies to `page_number` (1-indexed), including
    /// any `/Rotate` inherited from the page tree. Always in 0..360.
    pub fn effective_rotation(&self, page_number: u32) -> Result<i64, FolioError> {
        let page_id = self.page_id(page_number)?;
        let rotation = inherited_attribute(&self.document, page_id, b"Rotate")
            .and_then(|obj| rotation_value(&obj))
            .unwrap_or(0);
        Ok(rotation.rem_euclid(360))
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract a single page (1-indexed) into a new standalone PDF document.
    pub fn extract_page(&self, page_number: u32) -> Result<Vec<u8>, FolioError> {
        self.extract_pages(&[page_number])
    }

    /// Build a new PDF from `page_numbers` (1-indexed), in the given order.
    ///
    /// A page listed more than once appears more than once; each occurrence is
    /// an independent page object sharing the original's content streams.
    #[instrument(skip(self), fields(count = page_numbers.len()))]
    pub fn extract_pages(&self, page_numbers: &[u32]) -> Result<Vec<u8>, FolioError> {
        if page_numbers.is_empty() {
            return Err(FolioError::NoPagesMatched);
        }

        let mut assembler = PdfAssembler::new();
        assembler.append_pages(self, page_numbers)?;
        let output = assembler.finish()?;

        debug!(output_bytes = output.len(), "Pages extracted");
        Ok(output)
    }

    /// Merge this document with one or more other PDF byte-slices, producing a
    /// combined PDF. Pages appear in the order: self, then each supplied
    /// document in order.
    #[instrument(skip_all, fields(additional_count = others.len()))]
    pub fn merge(&self, others: &[&[u8]]) -> Result<Vec<u8>, FolioError> {
        info!(
            base_pages = self.page_count(),
            additional_documents = others.len(),
            "Merging PDFs"
        );

        let mut assembler = PdfAssembler::new();
        assembler.append_all(self)?;

        for (index, other_bytes) in others.iter().enumerate() {
            let other = PdfReader::from_bytes(other_bytes).map_err(|err| {
                FolioError::PdfError(format!("additional PDF #{}: {}", index + 1, err))
            })?;
            assembler.append_all(&other)?;
        }

        let output = assembler.finish()?;
        debug!(output_bytes = output.len(), "Merge complete");
        Ok(output)
    }

    // -- Rotation -------------------------------------------------------------

    /// Rotate each page in `page_numbers` (1-indexed) by `degrees` clockwise
    /// (must be a multiple of 90), on top of its current rotation.
    ///
    /// Returns the full document as bytes with the rotation applied. Every
    /// other page and object is left untouched.
    #[instrument(skip(self), fields(count = page_numbers.len(), degrees))]
    pub fn rotate_pages(&self, page_numbers: &[u32], degrees: i64) -> Result<Vec<u8>, FolioError> {
        if degrees % 90 != 0 {
            return Err(FolioError::PdfError(format!(
                "rotation must be a multiple of 90, got {}",
                degrees
            )));
        }

        let mut doc = self.document.clone();

        for &page_number in page_numbers {
            let page_id = self.page_id(page_number)?;
            let existing_rotation = self.effective_rotation(page_number)?;
            let new_rotation = (existing_rotation + degrees).rem_euclid(360);

            let page = doc.get_dictionary_mut(page_id).map_err(|err| {
                FolioError::PdfError(format!("page {} is not a dictionary: {}", page_number, err))
            })?;
            page.set("Rotate", Object::Integer(new_rotation));

            info!(page_number, existing_rotation, new_rotation, "Rotated page");
        }

        save_document(&mut doc, "rotated PDF")
    }

    // -- Helpers --------------------------------------------------------------

    /// Resolve a 1-indexed page number to its object id.
    fn page_id(&self, page_number: u32) -> Result<ObjectId, FolioError> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            FolioError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }
}

/// Concatenate every page of each document, in order. Errors name the
/// 1-based position of the document that failed to parse.
pub fn merge_documents(documents: &[Vec<u8>]) -> Result<Vec<u8>, FolioError> {
    if documents.is_empty() {
        return Err(FolioError::PdfError("nothing to merge".into()));
    }
    let mut assembler = PdfAssembler::new();
    for (index, bytes) in documents.iter().enumerate() {
        let source = PdfReader::from_bytes(bytes)
            .map_err(|err| FolioError::PdfError(format!("PDF #{}: {}", index + 1, err)))?;
        assembler.append_all(&source)?;
    }
    assembler.finish()
}

/// Builds a new PDF page by page from one or more source documents.
///
/// Each source is renumbered into a fresh id range before its objects are
/// copied, so documents never collide. Pages are re-parented onto a single
/// flat page tree and inherited attributes are materialised on each page.
/// Objects that end up unreachable (old catalogs, unselected pages) are pruned
/// when the document is finished.
pub struct PdfAssembler {
    target: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfAssembler {
    pub fn new() -> Self {
        let mut target = Document::with_version("1.5");
        let pages_id = target.new_object_id();
        Self {
            target,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append every page of `source` in document order.
    pub fn append_all(&mut self, source: &PdfReader) -> Result<(), FolioError> {
        let all: Vec<u32> = (1..=source.page_count()).collect();
        self.append_pages(source, &all)
    }

    /// Append the listed pages (1-indexed) of `source`, in the listed order.
    pub fn append_pages(
        &mut self,
        source: &PdfReader,
        page_numbers: &[u32],
    ) -> Result<(), FolioError> {
        let mut doc = source.document.clone();
        doc.renumber_objects_with(self.target.max_id + 1);

        let pages = doc.get_pages();
        let mut copies = Vec::with_capacity(page_numbers.len());
        for &page_number in page_numbers {
            let page_id = *pages.get(&page_number).ok_or_else(|| {
                FolioError::PdfError(format!(
                    "page {} out of range (document has {} pages)",
                    page_number,
                    pages.len()
                ))
            })?;
            let mut page = standalone_page(&doc, page_id)?;
            page.set("Parent", Object::Reference(self.pages_id));
            copies.push((page_id, page));
        }

        self.target.max_id = self.target.max_id.max(doc.max_id);
        self.target.objects.extend(std::mem::take(&mut doc.objects));

        let mut placed = HashSet::new();
        for (page_id, page) in copies {
            let id = if placed.insert(page_id) {
                self.target.objects.insert(page_id, Object::Dictionary(page));
                page_id
            } else {
                self.target.add_object(Object::Dictionary(page))
            };
            self.kids.push(Object::Reference(id));
        }

        debug!(
            appended = page_numbers.len(),
            total = self.kids.len(),
            "Pages appended"
        );
        Ok(())
    }

    /// Write the page tree and catalog, drop unreachable objects, and
    /// serialise the document.
    pub fn finish(mut self) -> Result<Vec<u8>, FolioError> {
        if self.kids.is_empty() {
            return Err(FolioError::NoPagesMatched);
        }

        let count = self.kids.len() as i64;
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(count)),
            ("Kids", Object::Array(self.kids)),
        ]);
        self.target
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]);
        let catalog_id = self.target.add_object(Object::Dictionary(catalog));
        self.target.trailer.set("Root", Object::Reference(catalog_id));

        let pruned = self.target.prune_objects();
        debug!(pruned = pruned.len(), pages = count, "Document assembled");

        save_document(&mut self.target, "assembled PDF")
    }
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Clone a page dictionary and copy onto it every inheritable attribute it
/// would otherwise receive from its ancestors.
fn standalone_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary, FolioError> {
    let mut page = doc
        .get_dictionary(page_id)
        .map_err(|err| {
            FolioError::PdfError(format!("cannot read page object {:?}: {}", page_id, err))
        })?
        .clone();

    for key in INHERITABLE_KEYS {
        if page.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(doc, page_id, key) {
            page.set(key.to_vec(), value);
        }
    }

    Ok(page)
}

/// Look up `key` on the page, then on each ancestor up the /Parent chain.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node_id = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    warn!(?page_id, "Page tree deeper than {} levels", MAX_TREE_DEPTH);
    None
}

/// Read a /Rotate value, accepting both integer and real encodings.
fn rotation_value(obj: &Object) -> Option<i64> {
    match obj {
        Object::Integer(value) => Some(*value),
        Object::Real(value) => Some(*value as i64),
        _ => None,
    }
}

fn save_document(doc: &mut Document, what: &str) -> Result<Vec<u8>, FolioError> {
    let mut output = Vec::new();
    doc.save_to(&mut output).map_err(|err| {
        FolioError::PdfError(format!("failed to serialise {}: {}", what, err))
    })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::{page_labels, sample_pdf, sample_pdf_with_inherited_attributes};

    #[test]
    fn page_count_matches_fixture() {
        let reader = PdfReader::from_bytes(&sample_pdf(4, "A")).unwrap();
        assert_eq!(reader.page_count(), 4);
    }

    #[test]
    fn garbage_is_a_pdf_error() {
        let result = PdfReader::from_bytes(b"not a pdf at all");
        assert!(matches!(result, Err(FolioError::PdfError(_))));
    }

    #[test]
    fn extract_single_page() {
        let reader = PdfReader::from_bytes(&sample_pdf(5, "A")).unwrap();
        let output = reader.extract_page(3).unwrap();
        assert_eq!(page_labels(&output), vec!["A-Page-3"]);
    }

    #[test]
    fn extract_follows_requested_order_and_repeats() {
        let reader = PdfReader::from_bytes(&sample_pdf(3, "A")).unwrap();
        let output = reader.extract_pages(&[3, 1, 1]).unwrap();
        assert_eq!(page_labels(&output), vec!["A-Page-3", "A-Page-1", "A-Page-1"]);
    }

    #[test]
    fn extract_out_of_range_fails() {
        let reader = PdfReader::from_bytes(&sample_pdf(2, "A")).unwrap();
        assert!(matches!(reader.extract_page(3), Err(FolioError::PdfError(_))));
        assert!(matches!(reader.extract_page(0), Err(FolioError::PdfError(_))));
        assert!(matches!(reader.extract_pages(&[]), Err(FolioError::NoPagesMatched)));
    }

    #[test]
    fn merge_keeps_document_order() {
        let first = sample_pdf(2, "A");
        let second = sample_pdf(3, "B");
        let reader = PdfReader::from_bytes(&first).unwrap();

        let merged = reader.merge(&[&second]).unwrap();
        assert_eq!(
            page_labels(&merged),
            vec!["A-Page-1", "A-Page-2", "B-Page-1", "B-Page-2", "B-Page-3"]
        );
    }

    #[test]
    fn merge_documents_concatenates_in_order() {
        let merged = merge_documents(&[sample_pdf(1, "X"), sample_pdf(2, "Y")]).unwrap();
        assert_eq!(page_labels(&merged), vec!["X-Page-1", "Y-Page-1", "Y-Page-2"]);

        let err = merge_documents(&[sample_pdf(1, "X"), b"junk".to_vec()]).unwrap_err();
        assert!(err.to_string().contains("PDF #2"));
        assert!(merge_documents(&[]).is_err());
    }

    #[test]
    fn merge_reports_bad_additional_document() {
        let reader = PdfReader::from_bytes(&sample_pdf(1, "A")).unwrap();
        let err = reader.merge(&[b"junk"]).unwrap_err();
        assert!(err.to_string().contains("#1"), "got {err}");
    }

    #[test]
    fn inherited_attributes_survive_extraction() {
        let reader = PdfReader::from_bytes(&sample_pdf_with_inherited_attributes(2, 90)).unwrap();
        let output = reader.extract_page(2).unwrap();

        let doc = Document::load_mem(&output).unwrap();
        let page_id = doc.get_pages()[&1];
        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
        assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
    }

    #[test]
    fn rotate_adds_to_existing_rotation() {
        let reader = PdfReader::from_bytes(&sample_pdf(3, "A")).unwrap();
        let once = reader.rotate_pages(&[2], 90).unwrap();

        let rotated = PdfReader::from_bytes(&once).unwrap();
        assert_eq!(rotated.effective_rotation(1).unwrap(), 0);
        assert_eq!(rotated.effective_rotation(2).unwrap(), 90);
        assert_eq!(rotated.page_count(), 3);
    }

    #[test]
    fn rotate_wraps_inherited_rotation() {
        let reader = PdfReader::from_bytes(&sample_pdf_with_inherited_attributes(2, 270)).unwrap();
        assert_eq!(reader.effective_rotation(1).unwrap(), 270);

        let output = reader.rotate_pages(&[1], 90).unwrap();
        let rotated = PdfReader::from_bytes(&output).unwrap();
        assert_eq!(rotated.effective_rotation(1).unwrap(), 0);
        assert_eq!(rotated.effective_rotation(2).unwrap(), 270);
    }

    #[test]
    fn rotate_rejects_odd_angles() {
        let reader = PdfReader::from_bytes(&sample_pdf(1, "A")).unwrap();
        assert!(reader.rotate_pages(&[1], 45).is_err());
    }

    #[test]
    fn empty_assembler_has_no_pages() {
        assert!(matches!(
            PdfAssembler::new().finish(),
            Err(FolioError::NoPagesMatched)
        ));
    }
}
