// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small hand-built PDFs for tests. Every page draws a label such as
// "A-Page-2" so tests can check which page ended up where.

use lopdf::{Dictionary, Document, Object, Stream};

/// A document with `num_pages` pages, each labelled `{prefix}-Page-{n}`.
pub fn sample_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
    build(num_pages, prefix, None)
}

/// Like [`sample_pdf`] but MediaBox, Resources, and Rotate live on the
/// /Pages node, so every page inherits them.
pub fn sample_pdf_with_inherited_attributes(num_pages: u32, rotate: i64) -> Vec<u8> {
    build(num_pages, "I", Some(rotate))
}

/// Labels of every page, in page order.
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').unwrap() + 1;
            let end = text.find(')').unwrap();
            text[start..end].to_string()
        })
        .collect()
}

fn media_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ])
}

fn resources() -> Dictionary {
    let font = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]);
    let fonts = Dictionary::from_iter(vec![("F1", Object::Dictionary(font))]);
    Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))])
}

fn build(num_pages: u32, prefix: &str, inherited_rotate: Option<i64>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let inherit = inherited_rotate.is_some();

    let mut kids = Vec::new();
    for page_num in 1..=num_pages {
        let content = format!("BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET", prefix, page_num);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        if !inherit {
            page.set("MediaBox", media_box());
            page.set("Resources", Object::Dictionary(resources()));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    if let Some(rotate) = inherited_rotate {
        pages.set("MediaBox", media_box());
        pages.set("Resources", Object::Dictionary(resources()));
        pages.set("Rotate", Object::Integer(rotate));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
