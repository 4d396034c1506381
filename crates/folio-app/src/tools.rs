// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The eight tools. Each one reads the session's files and options, drives
// the engines, and returns a single output file plus its status line.
// Per-item progress is reported through `info!` events.

use folio_core::error::{FolioError, Result};
use folio_core::{Artifact, Tool, ToolOptions, parse_page_order, parse_page_range};
use folio_document::{
    ArchiveBuilder, ImageProcessor, PdfAssembler, PdfReader, PdfWriter, ScanEnhancer,
};
use tracing::{info, instrument};

use crate::output::{file_stem, pdf_stem};
use crate::services::engines::Engines;
use crate::session::{Session, SessionFile};

/// A finished tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub artifact: Artifact,
    pub status: String,
}

impl ToolOutput {
    fn new(artifact: Artifact, status: &str) -> Self {
        Self {
            artifact,
            status: status.to_string(),
        }
    }
}

fn nothing_to_do(message: &str) -> FolioError {
    FolioError::NoMatchingInput(message.to_string())
}

/// Run `tool` over the session. Errors abort the whole run; nothing is
/// partially produced.
#[instrument(skip(session, engines), fields(files = session.len()))]
pub fn run(tool: Tool, session: &Session, engines: &mut Engines) -> Result<ToolOutput> {
    if session.is_empty() {
        return Err(nothing_to_do("Add files first"));
    }
    session.options.validate()?;
    info!("Processing...");

    let options = &session.options;
    match tool {
        Tool::Merge => merge(session),
        Tool::Split => split(session, options),
        Tool::PdfToImages => pdf_to_images(session, options, engines),
        Tool::ImagesToPdf => images_to_pdf(session, options),
        Tool::Compress => compress(session, options),
        Tool::Rotate => rotate(session, options),
        Tool::Reorder => reorder(session, options),
        Tool::Ocr => ocr(session, engines),
    }
}

fn open_pdf(file: &SessionFile) -> Result<PdfReader> {
    PdfReader::from_bytes(&file.bytes).map_err(|err| match err {
        FolioError::PdfError(detail) => FolioError::PdfError(format!("{}: {}", file.name, detail)),
        other => other,
    })
}

fn decode_image(file: &SessionFile) -> Result<ImageProcessor> {
    ImageProcessor::from_bytes(&file.bytes).map_err(|err| match err {
        FolioError::ImageError(detail) => {
            FolioError::ImageError(format!("{}: {}", file.name, detail))
        }
        other => other,
    })
}

// -- PDF tools ----------------------------------------------------------------

fn merge(session: &Session) -> Result<ToolOutput> {
    let pdfs: Vec<&SessionFile> = session.pdfs().collect();
    if pdfs.is_empty() {
        return Err(nothing_to_do("No PDFs to merge"));
    }

    let mut assembler = PdfAssembler::new();
    for file in pdfs {
        assembler.append_all(&open_pdf(file)?)?;
        info!("Merged {}", file.name);
    }

    Ok(ToolOutput::new(
        Artifact::pdf("merged.pdf", assembler.finish()?),
        "Merge complete",
    ))
}

fn split(session: &Session, options: &ToolOptions) -> Result<ToolOutput> {
    let file = session.first_pdf().ok_or_else(|| nothing_to_do("No PDF found"))?;
    let reader = open_pdf(file)?;
    let pages = parse_page_range(&options.page_range, reader.page_count());
    if pages.is_empty() {
        return Err(FolioError::NoPagesMatched);
    }

    let stem = pdf_stem(&file.name);
    let mut archive = ArchiveBuilder::new();
    for page in pages {
        let bytes = reader.extract_page(page)?;
        archive.add(&format!("{stem}_page_{page}.pdf"), &bytes)?;
        info!("Extracted page {}", page);
    }

    Ok(ToolOutput::new(
        Artifact::zip(format!("{stem}_pages.zip"), archive.finish()?),
        "Split complete",
    ))
}

fn pdf_to_images(
    session: &Session,
    options: &ToolOptions,
    engines: &mut Engines,
) -> Result<ToolOutput> {
    let file = session
        .first_pdf()
        .ok_or_else(|| nothing_to_do("No PDF selected"))?;
    let total = engines.page_count(&file.bytes)?;
    let pages = parse_page_range(&options.page_range, total);
    if pages.is_empty() {
        return Err(FolioError::NoPagesMatched);
    }

    let stem = pdf_stem(&file.name);
    let extension = options.output_format.extension();
    let mut archive = ArchiveBuilder::new();
    for (page, image) in engines.render_pages(&file.bytes, &pages, options.render_scale)? {
        let encoded = ImageProcessor::from_dynamic(image)
            .encode(options.output_format, options.image_quality)?;
        archive.add(&format!("{stem}_page_{page}.{extension}"), &encoded)?;
        info!("Rendered page {}/{}", page, total);
    }

    Ok(ToolOutput::new(
        Artifact::zip(format!("{stem}_images.zip"), archive.finish()?),
        "PDF → images complete",
    ))
}

fn rotate(session: &Session, options: &ToolOptions) -> Result<ToolOutput> {
    let file = session.first_pdf().ok_or_else(|| nothing_to_do("No PDF found"))?;
    let reader = open_pdf(file)?;
    let pages = parse_page_range(&options.page_range, reader.page_count());
    if pages.is_empty() {
        return Err(FolioError::NoPagesMatched);
    }

    let bytes = reader.rotate_pages(&pages, 90)?;
    for page in &pages {
        info!("Rotated page {}", page);
    }

    Ok(ToolOutput::new(
        Artifact::pdf(format!("{}_rotated.pdf", pdf_stem(&file.name)), bytes),
        "Rotation complete",
    ))
}

fn reorder(session: &Session, options: &ToolOptions) -> Result<ToolOutput> {
    let file = session.first_pdf().ok_or_else(|| nothing_to_do("No PDF found"))?;
    let reader = open_pdf(file)?;
    let order = parse_page_order(&options.page_range, reader.page_count());
    if order.is_empty() {
        return Err(nothing_to_do(
            "Provide comma-separated page order, e.g. 3,1,2",
        ));
    }

    let bytes = reader.extract_pages(&order)?;
    Ok(ToolOutput::new(
        Artifact::pdf(format!("{}_reordered.pdf", pdf_stem(&file.name)), bytes),
        "Reorder complete",
    ))
}

// -- Image tools --------------------------------------------------------------

fn images_to_pdf(session: &Session, options: &ToolOptions) -> Result<ToolOutput> {
    let images: Vec<(&str, &[u8])> = session
        .images()
        .map(|f| (f.name.as_str(), f.bytes.as_slice()))
        .collect();
    if images.is_empty() {
        return Err(nothing_to_do("No images found"));
    }

    let bytes = PdfWriter::new(options.paper_size).create_from_images(&images)?;
    Ok(ToolOutput::new(
        Artifact::pdf("images-merged.pdf", bytes),
        "Images → PDF complete",
    ))
}

fn compress(session: &Session, options: &ToolOptions) -> Result<ToolOutput> {
    let images: Vec<&SessionFile> = session.images().collect();
    if images.is_empty() {
        return Err(nothing_to_do("No images found"));
    }

    let max_width = options.effective_max_width();
    let extension = options.output_format.extension();
    let mut archive = ArchiveBuilder::new();
    for file in images {
        let encoded = decode_image(file)?
            .fit_to_width(max_width)
            .encode(options.output_format, options.image_quality)?;
        archive.add(&format!("{}.{}", file_stem(&file.name), extension), &encoded)?;
        info!("Compressed {}", file.name);
    }

    Ok(ToolOutput::new(
        Artifact::zip("images-compressed.zip", archive.finish()?),
        "Compression complete",
    ))
}

fn ocr(session: &Session, engines: &mut Engines) -> Result<ToolOutput> {
    let images: Vec<&SessionFile> = session.images().collect();
    if images.is_empty() {
        return Err(nothing_to_do("No images found"));
    }

    let mut archive = ArchiveBuilder::new();
    for file in images {
        info!("Running OCR on {}...", file.name);
        let prepared = ScanEnhancer::from_dynamic(decode_image(file)?.into_dynamic())
            .prepare_for_ocr()
            .into_dynamic();
        let text = engines.recognize_text(&prepared)?;
        archive.add(&format!("{}.txt", file_stem(&file.name)), text.as_bytes())?;
        info!("OCR complete for {}", file.name);
    }

    Ok(ToolOutput::new(
        Artifact::zip("ocr-results.zip", archive.finish()?),
        "OCR finished",
    ))
}
