// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer shared by the one-shot commands and the shell.
//
// The session and the engines sit behind `Arc<Mutex<>>` so a tool run can be
// moved onto a blocking worker with `spawn_blocking` while the caller awaits
// it. Runs are awaited one at a time, so the locks are never contended.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use folio_core::error::{FolioError, Result};
use folio_core::{AppConfig, Artifact, FileId, Tool, ToolOptions};
use folio_document::ImageProcessor;
use tracing::{debug, info, instrument};

use super::engines::Engines;
use crate::output::{self, file_stem, pdf_stem};
use crate::session::{Session, SessionFile};
use crate::tools::{self, ToolOutput};

/// Pages shown by `preview` for a PDF.
const PREVIEW_PAGES: u32 = 2;
/// Longest edge of an image preview, in pixels.
const IMAGE_PREVIEW_EDGE: u32 = 320;
const IMAGE_PREVIEW_QUALITY: f32 = 0.85;

/// One row of the file list.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub id: FileId,
    pub name: String,
    pub mime: &'static str,
    pub size: usize,
    pub has_thumb: bool,
}

impl FileSummary {
    /// `#3  scan.pdf  application/pdf • 12.5 KB`, plus a marker when a
    /// thumbnail was rendered.
    pub fn display_line(&self) -> String {
        let mut line = format!(
            "#{}  {}  {} • {}",
            self.id,
            self.name,
            self.mime,
            output::format_size(self.size)
        );
        if self.has_thumb {
            line.push_str("  [thumb]");
        }
        line
    }
}

impl From<&SessionFile> for FileSummary {
    fn from(file: &SessionFile) -> Self {
        Self {
            id: file.id,
            name: file.name.clone(),
            mime: file.document_type.mime_type(),
            size: file.size(),
            has_thumb: file.thumb.is_some(),
        }
    }
}

#[derive(Clone)]
pub struct AppServices {
    session: Arc<Mutex<Session>>,
    engines: Arc<Mutex<Engines>>,
    output_dir: PathBuf,
    thumbnails: bool,
}

impl AppServices {
    /// Build the services for one process. `options` are the effective tool
    /// options (config file plus command-line overrides).
    pub fn new(config: &AppConfig, options: ToolOptions, output_dir: PathBuf) -> Self {
        info!(output_dir = %output_dir.display(), "initialising app services");
        Self {
            session: Arc::new(Mutex::new(Session::new(options))),
            engines: Arc::new(Mutex::new(Engines::new(config))),
            output_dir,
            thumbnails: config.thumbnails,
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|_| FolioError::Internal("session lock poisoned".into()))
    }

    /// Run `f` against the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Result<R> {
        let mut session = self.session()?;
        Ok(f(&mut session))
    }

    // -- File list ------------------------------------------------------------

    /// Read and append each path in order. Stops at the first unreadable
    /// path; files added before it stay in the list.
    #[instrument(skip_all, fields(count = paths.len()))]
    pub async fn add_paths(&self, paths: &[PathBuf]) -> Result<Vec<FileId>> {
        let session = Arc::clone(&self.session);
        let engines = Arc::clone(&self.engines);
        let paths = paths.to_vec();
        let thumbnails = self.thumbnails;

        let ids = blocking(move || {
            let mut ids = Vec::with_capacity(paths.len());
            for path in &paths {
                let mut session = lock(&session, "session")?;
                let id = session.add_path(path)?;
                if thumbnails {
                    let mut engines = lock(&engines, "engines")?;
                    attach_thumbnail(&mut session, &mut engines, id);
                }
                ids.push(id);
            }
            Ok(ids)
        })
        .await?;

        info!("Added {} file(s)", ids.len());
        Ok(ids)
    }

    pub fn remove(&self, id: FileId) -> Result<String> {
        Ok(self.session()?.remove(id)?.name)
    }

    pub fn clear(&self) -> Result<()> {
        self.session()?.clear();
        info!("Cleared.");
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<FileSummary>> {
        Ok(self.session()?.files().iter().map(FileSummary::from).collect())
    }

    // -- Tools ----------------------------------------------------------------

    pub fn select_tool(&self, tool: Tool) -> Result<()> {
        self.session()?.select_tool(tool);
        Ok(())
    }

    pub fn active_tool(&self) -> Result<Tool> {
        Ok(self.session()?.active_tool())
    }

    /// Run `tool` on a blocking worker and wait for it.
    pub async fn run_tool(&self, tool: Tool) -> Result<ToolOutput> {
        let session = Arc::clone(&self.session);
        let engines = Arc::clone(&self.engines);
        blocking(move || {
            let session = lock(&session, "session")?;
            let mut engines = lock(&engines, "engines")?;
            tools::run(tool, &session, &mut engines)
        })
        .await
    }

    /// Run `tool` and write its output into the output directory.
    pub async fn run_and_write(&self, tool: Tool) -> Result<(ToolOutput, PathBuf)> {
        let output = self.run_tool(tool).await?;
        let path = output::write_artifact(&self.output_dir, &output.artifact)?;
        Ok((output, path))
    }

    // -- Preview --------------------------------------------------------------

    /// Write preview JPEGs for one file and return their paths. PDFs get
    /// their first pages rendered; images a downscaled copy.
    pub async fn preview(&self, id: FileId) -> Result<Vec<PathBuf>> {
        let file = self
            .session()?
            .get(id)
            .cloned()
            .ok_or(FolioError::UnknownFile(id))?;
        let engines = Arc::clone(&self.engines);

        let artifacts = blocking(move || {
            let mut engines = lock(&engines, "engines")?;
            preview_artifacts(&file, &mut engines)
        })
        .await?;

        artifacts
            .iter()
            .map(|artifact| output::write_artifact(&self.output_dir, artifact))
            .collect()
    }
}

/// Preview images for `file`, named `{stem}_preview_{n}.jpg`.
pub fn preview_artifacts(file: &SessionFile, engines: &mut Engines) -> Result<Vec<Artifact>> {
    let (stem, pages) = if file.document_type.is_pdf() {
        (
            pdf_stem(&file.name),
            engines.thumbnails(&file.bytes, PREVIEW_PAGES)?,
        )
    } else if file.document_type.is_image() {
        let thumb = ImageProcessor::from_bytes(&file.bytes)?
            .thumbnail(IMAGE_PREVIEW_EDGE)
            .encode(folio_core::OutputImageFormat::Jpeg, IMAGE_PREVIEW_QUALITY)?;
        (file_stem(&file.name), vec![thumb])
    } else {
        return Err(FolioError::UnsupportedDocument(format!(
            "No preview available for {} ({})",
            file.name,
            file.document_type.mime_type()
        )));
    };

    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(index, bytes)| Artifact {
            name: format!("{stem}_preview_{}.jpg", index + 1),
            mime: "image/jpeg",
            bytes,
        })
        .collect())
}

/// Render a first-page thumbnail for a newly added PDF. Failure only means
/// the file has no thumbnail.
fn attach_thumbnail(session: &mut Session, engines: &mut Engines, id: FileId) {
    let Some(file) = session.get(id) else {
        return;
    };
    if !file.document_type.is_pdf() {
        return;
    }
    match engines.first_page_thumbnail(&file.bytes) {
        Ok(Some(thumb)) => {
            if let Err(err) = session.set_thumb(id, thumb) {
                debug!(%id, error = %err, "Thumbnail dropped");
            }
        }
        Ok(None) => {}
        Err(err) => debug!(%id, error = %err, "No thumbnail"),
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| FolioError::Internal(format!("{what} lock poisoned")))
}

/// Run `f` on tokio's blocking pool and flatten the join error.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| FolioError::Internal(format!("worker task failed: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{png, sample_pdf, zip_entries};
    use std::path::Path;

    fn services(dir: &Path) -> AppServices {
        AppServices::new(
            &AppConfig::default(),
            ToolOptions::default(),
            dir.join("out"),
        )
    }

    #[tokio::test]
    async fn add_run_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, sample_pdf(1, "A")).unwrap();
        std::fs::write(&b, sample_pdf(2, "B")).unwrap();

        let svc = services(dir.path());
        let ids = svc.add_paths(&[a, b]).await.unwrap();
        assert_eq!(ids, vec![FileId(1), FileId(2)]);

        let (output, path) = svc.run_and_write(Tool::Merge).await.unwrap();
        assert_eq!(output.status, "Merge complete");
        assert_eq!(path, dir.path().join("out").join("merged.pdf"));

        let (_, second) = svc.run_and_write(Tool::Merge).await.unwrap();
        assert_eq!(second, dir.path().join("out").join("merged (2).pdf"));
    }

    #[tokio::test]
    async fn unreadable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(dir.path());
        let err = svc
            .add_paths(&[dir.path().join("missing.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::Io(_)));
    }

    #[tokio::test]
    async fn list_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, png(10, 10)).unwrap();

        let svc = services(dir.path());
        svc.add_paths(&[path]).await.unwrap();
        let rows = svc.list().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mime, "image/png");
        assert!(rows[0].display_line().starts_with("#1  photo.png  image/png • "));

        assert_eq!(svc.remove(FileId(1)).unwrap(), "photo.png");
        assert!(svc.list().unwrap().is_empty());
        assert!(matches!(
            svc.remove(FileId(1)),
            Err(FolioError::UnknownFile(_))
        ));
    }

    #[tokio::test]
    async fn image_preview_is_a_small_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, png(1000, 500)).unwrap();

        let svc = services(dir.path());
        let ids = svc.add_paths(&[path]).await.unwrap();
        let written = svc.preview(ids[0]).await.unwrap();

        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("big_preview_1.jpg"));
        let preview = image::open(&written[0]).unwrap();
        assert_eq!(preview.width(), IMAGE_PREVIEW_EDGE);
    }

    #[test]
    fn other_files_have_no_preview() {
        let mut session = Session::default();
        let id = session.add("notes.txt", b"hello".to_vec());
        let file = session.get(id).unwrap();
        let mut engines = Engines::new(&AppConfig::default());
        assert!(matches!(
            preview_artifacts(file, &mut engines),
            Err(FolioError::UnsupportedDocument(_))
        ));
    }

    #[tokio::test]
    async fn split_archive_lands_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Doc.pdf");
        std::fs::write(&path, sample_pdf(3, "D")).unwrap();

        let svc = services(dir.path());
        svc.add_paths(&[path]).await.unwrap();
        svc.with_session(|s| s.options.page_range = "2-3".into()).unwrap();
        let (_, written) = svc.run_and_write(Tool::Split).await.unwrap();

        let entries = zip_entries(&std::fs::read(written).unwrap());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "Doc_page_2.pdf");
    }

    fn renderer_available() -> bool {
        let mut engines = Engines::new(&AppConfig::default());
        matches!(engines.first_page_thumbnail(&sample_pdf(1, "P")), Ok(Some(_)))
    }

    #[tokio::test]
    async fn thumbnails_follow_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("deck.pdf");
        let photo = dir.path().join("photo.png");
        std::fs::write(&pdf, sample_pdf(2, "T")).unwrap();
        std::fs::write(&photo, png(6, 6)).unwrap();
        let paths = [pdf, photo];

        let enabled = services(dir.path());
        enabled.add_paths(&paths).await.unwrap();
        let rows = enabled.list().unwrap();
        assert_eq!(rows[0].has_thumb, renderer_available());
        assert!(!rows[1].has_thumb);
        assert_eq!(rows[0].display_line().ends_with("[thumb]"), rows[0].has_thumb);

        let config = AppConfig {
            thumbnails: false,
            ..AppConfig::default()
        };
        let disabled = AppServices::new(&config, ToolOptions::default(), dir.path().join("out"));
        disabled.add_paths(&paths).await.unwrap();
        assert!(disabled.list().unwrap().iter().all(|row| !row.has_thumb));
    }

    #[test]
    fn attach_thumbnail_skips_images_and_unknown_ids() {
        let mut session = Session::default();
        let mut engines = Engines::new(&AppConfig::default());
        let image = session.add("photo.png", png(4, 4));

        attach_thumbnail(&mut session, &mut engines, image);
        attach_thumbnail(&mut session, &mut engines, FileId(99));

        assert!(session.get(image).unwrap().thumb.is_none());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn attach_thumbnail_renders_page_one_of_a_pdf() {
        let mut session = Session::default();
        let mut engines = Engines::new(&AppConfig::default());
        let id = session.add("deck.pdf", sample_pdf(2, "T"));

        attach_thumbnail(&mut session, &mut engines, id);

        let thumb = session.get(id).unwrap().thumb.clone();
        assert_eq!(thumb.is_some(), renderer_available());
        if let Some(bytes) = thumb {
            assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
        }
    }
}
