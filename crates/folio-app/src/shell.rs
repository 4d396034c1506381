// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive shell: one command per line against a session that lives for
// the whole shell. Every command answers with status lines; a failing
// command prints its humanized error and the shell carries on.

use std::io::Write;
use std::path::PathBuf;

use folio_core::error::{FolioError, Result};
use folio_core::human_errors::humanize_error;
use folio_core::{FileId, Tool, ToolOptions};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::services::app_services::AppServices;

const HELP: &str = "\
Commands:
  add PATH...        add files to the list
  remove ID          remove a file (ids are shown by `list`)
  clear              remove every file
  list               show the file list
  tool [NAME]        show or select the tool: merge, split, pdf2img, img2pdf,
                     compress, rotate, reorder, ocr
  set KEY VALUE      change an option: quality, max-width, pages, format,
                     paper, scale
  options            show the current options
  run                run the selected tool and save its output
  preview ID         save preview images of a file
  help               show this text
  quit               leave the shell";

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Read commands from `input` until `quit` or end of input.
pub async fn run<R, W>(services: &AppServices, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "Folio shell. Type `help` for commands.")?;
    let mut lines = input.lines();

    loop {
        write!(out, "folio> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        debug!(command = line, "shell command");
        match execute(services, line, out).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(err) => writeln!(out, "{}", humanize_error(&err).status_line())?,
        }
    }
    Ok(())
}

async fn execute<W: Write>(services: &AppServices, line: &str, out: &mut W) -> Result<Flow> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "add" => {
            let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
            if paths.is_empty() {
                return Err(FolioError::InvalidOption("add needs at least one path".into()));
            }
            let ids = services.add_paths(&paths).await?;
            writeln!(out, "Added {} file(s)", ids.len())?;
        }
        "remove" | "rm" => {
            let id: FileId = rest.parse()?;
            let name = services.remove(id)?;
            writeln!(out, "Removed {name}")?;
        }
        "clear" => {
            services.clear()?;
            writeln!(out, "Cleared.")?;
        }
        "list" | "ls" => {
            let rows = services.list()?;
            if rows.is_empty() {
                writeln!(out, "No files")?;
            }
            for row in rows {
                writeln!(out, "{}", row.display_line())?;
            }
        }
        "tool" => {
            if !rest.is_empty() {
                services.select_tool(rest.parse::<Tool>()?)?;
            }
            writeln!(out, "Tool: {}", services.active_tool()?)?;
        }
        "set" => {
            let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let mut updated = services.with_session(|s| s.options.clone())?;
            apply_setting(&mut updated, key, value.trim())?;
            services.with_session(|s| s.options = updated)?;
            writeln!(out, "{} = {}", key, value.trim())?;
        }
        "options" => {
            let options = services.with_session(|s| s.options.clone())?;
            writeln!(out, "{}", serde_json::to_string_pretty(&options)?)?;
        }
        "run" => {
            let tool = services.active_tool()?;
            let (output, path) = services.run_and_write(tool).await?;
            writeln!(out, "{}", output.status)?;
            writeln!(out, "Saved {}", path.display())?;
        }
        "preview" => {
            let id: FileId = rest.parse()?;
            for path in services.preview(id).await? {
                writeln!(out, "Saved {}", path.display())?;
            }
        }
        "help" | "?" => writeln!(out, "{HELP}")?,
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        other => {
            return Err(FolioError::InvalidOption(format!(
                "unknown command `{other}`, type `help`"
            )));
        }
    }
    Ok(Flow::Continue)
}

/// Apply one `set KEY VALUE` to `options` and validate the result.
pub fn apply_setting(options: &mut ToolOptions, key: &str, value: &str) -> Result<()> {
    match key.to_ascii_lowercase().as_str() {
        "quality" => options.image_quality = parse_number(key, value)?,
        "max-width" | "maxwidth" | "width" => options.max_width = parse_number(key, value)?,
        "pages" | "range" | "order" => options.page_range = value.to_string(),
        "format" => options.output_format = value.parse()?,
        "paper" => options.paper_size = value.parse()?,
        "scale" => options.render_scale = parse_number(key, value)?,
        other => {
            return Err(FolioError::InvalidOption(format!("unknown setting: {other}")));
        }
    }
    options.validate()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| FolioError::InvalidOption(format!("{key} must be a number, got `{value}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_pdf;
    use folio_core::{AppConfig, OutputImageFormat};

    async fn session_output(services: &AppServices, script: &str) -> String {
        let mut out = Vec::new();
        run(services, script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn services(dir: &std::path::Path) -> AppServices {
        AppServices::new(&AppConfig::default(), ToolOptions::default(), dir.to_path_buf())
    }

    #[test]
    fn settings_are_parsed_and_validated() {
        let mut options = ToolOptions::default();
        apply_setting(&mut options, "quality", "0.5").unwrap();
        apply_setting(&mut options, "max-width", "800").unwrap();
        apply_setting(&mut options, "pages", "1-3, 5").unwrap();
        apply_setting(&mut options, "format", "png").unwrap();
        assert_eq!(options.image_quality, 0.5);
        assert_eq!(options.max_width, 800);
        assert_eq!(options.page_range, "1-3, 5");
        assert_eq!(options.output_format, OutputImageFormat::Png);

        assert!(apply_setting(&mut options, "quality", "loud").is_err());
        assert!(apply_setting(&mut options, "quality", "2").is_err());
        assert!(apply_setting(&mut options, "colour", "red").is_err());
    }

    #[tokio::test]
    async fn run_without_files_asks_for_files() {
        let dir = tempfile::tempdir().unwrap();
        let text = session_output(&services(dir.path()), "run\nquit\n").await;
        assert!(text.contains("Add files first"), "{text}");
    }

    #[tokio::test]
    async fn full_session() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("deck.pdf");
        std::fs::write(&pdf, sample_pdf(3, "D")).unwrap();

        let script = format!(
            "add {}\nlist\ntool reorder\nset pages 3,1\nrun\nremove 1\nlist\nbogus\n",
            pdf.display()
        );
        let svc = services(dir.path());
        let text = session_output(&svc, &script).await;

        assert!(text.contains("Added 1 file(s)"), "{text}");
        assert!(text.contains("#1  deck.pdf  application/pdf"), "{text}");
        assert!(text.contains("Tool: reorder"), "{text}");
        assert!(text.contains("Reorder complete"), "{text}");
        assert!(text.contains("Removed deck.pdf"), "{text}");
        assert!(text.contains("No files"), "{text}");
        assert!(text.contains("unknown command"), "{text}");
        assert!(dir.path().join("deck_reordered.pdf").exists());
    }

    #[tokio::test]
    async fn unknown_tool_keeps_the_old_one() {
        let dir = tempfile::tempdir().unwrap();
        let svc = services(dir.path());
        let text = session_output(&svc, "tool split\ntool shred\ntool\n").await;
        assert!(text.contains("isn't valid"), "{text}");
        assert_eq!(svc.active_tool().unwrap(), Tool::Split);
    }
}
