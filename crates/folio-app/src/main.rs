// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio — local PDF and image toolkit.
//
// Entry point. Parses the command line, initialises logging and the config,
// then runs one tool, a preview, a listing, or the interactive shell.

mod output;
mod services;
mod session;
mod shell;
mod tools;

#[cfg(test)]
mod test_support;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use folio_core::error::Result;
use folio_core::human_errors::humanize_error;
use folio_core::{AppConfig, OutputImageFormat, PaperSize, Tool, ToolOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

use services::app_services::AppServices;

/// Merge, split, rasterise, rotate, reorder, compress, and OCR PDFs and images.
#[derive(Parser, Debug)]
#[command(
    name = "folio",
    version,
    about = "Merge, split, rasterise, rotate, reorder, compress, and OCR PDFs and images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file (JSON). Defaults to ~/.config/folio/config.json.
    #[arg(long, global = true, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for output files. Defaults to the current directory.
    #[arg(short, long = "output-dir", global = true, env = "FOLIO_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "FOLIO_VERBOSE")]
    verbose: bool,

    /// Suppress progress logs; only errors are shown.
    #[arg(short, long, global = true, env = "FOLIO_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Combine every PDF into merged.pdf, in the order given.
    Merge(ToolArgs),
    /// Extract the selected pages of the first PDF, one PDF per page, zipped.
    Split(ToolArgs),
    /// Render the selected pages of the first PDF to PNG or JPEG, zipped.
    #[command(name = "pdf2img")]
    PdfToImages(ToolArgs),
    /// Put every image on its own page of a new PDF.
    #[command(name = "img2pdf")]
    ImagesToPdf(ToolArgs),
    /// Downscale and re-encode every image, zipped.
    Compress(ToolArgs),
    /// Rotate the selected pages of the first PDF by 90° clockwise.
    Rotate(ToolArgs),
    /// Rebuild the first PDF with its pages in the order given by --pages.
    Reorder(ToolArgs),
    /// Recognise the text in every image, one .txt per image, zipped.
    Ocr(ToolArgs),
    /// Save preview JPEGs of each file.
    Preview {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show how the files would appear in the file list.
    List {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Interactive session: add files, pick a tool, run it, repeat.
    Shell,
}

impl Command {
    fn tool(&self) -> Option<(Tool, &ToolArgs)> {
        let tool = match self {
            Self::Merge(args) => (Tool::Merge, args),
            Self::Split(args) => (Tool::Split, args),
            Self::PdfToImages(args) => (Tool::PdfToImages, args),
            Self::ImagesToPdf(args) => (Tool::ImagesToPdf, args),
            Self::Compress(args) => (Tool::Compress, args),
            Self::Rotate(args) => (Tool::Rotate, args),
            Self::Reorder(args) => (Tool::Reorder, args),
            Self::Ocr(args) => (Tool::Ocr, args),
            Self::Preview { .. } | Self::List { .. } | Self::Shell => return None,
        };
        Some(tool)
    }
}

#[derive(Args, Debug)]
struct ToolArgs {
    /// Input files. Non-PDF, non-image files are listed but ignored.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[command(flatten)]
    options: OptionArgs,
}

#[derive(Args, Debug, Default)]
struct OptionArgs {
    /// Page range such as 1-3,5 (empty = all pages), or a page order for reorder.
    #[arg(short, long, env = "FOLIO_PAGES")]
    pages: Option<String>,

    /// Output image format: png or jpeg.
    #[arg(long, env = "FOLIO_FORMAT")]
    format: Option<OutputImageFormat>,

    /// JPEG quality, 0.0–1.0.
    #[arg(long, env = "FOLIO_QUALITY")]
    quality: Option<f32>,

    /// Maximum image width in pixels for compress.
    #[arg(long, env = "FOLIO_MAX_WIDTH")]
    max_width: Option<u32>,

    /// Paper size for img2pdf: a4, letter, ... or WIDTHxHEIGHT in mm.
    #[arg(long, env = "FOLIO_PAPER")]
    paper: Option<PaperSize>,

    /// Render scale for pdf2img (1.0 = 72 DPI).
    #[arg(long, env = "FOLIO_SCALE")]
    scale: Option<f32>,
}

impl OptionArgs {
    /// Overlay the flags that were given onto `options`.
    fn apply(&self, options: &mut ToolOptions) {
        if let Some(pages) = &self.pages {
            options.page_range = pages.clone();
        }
        if let Some(format) = self.format {
            options.output_format = format;
        }
        if let Some(quality) = self.quality {
            options.image_quality = quality;
        }
        if let Some(max_width) = self.max_width {
            options.max_width = max_width;
        }
        if let Some(paper) = self.paper {
            options.paper_size = paper;
        }
        if let Some(scale) = self.scale {
            options.render_scale = scale;
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", humanize_error(&err).status_line());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path)?;
    info!(config = %config_path.display(), "Folio starting");

    let output_dir = cli
        .output
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut options = config.options.clone();
    if let Some((_, args)) = cli.command.tool() {
        args.options.apply(&mut options);
        options.validate()?;
    }
    let services = AppServices::new(&config, options, output_dir);

    if let Some((tool, args)) = cli.command.tool() {
        services.add_paths(&args.files).await?;
        services.select_tool(tool)?;
        let (output, path) = services.run_and_write(tool).await?;
        println!("{}", output.status);
        println!("Saved {}", path.display());
        return Ok(());
    }

    match cli.command {
        Command::Preview { files } => {
            for id in services.add_paths(&files).await? {
                for path in services.preview(id).await? {
                    println!("Saved {}", path.display());
                }
            }
        }
        Command::List { files } => {
            services.add_paths(&files).await?;
            for row in services.list()? {
                println!("{}", row.display_line());
            }
        }
        Command::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = io::stdout();
            shell::run(&services, stdin, &mut stdout).await?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn tool_subcommands_map_to_tools() {
        let cli = Cli::parse_from(["folio", "pdf2img", "a.pdf", "--pages", "1-2", "--format", "png"]);
        let (tool, args) = cli.command.tool().unwrap();
        assert_eq!(tool, Tool::PdfToImages);

        let mut options = ToolOptions::default();
        args.options.apply(&mut options);
        assert_eq!(options.page_range, "1-2");
        assert_eq!(options.output_format, OutputImageFormat::Png);
        assert_eq!(options.image_quality, 0.8);
    }

    #[test]
    fn every_tool_key_is_a_subcommand() {
        for tool in Tool::ALL {
            let cli = Cli::parse_from(["folio", tool.key(), "x.pdf"]);
            assert_eq!(cli.command.tool().map(|(t, _)| t), Some(tool));
        }
    }

    #[test]
    fn paper_and_output_dir_flags() {
        let cli = Cli::parse_from(["folio", "img2pdf", "a.png", "--paper", "letter", "-o", "out"]);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        let (_, args) = cli.command.tool().unwrap();
        assert_eq!(args.options.paper, Some(PaperSize::Letter));
    }
}
