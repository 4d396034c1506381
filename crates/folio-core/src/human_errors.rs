// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// A tool run either succeeds or is skipped; either way the user sees one
// status line. Every technical error is mapped to plain English with a
// suggestion of what to try next.

use crate::error::FolioError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk hiccup or similar. Running the tool again may work.
    Transient,
    /// The user must change something: add files, fix the page range.
    ActionRequired,
    /// The input itself is unusable.
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

impl HumanError {
    /// The single line shown in the status area.
    pub fn status_line(&self) -> String {
        if self.suggestion.is_empty() {
            self.message.clone()
        } else {
            format!("{} {}", self.message, self.suggestion)
        }
    }
}

/// Convert a `FolioError` into a `HumanError`.
pub fn humanize_error(err: &FolioError) -> HumanError {
    match err {
        // -- Input selection --
        FolioError::NoMatchingInput(message) => HumanError {
            message: message.clone(),
            suggestion: String::new(),
            severity: Severity::ActionRequired,
        },

        FolioError::NoPagesMatched => HumanError {
            message: "No pages matched".into(),
            suggestion: "Check the page range, e.g. 1-3,5. Leave it empty to use every page.".into(),
            severity: Severity::ActionRequired,
        },

        FolioError::UnknownFile(id) => HumanError {
            message: format!("There is no file #{id} in the list."),
            suggestion: "Use `list` to see the files and their numbers.".into(),
            severity: Severity::ActionRequired,
        },

        FolioError::InvalidOption(detail) => HumanError {
            message: "One of the settings isn't valid.".into(),
            suggestion: format!("Fix the setting and run the tool again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        // -- Document errors --
        FolioError::UnsupportedDocument(detail) => HumanError {
            message: "This type of document isn't supported.".into(),
            suggestion: format!("Only PDF files and images can be used. (File type: {detail})"),
            severity: Severity::Permanent,
        },

        FolioError::PdfError(detail) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: format!("The file may be damaged or encrypted. Try a different file. ({detail})"),
            severity: Severity::Permanent,
        },

        FolioError::ImageError(detail) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: format!("The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first. ({detail})"),
            severity: Severity::Permanent,
        },

        FolioError::RenderError(detail) => HumanError {
            message: "The PDF pages couldn't be drawn.".into(),
            suggestion: format!("Make sure the pdfium library is installed, or point PDFIUM_LIB_PATH at it. ({detail})"),
            severity: Severity::Permanent,
        },

        FolioError::OcrError(detail) => HumanError {
            message: "Text recognition didn't work on this image.".into(),
            suggestion: format!("Check that the OCR models are downloaded and the text in the image is clear. ({detail})"),
            severity: Severity::Permanent,
        },

        FolioError::ArchiveError(detail) => HumanError {
            message: "The results couldn't be packed into a zip file.".into(),
            suggestion: format!("Try again. ({detail})"),
            severity: Severity::Transient,
        },

        FolioError::FeatureUnavailable(feature) => HumanError {
            message: format!("This build of Folio has no {feature} support."),
            suggestion: format!("Rebuild with the `{feature}` feature enabled."),
            severity: Severity::Permanent,
        },

        // -- Storage --
        FolioError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Folio doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or choose a different output folder.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    severity: Severity::Transient,
                }
            }
        }

        FolioError::Serialization(detail) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: format!("Fix or delete the config file. ({detail})"),
            severity: Severity::ActionRequired,
        },

        FolioError::Internal(detail) => HumanError {
            message: "Something went wrong inside Folio.".into(),
            suggestion: format!("Run the tool again with -v for details. ({detail})"),
            severity: Severity::Transient,
        },
    }
}
