//! Text Extraction — turns an uploaded document into plain text.
//!
//! Extraction never fails past this boundary: parser errors, unsupported
//! formats and marginal output all come back as a human-readable placeholder
//! string, tagged with an `ExtractionStatus` so callers can log the reason.

mod docx;
mod pdf;

use thiserror::Error;
use tracing::{info, warn};

use crate::text::{char_len, clean_text};

/// Below this many characters the output is treated as noise.
pub const MIN_MEANINGFUL_CHARS: usize = 50;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_DOC: &str = "application/msword";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error extracting PDF text: {0}")]
    Pdf(String),

    #[error("Error extracting DOCX text: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionStatus {
    /// Real document text.
    Extracted,
    /// The format parser failed; the text names the failure.
    Failed(String),
    /// The file type has no extractor.
    Unsupported,
    /// Extraction produced fewer than `MIN_MEANINGFUL_CHARS` characters.
    TooShort { chars: usize },
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub status: ExtractionStatus,
}

impl Extraction {
    pub fn is_placeholder(&self) -> bool {
        self.status != ExtractionStatus::Extracted
    }
}

enum Route {
    Pdf,
    Docx,
    PlainText,
    Unsupported,
}

fn route(filename: &str, content_type: &str) -> Route {
    let lower = filename.to_lowercase();
    if lower.ends_with(".pdf") {
        Route::Pdf
    } else if lower.ends_with(".docx") || lower.ends_with(".doc") {
        Route::Docx
    } else if lower.ends_with(".txt") || content_type.starts_with("text/") {
        Route::PlainText
    } else {
        match content_type {
            MIME_PDF => Route::Pdf,
            MIME_DOCX | MIME_DOC => Route::Docx,
            _ => Route::Unsupported,
        }
    }
}

/// Extracts plain text from `bytes`. Total: always returns text.
pub fn extract(bytes: &[u8], filename: &str, content_type: &str) -> Extraction {
    let extraction = match route(filename, content_type) {
        Route::Pdf => from_result(pdf::extract_pdf_text(bytes)),
        Route::Docx => from_result(docx::extract_docx_text(bytes)),
        Route::PlainText => Extraction {
            text: String::from_utf8_lossy(bytes).into_owned(),
            status: ExtractionStatus::Extracted,
        },
        Route::Unsupported => {
            warn!("Unsupported file type: {filename} ({content_type})");
            Extraction {
                text: format!("Unsupported file format: {filename}"),
                status: ExtractionStatus::Unsupported,
            }
        }
    };

    if extraction.status != ExtractionStatus::Extracted {
        return extraction;
    }

    let cleaned = clean_text(&extraction.text);
    let chars = char_len(&cleaned);
    if chars < MIN_MEANINGFUL_CHARS {
        warn!("Extracted text too short for {filename}: {chars} chars");
        return Extraction {
            text: too_short_placeholder(filename),
            status: ExtractionStatus::TooShort { chars },
        };
    }

    info!("Extracted {chars} characters from {filename}");
    Extraction {
        text: cleaned,
        status: ExtractionStatus::Extracted,
    }
}

fn from_result(result: Result<String, ExtractError>) -> Extraction {
    match result {
        Ok(text) => Extraction {
            text,
            status: ExtractionStatus::Extracted,
        },
        Err(e) => {
            warn!("{e}");
            let text = e.to_string();
            Extraction {
                status: ExtractionStatus::Failed(text.clone()),
                text,
            }
        }
    }
}

pub fn too_short_placeholder(filename: &str) -> String {
    format!(
        "Unable to extract meaningful text from {filename}. \
         File may be corrupted or in unsupported format."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME_TXT: &str = "Jane Doe\n5 years of experience with Python and AWS.\nBased in Seattle, WA.";

    #[test]
    fn test_plain_text_passes_through() {
        let e = extract(RESUME_TXT.as_bytes(), "jane.txt", "text/plain");
        assert_eq!(e.status, ExtractionStatus::Extracted);
        assert_eq!(e.text, RESUME_TXT);
        assert!(!e.is_placeholder());
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let mut bytes = RESUME_TXT.as_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'!']);
        let e = extract(&bytes, "jane.txt", "text/plain");
        assert_eq!(e.status, ExtractionStatus::Extracted);
        assert!(e.text.contains('\u{FFFD}'));
        assert!(e.text.starts_with("Jane Doe"));
    }

    #[test]
    fn test_text_content_type_without_txt_extension() {
        let e = extract(RESUME_TXT.as_bytes(), "upload", "text/markdown");
        assert_eq!(e.status, ExtractionStatus::Extracted);
    }

    #[test]
    fn test_short_text_yields_too_short_placeholder() {
        let e = extract(b"Python, AWS", "tiny.txt", "text/plain");
        assert_eq!(e.status, ExtractionStatus::TooShort { chars: 11 });
        assert_eq!(e.text, too_short_placeholder("tiny.txt"));
        assert!(e.is_placeholder());
    }

    #[test]
    fn test_whitespace_padding_does_not_count_towards_threshold() {
        let padded = format!("{}{}", " ".repeat(200), "short");
        let e = extract(padded.as_bytes(), "pad.txt", "text/plain");
        assert!(matches!(e.status, ExtractionStatus::TooShort { .. }));
    }

    #[test]
    fn test_unsupported_format_placeholder() {
        let e = extract(b"\x89PNG....", "photo.png", "image/png");
        assert_eq!(e.status, ExtractionStatus::Unsupported);
        assert_eq!(e.text, "Unsupported file format: photo.png");
    }

    #[test]
    fn test_broken_pdf_yields_failure_placeholder() {
        let e = extract(b"%PDF-1.4 definitely not a pdf body", "cv.pdf", MIME_PDF);
        match &e.status {
            ExtractionStatus::Failed(msg) => {
                assert!(msg.starts_with("Error extracting PDF text:"), "got {msg}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(e.text.starts_with("Error extracting PDF text:"));
    }

    #[test]
    fn test_broken_docx_yields_failure_placeholder() {
        let e = extract(b"not a zip archive", "cv.docx", MIME_DOCX);
        assert!(matches!(e.status, ExtractionStatus::Failed(_)));
        assert!(e.text.starts_with("Error extracting DOCX text:"));
    }
}
