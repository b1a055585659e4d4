use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Processing status of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Processing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processing => "PROCESSING",
            DocumentStatus::Completed => "COMPLETED",
            DocumentStatus::Failed => "FAILED",
        }
    }
}

/// Accepted upload formats, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl DocumentFormat {
    /// Maps a filename to its format. `None` means the upload must be rejected
    /// before the pipeline starts.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Some(DocumentFormat::Docx)
        } else if lower.ends_with(".doc") {
            Some(DocumentFormat::Doc)
        } else if lower.ends_with(".txt") {
            Some(DocumentFormat::Txt)
        } else {
            None
        }
    }
}

/// One uploaded file. Created on upload, never deleted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A document about to be inserted.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// Plain-text rendering of a document.
///
/// Invariant: `text_length > preview length` implies `full_text_key.is_some()`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExtractedTextRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub text_length: i64,
    pub text_preview: String,
    pub full_text_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename_accepts_known_extensions() {
        assert_eq!(DocumentFormat::from_filename("a.pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_filename("A.DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_filename("old.doc"), Some(DocumentFormat::Doc));
        assert_eq!(DocumentFormat::from_filename("notes.TxT"), Some(DocumentFormat::Txt));
    }

    #[test]
    fn test_format_from_filename_rejects_others() {
        assert_eq!(DocumentFormat::from_filename("photo.png"), None);
        assert_eq!(DocumentFormat::from_filename("pdf"), None);
        assert_eq!(DocumentFormat::from_filename(""), None);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&DocumentStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
        assert_eq!(DocumentStatus::Failed.as_str(), "FAILED");
    }
}
