//! Storage — the size-limited structured store (Postgres) and the unbounded
//! blob store (S3), both behind traits so the pipeline can run against
//! in-memory doubles.

pub mod blob;
#[cfg(test)]
pub mod memory;
pub mod projection;
pub mod records;
pub mod tiers;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::document::{DocumentRow, DocumentStatus, ExtractedTextRow, NewDocument};
use crate::storage::projection::EssentialProjection;

pub use tiers::StorageTierWriter;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("structured store error: {0}")]
    Structured(#[from] sqlx::Error),

    #[error("blob store error: {0}")]
    Blob(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("record is {size} bytes, over the {limit} byte structured-store limit")]
    RecordTooLarge { size: usize, limit: usize },

    #[error("stored record is invalid: {0}")]
    InvalidRecord(String),

    #[error("referenced object missing: {0}")]
    MissingObject(String),
}

/// Key-value records with a hard per-record size ceiling.
#[async_trait]
pub trait StructuredStore: Send + Sync {
    async fn insert_document(&self, document: &NewDocument) -> Result<(), StorageError>;

    async fn set_document_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<(), StorageError>;

    async fn get_document(&self, id: Uuid) -> Result<Option<DocumentRow>, StorageError>;

    async fn insert_extracted_text(&self, row: &ExtractedTextRow) -> Result<(), StorageError>;

    /// Inserts the essential record and marks its document COMPLETED as one
    /// atomic write. On error neither change is visible.
    async fn insert_analysis_and_complete(
        &self,
        essential: &EssentialProjection,
    ) -> Result<(), StorageError>;

    async fn get_analysis(&self, id: Uuid) -> Result<Option<EssentialProjection>, StorageError>;
}

/// Unbounded key → bytes storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
}

pub fn parsed_text_key(extracted_text_id: Uuid) -> String {
    format!("parsed-text/{extracted_text_id}.txt")
}

pub fn analysis_key(analysis_id: Uuid) -> String {
    format!("analysis/{analysis_id}.json")
}
