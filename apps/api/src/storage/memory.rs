//! In-memory stores for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::document::{DocumentRow, DocumentStatus, ExtractedTextRow, NewDocument};
use crate::storage::projection::EssentialProjection;
use crate::storage::{BlobStore, StorageError, StructuredStore};

#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<Uuid, DocumentRow>>,
    texts: Mutex<HashMap<Uuid, ExtractedTextRow>>,
    analyses: Mutex<HashMap<Uuid, EssentialProjection>>,
    fail_analysis_insert: AtomicBool,
    fail_completion: AtomicBool,
}

impl MemoryStore {
    pub fn fail_analysis_inserts(&self) {
        self.fail_analysis_insert.store(true, Ordering::SeqCst);
    }

    /// Fails the status half of the analysis write, after the insert would
    /// have happened.
    pub fn fail_completions(&self) {
        self.fail_completion.store(true, Ordering::SeqCst);
    }

    pub fn document(&self, id: Uuid) -> Option<DocumentRow> {
        self.documents.lock().unwrap().get(&id).cloned()
    }

    pub fn extracted_text_count(&self) -> usize {
        self.texts.lock().unwrap().len()
    }

    pub fn extracted_text_for(&self, document_id: Uuid) -> Option<ExtractedTextRow> {
        self.texts
            .lock()
            .unwrap()
            .values()
            .find(|t| t.document_id == document_id)
            .cloned()
    }

    pub fn analysis_count(&self) -> usize {
        self.analyses.lock().unwrap().len()
    }
}

#[async_trait]
impl StructuredStore for MemoryStore {
    async fn insert_document(&self, document: &NewDocument) -> Result<(), StorageError> {
        let now = Utc::now();
        self.documents.lock().unwrap().insert(
            document.id,
            DocumentRow {
                id: document.id,
                filename: document.filename.clone(),
                content_type: document.content_type.clone(),
                size_bytes: document.size_bytes,
                status: DocumentStatus::Processing.as_str().to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn set_document_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<(), StorageError> {
        if let Some(doc) = self.documents.lock().unwrap().get_mut(&id) {
            doc.status = status.as_str().to_string();
            doc.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<DocumentRow>, StorageError> {
        Ok(self.document(id))
    }

    async fn insert_extracted_text(&self, row: &ExtractedTextRow) -> Result<(), StorageError> {
        self.texts.lock().unwrap().insert(row.id, row.clone());
        Ok(())
    }

    async fn insert_analysis_and_complete(
        &self,
        essential: &EssentialProjection,
    ) -> Result<(), StorageError> {
        if self.fail_analysis_insert.load(Ordering::SeqCst) {
            return Err(StorageError::Structured(sqlx::Error::PoolTimedOut));
        }
        // Both locks held so the pair lands together or not at all
        let mut analyses = self.analyses.lock().unwrap();
        let mut documents = self.documents.lock().unwrap();
        if self.fail_completion.load(Ordering::SeqCst) {
            return Err(StorageError::Structured(sqlx::Error::RowNotFound));
        }
        analyses.insert(essential.id, essential.clone());
        if let Some(doc) = documents.get_mut(&essential.document_id) {
            doc.status = DocumentStatus::Completed.as_str().to_string();
            doc.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn get_analysis(&self, id: Uuid) -> Result<Option<EssentialProjection>, StorageError> {
        Ok(self.analyses.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_put: AtomicBool,
}

impl MemoryBlobStore {
    pub fn fail_puts(&self) {
        self.fail_put.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, body: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::Blob(format!("put {key} refused")));
        }
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }
}
