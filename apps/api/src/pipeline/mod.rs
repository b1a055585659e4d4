//! Pipeline Orchestrator — runs one document through
//! extraction → inference → normalization → tiered storage → notification.
//!
//! Only storage failures and unexpected task failures end a run in FAILED.
//! Extraction and inference problems degrade the analysis instead.

pub mod stage;

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::{AnalysisInferenceClient, AnalysisNormalizer};
use crate::extraction::{self, Extraction};
use crate::models::analysis::Analysis;
use crate::models::document::{DocumentFormat, DocumentStatus, NewDocument};
use crate::notify::Notifier;
use crate::storage::projection::{AnalysisRefs, EssentialProjection};
use crate::storage::{StorageError, StorageTierWriter};

pub use stage::PipelineStage;

#[derive(Debug, Error)]
#[error("unsupported file type: {0}")]
pub struct UnsupportedFormat(pub String);

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("storage failure for document {document_id} during {stage}: {source}")]
    Storage {
        document_id: Uuid,
        stage: PipelineStage,
        #[source]
        source: StorageError,
    },

    #[error("unexpected failure for document {document_id} during {stage}: {message}")]
    Unexpected {
        document_id: Uuid,
        stage: PipelineStage,
        message: String,
    },
}

impl PipelineError {
    pub fn document_id(&self) -> Uuid {
        match self {
            PipelineError::Storage { document_id, .. }
            | PipelineError::Unexpected { document_id, .. } => *document_id,
        }
    }
}

/// An upload that passed the extension check.
#[derive(Debug, Clone)]
pub struct IncomingDocument {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

impl IncomingDocument {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Bytes,
    ) -> Result<Self, UnsupportedFormat> {
        let filename = filename.into();
        if DocumentFormat::from_filename(&filename).is_none() {
            return Err(UnsupportedFormat(filename));
        }
        Ok(Self {
            filename,
            content_type: content_type.into(),
            bytes,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub document_id: Uuid,
    pub extracted_text_id: Uuid,
    pub analysis: EssentialProjection,
    pub stages: Vec<PipelineStage>,
}

/// Stage bookkeeping for one run.
struct Progress {
    document_id: Uuid,
    stages: Vec<PipelineStage>,
}

impl Progress {
    fn new(document_id: Uuid) -> Self {
        info!("Document {document_id}: {}", PipelineStage::Received);
        Self {
            document_id,
            stages: vec![PipelineStage::Received],
        }
    }

    fn current(&self) -> PipelineStage {
        self.stages
            .last()
            .copied()
            .unwrap_or(PipelineStage::Received)
    }

    fn advance(&mut self, next: PipelineStage) {
        let current = self.current();
        debug_assert!(
            current.can_advance_to(next),
            "illegal transition {current} -> {next}"
        );
        info!("Document {}: {current} -> {next}", self.document_id);
        self.stages.push(next);
    }

    fn storage_error(&self, source: StorageError) -> PipelineError {
        PipelineError::Storage {
            document_id: self.document_id,
            stage: self.current(),
            source,
        }
    }
}

pub struct Pipeline {
    tiers: StorageTierWriter,
    inference: AnalysisInferenceClient,
    normalizer: AnalysisNormalizer,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        tiers: StorageTierWriter,
        inference: AnalysisInferenceClient,
        normalizer: AnalysisNormalizer,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tiers,
            inference,
            normalizer,
            notifier,
        }
    }

    pub fn tiers(&self) -> &StorageTierWriter {
        &self.tiers
    }

    /// Processes one document to a terminal state. On error the document is
    /// left FAILED (best effort) and no essential analysis record exists.
    pub async fn process(&self, document: IncomingDocument) -> Result<PipelineRun, PipelineError> {
        let mut progress = Progress::new(Uuid::new_v4());

        match self.run(&mut progress, document).await {
            Ok(run) => Ok(run),
            Err(e) => {
                error!("Document {} failed: {e}", progress.document_id);
                progress.advance(PipelineStage::Failed);
                if let Err(mark) = self
                    .tiers
                    .records()
                    .set_document_status(progress.document_id, DocumentStatus::Failed)
                    .await
                {
                    error!(
                        "Could not mark document {} FAILED: {mark}",
                        progress.document_id
                    );
                }
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        progress: &mut Progress,
        document: IncomingDocument,
    ) -> Result<PipelineRun, PipelineError> {
        let document_id = progress.document_id;
        let records = self.tiers.records();

        records
            .insert_document(&NewDocument {
                id: document_id,
                filename: document.filename.clone(),
                content_type: document.content_type.clone(),
                size_bytes: i64::try_from(document.bytes.len()).unwrap_or(i64::MAX),
            })
            .await
            .map_err(|e| progress.storage_error(e))?;

        // ── Extraction ──────────────────────────────────────────────────────
        progress.advance(PipelineStage::Extracting);
        let extraction = self.extract(progress, &document).await?;
        let extracted = self
            .tiers
            .persist_extracted_text(document_id, &extraction.text)
            .await
            .map_err(|e| progress.storage_error(e))?;

        // ── Analysis ────────────────────────────────────────────────────────
        progress.advance(PipelineStage::Analyzing);
        let analysis = self.analyze(&extraction, &document.filename).await;

        // ── Persistence ─────────────────────────────────────────────────────
        progress.advance(PipelineStage::Persisting);
        let stored = self
            .tiers
            .persist_analysis(
                &analysis,
                AnalysisRefs {
                    document_id,
                    extracted_text_id: extracted.id,
                    raw_text_key: extracted.full_text_key.clone(),
                },
            )
            .await
            .map_err(|e| progress.storage_error(e))?;

        progress.advance(PipelineStage::Completed);
        self.notify(stored.essential.id);

        Ok(PipelineRun {
            document_id,
            extracted_text_id: extracted.id,
            analysis: stored.essential,
            stages: progress.stages.clone(),
        })
    }

    async fn extract(
        &self,
        progress: &Progress,
        document: &IncomingDocument,
    ) -> Result<Extraction, PipelineError> {
        let bytes = document.bytes.clone();
        let filename = document.filename.clone();
        let content_type = document.content_type.clone();

        let extraction = tokio::task::spawn_blocking(move || {
            extraction::extract(&bytes, &filename, &content_type)
        })
        .await
        .map_err(|e| PipelineError::Unexpected {
            document_id: progress.document_id,
            stage: progress.current(),
            message: format!("extraction task failed: {e}"),
        })?;

        if extraction.is_placeholder() {
            warn!(
                "Document {}: extraction degraded ({:?}), analysis will use fallback",
                progress.document_id, extraction.status
            );
        }
        Ok(extraction)
    }

    async fn analyze(&self, extraction: &Extraction, filename: &str) -> Analysis {
        if extraction.is_placeholder() {
            return self.normalizer.normalize(None, &extraction.text, filename);
        }

        let candidate = match self.inference.analyze(&extraction.text, filename).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Inference unavailable for {filename}: {e}");
                None
            }
        };
        self.normalizer
            .normalize(candidate.as_ref(), &extraction.text, filename)
    }

    fn notify(&self, analysis_id: Uuid) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.analysis_completed(analysis_id).await {
                warn!("Notification for analysis {analysis_id} dropped: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::analysis::normalizer::{AI_CONFIDENCE, FALLBACK_CONFIDENCE};
    use crate::llm_client::{InferenceConfig, InferenceService, LlmError};
    use crate::notify::testing::RecordingNotifier;
    use crate::storage::memory::{MemoryBlobStore, MemoryStore};

    const SCENARIO_TEXT: &str = "Jane Doe\n\
        5 years of experience with Python and AWS.\n\
        Based in Seattle, WA.";

    struct Reply(Option<&'static str>);

    #[async_trait]
    impl InferenceService for Reply {
        async fn complete(
            &self,
            _prompt: &str,
            _system: &str,
            _config: &InferenceConfig,
        ) -> Result<String, LlmError> {
            self.0.map(String::from).ok_or(LlmError::Api {
                status: 529,
                message: "overloaded".to_string(),
            })
        }
    }

    struct Harness {
        pipeline: Pipeline,
        records: Arc<MemoryStore>,
        blobs: Arc<MemoryBlobStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness_with(reply: Option<&'static str>, notifier: RecordingNotifier) -> Harness {
        let records = Arc::new(MemoryStore::default());
        let blobs = Arc::new(MemoryBlobStore::default());
        let notifier = Arc::new(notifier);
        let pipeline = Pipeline::new(
            StorageTierWriter::new(records.clone(), blobs.clone()),
            AnalysisInferenceClient::new(Arc::new(Reply(reply)), InferenceConfig::default()),
            AnalysisNormalizer::default(),
            notifier.clone(),
        );
        Harness {
            pipeline,
            records,
            blobs,
            notifier,
        }
    }

    fn harness(reply: Option<&'static str>) -> Harness {
        harness_with(reply, RecordingNotifier::default())
    }

    fn txt(name: &str, body: &str) -> IncomingDocument {
        IncomingDocument::new(name, "text/plain", Bytes::from(body.to_string())).unwrap()
    }

    async fn notifications_settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_unsupported_extension_rejected_before_pipeline() {
        let err = IncomingDocument::new("photo.png", "image/png", Bytes::new()).unwrap_err();
        assert_eq!(err.0, "photo.png");
        assert!(IncomingDocument::new("CV.DOCX", "", Bytes::new()).is_ok());
    }

    #[tokio::test]
    async fn test_text_upload_with_inference_down_uses_fallback() {
        let h = harness(None);
        let run = h
            .pipeline
            .process(txt("Jane_Doe_Resume.txt", SCENARIO_TEXT))
            .await
            .unwrap();

        let a = &run.analysis;
        assert!(a.experience_years >= 1);
        assert!(a.key_skills.iter().any(|s| s.eq_ignore_ascii_case("python")));
        assert!(a.key_skills.iter().any(|s| s.eq_ignore_ascii_case("aws")));
        assert_eq!(a.extraction_confidence, FALLBACK_CONFIDENCE);
        assert!((1..=100).contains(&a.overall_score));
        assert_eq!(a.candidate_name, "Jane Doe");
        assert_eq!(
            run.stages,
            vec![
                PipelineStage::Received,
                PipelineStage::Extracting,
                PipelineStage::Analyzing,
                PipelineStage::Persisting,
                PipelineStage::Completed,
            ]
        );
        let doc = h.records.document(run.document_id).unwrap();
        assert_eq!(doc.status, "COMPLETED");
    }

    #[tokio::test]
    async fn test_out_of_range_ai_output_is_repaired() {
        let h = harness(Some(r#"Result: {"overall_score": 150, "skills": []}"#));
        let run = h
            .pipeline
            .process(txt("notes.txt", SCENARIO_TEXT))
            .await
            .unwrap();

        let a = &run.analysis;
        assert_eq!(a.overall_score, 100);
        assert_eq!(a.extraction_confidence, AI_CONFIDENCE);
        assert!(a.key_skills.iter().any(|s| s == "Python"));
        assert!(a.skill_breakdown.total() >= 1);
        assert_eq!(a.total_skills as usize, a.key_skills.len());
    }

    #[tokio::test]
    async fn test_broken_pdf_still_completes_with_placeholder() {
        let h = harness(Some(r#"{"overall_score": 99}"#));
        let doc = IncomingDocument::new(
            "resume.pdf",
            "application/pdf",
            Bytes::from_static(b"%PDF-1.4 this is not really a pdf"),
        )
        .unwrap();
        let run = h.pipeline.process(doc).await.unwrap();

        let text = h.records.extracted_text_for(run.document_id).unwrap();
        assert!(text.text_preview.starts_with("Error extracting PDF text:"));
        assert_eq!(run.analysis.extraction_confidence, FALLBACK_CONFIDENCE);
        assert_eq!(h.records.document(run.document_id).unwrap().status, "COMPLETED");
    }

    #[tokio::test]
    async fn test_long_text_is_referenced_from_analysis() {
        let h = harness(None);
        let body = format!("{SCENARIO_TEXT}\n{}", "Built data pipelines. ".repeat(60));
        let run = h.pipeline.process(txt("Jane_Doe.txt", &body)).await.unwrap();

        let key = run.analysis.raw_text_key.clone().unwrap();
        assert!(key.starts_with("parsed-text/"));
        assert!(h.blobs.keys().contains(&key));
        assert!(h.blobs.keys().contains(&run.analysis.detailed_analysis_key));
    }

    #[tokio::test]
    async fn test_structured_store_failure_marks_failed() {
        let h = harness(None);
        h.records.fail_analysis_inserts();
        let err = h
            .pipeline
            .process(txt("Jane_Doe.txt", SCENARIO_TEXT))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Storage {
                stage: PipelineStage::Persisting,
                ..
            }
        ));
        let doc = h.records.document(err.document_id()).unwrap();
        assert_eq!(doc.status, "FAILED");
        assert_eq!(h.records.analysis_count(), 0);
        notifications_settle().await;
        assert!(h.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completion_failure_leaves_no_analysis_on_failed_document() {
        let h = harness(None);
        h.records.fail_completions();
        let err = h
            .pipeline
            .process(txt("Jane_Doe.txt", SCENARIO_TEXT))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Storage {
                stage: PipelineStage::Persisting,
                ..
            }
        ));
        assert_eq!(
            h.records.document(err.document_id()).unwrap().status,
            "FAILED"
        );
        assert_eq!(h.records.analysis_count(), 0);
        notifications_settle().await;
        assert!(h.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blob_store_failure_marks_failed() {
        let h = harness(None);
        h.blobs.fail_puts();
        let err = h
            .pipeline
            .process(txt("Jane_Doe.txt", SCENARIO_TEXT))
            .await
            .unwrap_err();
        assert_eq!(
            h.records.document(err.document_id()).unwrap().status,
            "FAILED"
        );
        assert_eq!(h.records.analysis_count(), 0);
    }

    #[tokio::test]
    async fn test_notification_sent_once_on_completion() {
        let h = harness(None);
        let run = h
            .pipeline
            .process(txt("Jane_Doe.txt", SCENARIO_TEXT))
            .await
            .unwrap();
        notifications_settle().await;
        assert_eq!(*h.notifier.sent.lock().unwrap(), vec![run.analysis.id]);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_run() {
        let h = harness_with(None, RecordingNotifier::refusing());
        let run = h
            .pipeline
            .process(txt("Jane_Doe.txt", SCENARIO_TEXT))
            .await
            .unwrap();
        notifications_settle().await;
        assert_eq!(h.records.document(run.document_id).unwrap().status, "COMPLETED");
    }
}
