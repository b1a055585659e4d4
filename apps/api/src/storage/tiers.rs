use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::models::analysis::Analysis;
use crate::models::document::ExtractedTextRow;
use crate::storage::projection::{AnalysisRefs, DetailedProjection, EssentialProjection};
use crate::storage::{
    analysis_key, parsed_text_key, BlobStore, StorageError, StructuredStore,
};
use crate::text::{char_len, truncate_chars};

/// Characters of extracted text kept inline on the structured record.
pub const TEXT_PREVIEW_CHARS: usize = 500;

/// Both projections of one persisted analysis.
#[derive(Debug, Clone, Serialize)]
pub struct StoredAnalysis {
    pub essential: EssentialProjection,
    pub detailed: DetailedProjection,
}

/// Splits results across the two tiers: bounded records in the structured
/// store, everything unbounded in the blob store.
#[derive(Clone)]
pub struct StorageTierWriter {
    records: Arc<dyn StructuredStore>,
    blobs: Arc<dyn BlobStore>,
}

impl StorageTierWriter {
    pub fn new(records: Arc<dyn StructuredStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { records, blobs }
    }

    pub fn records(&self) -> &Arc<dyn StructuredStore> {
        &self.records
    }

    /// Stores a preview inline and the full text as a blob when the preview
    /// does not cover it.
    pub async fn persist_extracted_text(
        &self,
        document_id: Uuid,
        text: &str,
    ) -> Result<ExtractedTextRow, StorageError> {
        let id = Uuid::new_v4();
        let length = char_len(text);

        let full_text_key = if length > TEXT_PREVIEW_CHARS {
            let key = parsed_text_key(id);
            self.blobs
                .put(&key, text.as_bytes().to_vec(), "text/plain; charset=utf-8")
                .await?;
            Some(key)
        } else {
            None
        };

        let row = ExtractedTextRow {
            id,
            document_id,
            text_length: i64::try_from(length).unwrap_or(i64::MAX),
            text_preview: truncate_chars(text, TEXT_PREVIEW_CHARS).to_string(),
            full_text_key,
            created_at: Utc::now(),
        };
        self.records.insert_extracted_text(&row).await?;
        info!("Stored extracted text {id} ({length} chars) for document {document_id}");
        Ok(row)
    }

    /// Writes the detailed projection to the blob store, then the essential
    /// projection to the structured store together with the document's
    /// COMPLETED status. A reader that finds the essential record can always
    /// resolve its `detailed_analysis_key`.
    pub async fn persist_analysis(
        &self,
        analysis: &Analysis,
        refs: AnalysisRefs,
    ) -> Result<StoredAnalysis, StorageError> {
        let analysis_id = Uuid::new_v4();
        let key = analysis_key(analysis_id);

        let detailed = DetailedProjection::from_analysis(analysis_id, refs.document_id, analysis);
        let essential = EssentialProjection::from_analysis(analysis_id, analysis, &refs, key.clone());
        let size = essential.check_budget()?;

        self.blobs
            .put(&key, serde_json::to_vec_pretty(&detailed)?, "application/json")
            .await?;
        self.records.insert_analysis_and_complete(&essential).await?;

        info!("Stored analysis {analysis_id}: essential {size} bytes, detailed at {key}");
        Ok(StoredAnalysis {
            essential,
            detailed,
        })
    }

    pub async fn load_essential(
        &self,
        analysis_id: Uuid,
    ) -> Result<Option<EssentialProjection>, StorageError> {
        self.records.get_analysis(analysis_id).await
    }

    /// Reassembles both projections from their stores.
    pub async fn load_detailed(
        &self,
        analysis_id: Uuid,
    ) -> Result<Option<StoredAnalysis>, StorageError> {
        let Some(essential) = self.records.get_analysis(analysis_id).await? else {
            return Ok(None);
        };
        let bytes = self
            .blobs
            .get(&essential.detailed_analysis_key)
            .await?
            .ok_or_else(|| StorageError::MissingObject(essential.detailed_analysis_key.clone()))?;
        let detailed = serde_json::from_slice(&bytes)?;
        Ok(Some(StoredAnalysis {
            essential,
            detailed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::skills::categorize_skills;
    use crate::models::analysis::{ExperienceLevel, FitAssessment};
    use crate::models::document::NewDocument;
    use crate::storage::memory::{MemoryBlobStore, MemoryStore};
    use crate::storage::projection::{
        truncate_list, truncate_summary, KEY_SKILLS_MAX, STRUCTURED_RECORD_LIMIT_BYTES,
    };

    fn writer() -> (StorageTierWriter, Arc<MemoryStore>, Arc<MemoryBlobStore>) {
        let records = Arc::new(MemoryStore::default());
        let blobs = Arc::new(MemoryBlobStore::default());
        (
            StorageTierWriter::new(records.clone(), blobs.clone()),
            records,
            blobs,
        )
    }

    fn analysis(skills: Vec<String>, summary: String) -> Analysis {
        Analysis {
            candidate_name: "Jane Doe".to_string(),
            experience_years: 5,
            experience_level: ExperienceLevel::MidLevel,
            skill_breakdown: categorize_skills(&skills),
            skills,
            overall_score: 72,
            skill_diversity: 40,
            fit_assessment: FitAssessment::Medium,
            summary,
            strengths: vec!["Cloud".to_string()],
            recommendations: vec!["Write more".to_string()],
            achievements: vec!["Shipped v2".to_string()],
            education: vec!["BSc".to_string()],
            certifications: vec![],
            extraction_confidence: 0.85,
        }
    }

    fn refs() -> AnalysisRefs {
        AnalysisRefs {
            document_id: Uuid::new_v4(),
            extracted_text_id: Uuid::new_v4(),
            raw_text_key: None,
        }
    }

    #[tokio::test]
    async fn test_short_text_has_no_blob() {
        let (writer, _, blobs) = writer();
        let row = writer
            .persist_extracted_text(Uuid::new_v4(), "short text")
            .await
            .unwrap();
        assert_eq!(row.text_preview, "short text");
        assert_eq!(row.text_length, 10);
        assert!(row.full_text_key.is_none());
        assert_eq!(blobs.len(), 0);
    }

    #[tokio::test]
    async fn test_long_text_goes_to_blob() {
        let (writer, records, blobs) = writer();
        let text = "ü".repeat(TEXT_PREVIEW_CHARS + 1);
        let row = writer
            .persist_extracted_text(Uuid::new_v4(), &text)
            .await
            .unwrap();
        let key = row.full_text_key.clone().unwrap();
        assert_eq!(key, format!("parsed-text/{}.txt", row.id));
        assert_eq!(row.text_preview.chars().count(), TEXT_PREVIEW_CHARS);
        assert_eq!(blobs.get(&key).await.unwrap().unwrap(), text.as_bytes());
        assert_eq!(records.extracted_text_count(), 1);
    }

    #[tokio::test]
    async fn test_round_trip_reassembles_detailed() {
        let (writer, _, _) = writer();
        let skills: Vec<String> = (0..40).map(|i| format!("Skill {i}")).collect();
        let summary = "s".repeat(3_000);
        let stored = writer
            .persist_analysis(&analysis(skills.clone(), summary.clone()), refs())
            .await
            .unwrap();
        let id = stored.essential.id;
        assert_eq!(stored.essential.detailed_analysis_key, format!("analysis/{id}.json"));

        let loaded = writer.load_detailed(id).await.unwrap().unwrap();
        assert_eq!(loaded.detailed.all_skills, skills);
        assert_eq!(loaded.detailed.full_summary, summary);
        assert_eq!(loaded.essential.key_skills, truncate_list(&skills, KEY_SKILLS_MAX));
        assert_eq!(loaded.essential.summary, truncate_summary(&summary));
    }

    #[tokio::test]
    async fn test_huge_analysis_persists_within_budget() {
        let (writer, records, _) = writer();
        let big = "x".repeat(1_000_000);
        let skills = (0..5_000).map(|i| format!("{i}{big}")).take(20).collect();
        let stored = writer
            .persist_analysis(&analysis(skills, big), refs())
            .await
            .unwrap();
        assert!(stored.essential.encoded_size().unwrap() <= STRUCTURED_RECORD_LIMIT_BYTES);
        assert_eq!(records.analysis_count(), 1);
    }

    #[tokio::test]
    async fn test_blob_failure_leaves_no_essential_record() {
        let (writer, records, blobs) = writer();
        blobs.fail_puts();
        let err = writer
            .persist_analysis(&analysis(vec![], String::new()), refs())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Blob(_)));
        assert_eq!(records.analysis_count(), 0);
    }

    #[tokio::test]
    async fn test_analysis_write_completes_document() {
        let (writer, records, _) = writer();
        let refs = refs();
        records
            .insert_document(&NewDocument {
                id: refs.document_id,
                filename: "Jane_Doe.txt".to_string(),
                content_type: "text/plain".to_string(),
                size_bytes: 10,
            })
            .await
            .unwrap();
        writer
            .persist_analysis(&analysis(vec![], String::new()), refs.clone())
            .await
            .unwrap();
        assert_eq!(records.document(refs.document_id).unwrap().status, "COMPLETED");
    }

    #[tokio::test]
    async fn test_failed_completion_writes_neither_half() {
        let (writer, records, _) = writer();
        let refs = refs();
        records
            .insert_document(&NewDocument {
                id: refs.document_id,
                filename: "Jane_Doe.txt".to_string(),
                content_type: "text/plain".to_string(),
                size_bytes: 10,
            })
            .await
            .unwrap();
        records.fail_completions();
        let err = writer
            .persist_analysis(&analysis(vec![], String::new()), refs.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Structured(_)));
        assert_eq!(records.analysis_count(), 0);
        assert_eq!(records.document(refs.document_id).unwrap().status, "PROCESSING");
    }

    #[tokio::test]
    async fn test_missing_analysis_loads_none() {
        let (writer, _, _) = writer();
        assert!(writer.load_detailed(Uuid::new_v4()).await.unwrap().is_none());
        assert!(writer.load_essential(Uuid::new_v4()).await.unwrap().is_none());
    }
}
