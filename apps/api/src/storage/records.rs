use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::analysis::AnalysisRow;
use crate::models::document::{DocumentRow, DocumentStatus, ExtractedTextRow, NewDocument};
use crate::storage::projection::EssentialProjection;
use crate::storage::{StorageError, StructuredStore};

/// Postgres-backed structured store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StructuredStore for PgStore {
    async fn insert_document(&self, document: &NewDocument) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, filename, content_type, size_bytes, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(document.id)
        .bind(&document.filename)
        .bind(&document.content_type)
        .bind(document.size_bytes)
        .bind(DocumentStatus::Processing.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_document_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE documents SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_document(&self, id: Uuid) -> Result<Option<DocumentRow>, StorageError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, filename, content_type, size_bytes, status, created_at, updated_at
            FROM documents
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_extracted_text(&self, row: &ExtractedTextRow) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO extracted_texts
                (id, document_id, text_length, text_preview, full_text_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.id)
        .bind(row.document_id)
        .bind(row.text_length)
        .bind(&row.text_preview)
        .bind(&row.full_text_key)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_analysis_and_complete(
        &self,
        e: &EssentialProjection,
    ) -> Result<(), StorageError> {
        let to_i32 = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO analyses
                (id, document_id, extracted_text_id, candidate_name, experience_years,
                 experience_level, total_skills, overall_score, skill_diversity,
                 fit_assessment, extraction_confidence, summary, key_skills,
                 top_strengths, top_recommendations, skill_breakdown,
                 detailed_analysis_key, raw_text_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19)
            "#,
        )
        .bind(e.id)
        .bind(e.document_id)
        .bind(e.extracted_text_id)
        .bind(&e.candidate_name)
        .bind(to_i32(e.experience_years))
        .bind(e.experience_level.as_str())
        .bind(to_i32(e.total_skills))
        .bind(i32::from(e.overall_score))
        .bind(i32::from(e.skill_diversity))
        .bind(e.fit_assessment.as_str())
        .bind(e.extraction_confidence)
        .bind(&e.summary)
        .bind(&e.key_skills)
        .bind(&e.top_strengths)
        .bind(&e.top_recommendations)
        .bind(Json(e.skill_breakdown))
        .bind(&e.detailed_analysis_key)
        .bind(&e.raw_text_key)
        .bind(e.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE documents SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(DocumentStatus::Completed.as_str())
            .bind(e.document_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_analysis(&self, id: Uuid) -> Result<Option<EssentialProjection>, StorageError> {
        let row = sqlx::query_as::<_, AnalysisRow>(
            r#"
            SELECT id, document_id, extracted_text_id, candidate_name, experience_years,
                   experience_level, total_skills, overall_score, skill_diversity,
                   fit_assessment, extraction_confidence, summary, key_skills,
                   top_strengths, top_recommendations, skill_breakdown,
                   detailed_analysis_key, raw_text_key, created_at
            FROM analyses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EssentialProjection::try_from).transpose()
    }
}
