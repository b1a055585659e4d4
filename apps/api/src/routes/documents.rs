use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::{ExperienceLevel, FitAssessment};
use crate::models::document::DocumentRow;
use crate::pipeline::{IncomingDocument, PipelineStage};
use crate::state::AppState;
use crate::storage::projection::EssentialProjection;
use crate::storage::tiers::StoredAnalysis;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document_id: Uuid,
    pub analysis_id: Uuid,
    pub status: PipelineStage,
    pub candidate_name: String,
    pub experience_level: ExperienceLevel,
    pub overall_score: u8,
    pub fit_assessment: FitAssessment,
    pub extraction_confidence: f64,
}

/// POST /api/v1/documents
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file data: {e}")))?;
        upload = Some(IncomingDocument::new(filename, content_type, bytes)?);
        break;
    }

    let document = upload
        .ok_or_else(|| AppError::Validation(format!("Missing '{UPLOAD_FIELD}' field")))?;
    info!("Upload received: {}", document.filename());

    let run = state.pipeline.process(document).await?;
    let a = run.analysis;
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            document_id: run.document_id,
            analysis_id: a.id,
            status: PipelineStage::Completed,
            candidate_name: a.candidate_name,
            experience_level: a.experience_level,
            overall_score: a.overall_score,
            fit_assessment: a.fit_assessment,
            extraction_confidence: a.extraction_confidence,
        }),
    ))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentRow>, AppError> {
    state
        .tiers()
        .records()
        .get_document(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EssentialProjection>, AppError> {
    state
        .tiers()
        .load_essential(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))
}

/// GET /api/v1/analyses/:id/detailed
pub async fn handle_get_detailed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredAnalysis>, AppError> {
    state
        .tiers()
        .load_detailed(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))
}
