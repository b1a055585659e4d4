//! Essential / Detailed projections of one `Analysis`.
//!
//! The essential projection is bounded by construction: every variable-length
//! field is capped before serialization, so its encoded size has a fixed
//! upper bound far below the structured-store record limit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::analysis::{
    Analysis, AnalysisRow, ExperienceLevel, FitAssessment, SkillBreakdown,
};
use crate::storage::StorageError;
use crate::text::truncate_chars;

/// Hard per-record ceiling of the structured store.
pub const STRUCTURED_RECORD_LIMIT_BYTES: usize = 400 * 1024;

pub const SUMMARY_MAX_CHARS: usize = 1000;
pub const KEY_SKILLS_MAX: usize = 10;
pub const TOP_STRENGTHS_MAX: usize = 5;
pub const TOP_RECOMMENDATIONS_MAX: usize = 3;
/// Per-item cap for list entries copied into the essential projection.
pub const LIST_ITEM_MAX_CHARS: usize = 200;
pub const NAME_MAX_CHARS: usize = 200;

/// Cross-references recorded on the essential projection.
#[derive(Debug, Clone)]
pub struct AnalysisRefs {
    pub document_id: Uuid,
    pub extracted_text_id: Uuid,
    pub raw_text_key: Option<String>,
}

/// Size-bounded subset of an analysis kept in the structured store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssentialProjection {
    pub id: Uuid,
    pub document_id: Uuid,
    pub extracted_text_id: Uuid,
    pub candidate_name: String,
    pub experience_years: u32,
    pub experience_level: ExperienceLevel,
    pub total_skills: u32,
    pub overall_score: u8,
    pub skill_diversity: u8,
    pub fit_assessment: FitAssessment,
    pub extraction_confidence: f64,
    pub summary: String,
    pub key_skills: Vec<String>,
    pub top_strengths: Vec<String>,
    pub top_recommendations: Vec<String>,
    pub skill_breakdown: SkillBreakdown,
    pub detailed_analysis_key: String,
    pub raw_text_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Full-fidelity analysis content kept in the blob store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedProjection {
    pub analysis_id: Uuid,
    pub document_id: Uuid,
    pub full_summary: String,
    pub all_skills: Vec<String>,
    pub complete_strengths: Vec<String>,
    pub detailed_recommendations: Vec<String>,
    pub detailed_achievements: Vec<String>,
    pub full_education: Vec<String>,
    pub all_certifications: Vec<String>,
    pub skill_breakdown: SkillBreakdown,
}

/// The truncation rule shared by every list in the essential projection.
pub fn truncate_list(items: &[String], max_items: usize) -> Vec<String> {
    items
        .iter()
        .take(max_items)
        .map(|item| truncate_chars(item, LIST_ITEM_MAX_CHARS).to_string())
        .collect()
}

pub fn truncate_summary(summary: &str) -> String {
    truncate_chars(summary, SUMMARY_MAX_CHARS).to_string()
}

impl EssentialProjection {
    pub fn from_analysis(
        id: Uuid,
        analysis: &Analysis,
        refs: &AnalysisRefs,
        detailed_analysis_key: String,
    ) -> Self {
        Self {
            id,
            document_id: refs.document_id,
            extracted_text_id: refs.extracted_text_id,
            candidate_name: truncate_chars(&analysis.candidate_name, NAME_MAX_CHARS).to_string(),
            experience_years: analysis.experience_years,
            experience_level: analysis.experience_level,
            total_skills: u32::try_from(analysis.skills.len()).unwrap_or(u32::MAX),
            overall_score: analysis.overall_score,
            skill_diversity: analysis.skill_diversity,
            fit_assessment: analysis.fit_assessment,
            extraction_confidence: analysis.extraction_confidence,
            summary: truncate_summary(&analysis.summary),
            key_skills: truncate_list(&analysis.skills, KEY_SKILLS_MAX),
            top_strengths: truncate_list(&analysis.strengths, TOP_STRENGTHS_MAX),
            top_recommendations: truncate_list(&analysis.recommendations, TOP_RECOMMENDATIONS_MAX),
            skill_breakdown: analysis.skill_breakdown,
            detailed_analysis_key,
            raw_text_key: refs.raw_text_key.clone(),
            created_at: Utc::now(),
        }
    }

    /// Serialized size in bytes, as the structured store would see it.
    pub fn encoded_size(&self) -> Result<usize, StorageError> {
        Ok(serde_json::to_vec(self)?.len())
    }

    /// Fails if the record would not fit the structured store.
    pub fn check_budget(&self) -> Result<usize, StorageError> {
        let size = self.encoded_size()?;
        if size > STRUCTURED_RECORD_LIMIT_BYTES {
            return Err(StorageError::RecordTooLarge {
                size,
                limit: STRUCTURED_RECORD_LIMIT_BYTES,
            });
        }
        Ok(size)
    }
}

impl DetailedProjection {
    pub fn from_analysis(analysis_id: Uuid, document_id: Uuid, analysis: &Analysis) -> Self {
        Self {
            analysis_id,
            document_id,
            full_summary: analysis.summary.clone(),
            all_skills: analysis.skills.clone(),
            complete_strengths: analysis.strengths.clone(),
            detailed_recommendations: analysis.recommendations.clone(),
            detailed_achievements: analysis.achievements.clone(),
            full_education: analysis.education.clone(),
            all_certifications: analysis.certifications.clone(),
            skill_breakdown: analysis.skill_breakdown,
        }
    }
}

impl TryFrom<AnalysisRow> for EssentialProjection {
    type Error = StorageError;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        let experience_level = ExperienceLevel::from_label(&row.experience_level).ok_or_else(|| {
            StorageError::InvalidRecord(format!("experience_level '{}'", row.experience_level))
        })?;
        let fit_assessment = FitAssessment::from_label(&row.fit_assessment).ok_or_else(|| {
            StorageError::InvalidRecord(format!("fit_assessment '{}'", row.fit_assessment))
        })?;
        let non_negative = |field: &str, v: i32| {
            u32::try_from(v).map_err(|_| StorageError::InvalidRecord(format!("{field} = {v}")))
        };
        let score = |field: &str, v: i32| {
            u8::try_from(v).map_err(|_| StorageError::InvalidRecord(format!("{field} = {v}")))
        };

        Ok(Self {
            id: row.id,
            document_id: row.document_id,
            extracted_text_id: row.extracted_text_id,
            candidate_name: row.candidate_name,
            experience_years: non_negative("experience_years", row.experience_years)?,
            experience_level,
            total_skills: non_negative("total_skills", row.total_skills)?,
            overall_score: score("overall_score", row.overall_score)?,
            skill_diversity: score("skill_diversity", row.skill_diversity)?,
            fit_assessment,
            extraction_confidence: row.extraction_confidence,
            summary: row.summary,
            key_skills: row.key_skills,
            top_strengths: row.top_strengths,
            top_recommendations: row.top_recommendations,
            skill_breakdown: row.skill_breakdown.0,
            detailed_analysis_key: row.detailed_analysis_key,
            raw_text_key: row.raw_text_key,
            created_at: row.created_at,
        })
    }
}
