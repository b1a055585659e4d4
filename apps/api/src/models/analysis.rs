use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Enumerations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Entry,
    Junior,
    #[serde(rename = "Mid-level")]
    MidLevel,
    Senior,
    Lead,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry",
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::MidLevel => "Mid-level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Lead => "Lead",
        }
    }

    /// Case-insensitive label match. Accepts the common spellings of mid-level
    /// and an optional "-level" suffix on the others ("Entry-level").
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        let normalized = normalized
            .strip_suffix("-level")
            .or_else(|| normalized.strip_suffix(" level"))
            .unwrap_or(&normalized);
        match normalized {
            "entry" => Some(ExperienceLevel::Entry),
            "junior" => Some(ExperienceLevel::Junior),
            "mid" | "midlevel" => Some(ExperienceLevel::MidLevel),
            "senior" => Some(ExperienceLevel::Senior),
            "lead" => Some(ExperienceLevel::Lead),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitAssessment {
    Low,
    Medium,
    High,
}

impl FitAssessment {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitAssessment::Low => "Low",
            FitAssessment::Medium => "Medium",
            FitAssessment::High => "High",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(FitAssessment::Low),
            "medium" => Some(FitAssessment::Medium),
            "high" => Some(FitAssessment::High),
            _ => None,
        }
    }
}

/// Fixed skill taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillCategory {
    Programming,
    Frontend,
    Backend,
    Database,
    Cloud,
    DevOps,
    Mobile,
    AiMl,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 8] = [
        SkillCategory::Programming,
        SkillCategory::Frontend,
        SkillCategory::Backend,
        SkillCategory::Database,
        SkillCategory::Cloud,
        SkillCategory::DevOps,
        SkillCategory::Mobile,
        SkillCategory::AiMl,
    ];
}

/// Per-category skill counts. Every category is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBreakdown {
    #[serde(rename = "Programming", default)]
    pub programming: u32,
    #[serde(rename = "Frontend", default)]
    pub frontend: u32,
    #[serde(rename = "Backend", default)]
    pub backend: u32,
    #[serde(rename = "Database", default)]
    pub database: u32,
    #[serde(rename = "Cloud", default)]
    pub cloud: u32,
    #[serde(rename = "DevOps", default)]
    pub devops: u32,
    #[serde(rename = "Mobile", default)]
    pub mobile: u32,
    #[serde(rename = "AI_ML", default)]
    pub ai_ml: u32,
}

impl SkillBreakdown {
    pub fn get(&self, category: SkillCategory) -> u32 {
        match category {
            SkillCategory::Programming => self.programming,
            SkillCategory::Frontend => self.frontend,
            SkillCategory::Backend => self.backend,
            SkillCategory::Database => self.database,
            SkillCategory::Cloud => self.cloud,
            SkillCategory::DevOps => self.devops,
            SkillCategory::Mobile => self.mobile,
            SkillCategory::AiMl => self.ai_ml,
        }
    }

    pub fn increment(&mut self, category: SkillCategory) {
        let slot = match category {
            SkillCategory::Programming => &mut self.programming,
            SkillCategory::Frontend => &mut self.frontend,
            SkillCategory::Backend => &mut self.backend,
            SkillCategory::Database => &mut self.database,
            SkillCategory::Cloud => &mut self.cloud,
            SkillCategory::DevOps => &mut self.devops,
            SkillCategory::Mobile => &mut self.mobile,
            SkillCategory::AiMl => &mut self.ai_ml,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u32 {
        SkillCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical analysis record
// ────────────────────────────────────────────────────────────────────────────

pub const UNKNOWN_CANDIDATE: &str = "Unknown Candidate";

/// Canonical, validated result of interpreting one extracted text.
///
/// Scores are always inside [1, 100], confidence inside [0, 1], and list
/// fields are never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub candidate_name: String,
    pub experience_years: u32,
    pub experience_level: ExperienceLevel,
    pub skills: Vec<String>,
    pub skill_breakdown: SkillBreakdown,
    pub overall_score: u8,
    pub skill_diversity: u8,
    pub fit_assessment: FitAssessment,
    pub summary: String,
    pub strengths: Vec<String>,
    pub recommendations: Vec<String>,
    pub achievements: Vec<String>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
    pub extraction_confidence: f64,
}

/// Row shape of the `analyses` table (the essential projection as stored).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub document_id: Uuid,
    pub extracted_text_id: Uuid,
    pub candidate_name: String,
    pub experience_years: i32,
    pub experience_level: String,
    pub total_skills: i32,
    pub overall_score: i32,
    pub skill_diversity: i32,
    pub fit_assessment: String,
    pub extraction_confidence: f64,
    pub summary: String,
    pub key_skills: Vec<String>,
    pub top_strengths: Vec<String>,
    pub top_recommendations: Vec<String>,
    pub skill_breakdown: sqlx::types::Json<SkillBreakdown>,
    pub detailed_analysis_key: String,
    pub raw_text_key: Option<String>,
    pub created_at: DateTime<Utc>,
}
