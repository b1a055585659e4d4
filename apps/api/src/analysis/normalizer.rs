//! Analysis Normalizer — turns untrusted AI output into a valid `Analysis`.
//!
//! Each field has one coercion function with an explicit default; `normalize`
//! composes them and is total. When no usable candidate structure exists the
//! whole record is synthesised from the raw text and filename instead.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::analysis::names::resolve_name;
use crate::analysis::skills::{categorize_skills, extract_skills_from_text};
use crate::models::analysis::{Analysis, ExperienceLevel, FitAssessment, UNKNOWN_CANDIDATE};
use crate::text::clean_text;

/// Confidence recorded when the AI structure was available and validated.
pub const AI_CONFIDENCE: f64 = 0.85;
/// Confidence recorded for a fully synthesised fallback record.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

const DEFAULT_OVERALL_SCORE: u8 = 50;
const DEFAULT_SKILL_DIVERSITY: u8 = 30;
const MIN_EXPERIENCE_YEARS: u32 = 1;

pub const DEFAULT_STRENGTH: &str = "Professional Background";
pub const DEFAULT_RECOMMENDATION: &str = "Continue professional development";

static YEARS_OF_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*\+?\s*years?\s*(?:of\s*)?(?:experience|exp)").expect("valid regex")
});
static EXPERIENCE_OF_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"experience\s*(?:of\s*)?(\d+)\s*\+?\s*years?").expect("valid regex")
});
static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(-?\d+)").expect("valid regex"));

/// Heuristic constants for fallback synthesis. Placeholder policy, not a
/// calibrated model; tune freely.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    pub base_score: u32,
    pub score_per_skill: u32,
    pub score_per_year: u32,
    pub diversity_per_skill: u32,
    pub senior_min_years: u32,
    pub mid_level_min_years: u32,
    pub high_fit_min_score: u8,
    pub medium_fit_min_score: u8,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            base_score: 25,
            score_per_skill: 5,
            score_per_year: 3,
            diversity_per_skill: 8,
            senior_min_years: 7,
            mid_level_min_years: 3,
            high_fit_min_score: 70,
            medium_fit_min_score: 50,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisNormalizer {
    policy: FallbackPolicy,
}

impl AnalysisNormalizer {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self { policy }
    }

    /// Produces a valid `Analysis` for any input. Never panics, never errors.
    pub fn normalize(&self, candidate: Option<&Value>, text: &str, filename: &str) -> Analysis {
        match candidate.and_then(Value::as_object) {
            Some(obj) => self.repair_candidate(obj, text, filename),
            None => {
                debug!("No candidate structure for {filename}; synthesising fallback analysis");
                self.fallback(text, filename)
            }
        }
    }

    fn repair_candidate(&self, obj: &Map<String, Value>, text: &str, filename: &str) -> Analysis {
        let candidate_name = coerce_name(obj.get("candidate_name"))
            .or_else(|| resolve_name(filename))
            .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string());

        let skills = coerce_string_list(obj.get("skills"))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| extract_skills_from_text(text));

        let summary = first_text(obj, &["detailed_summary", "summary"])
            .unwrap_or_else(|| format!("Professional analysis for {candidate_name}"));

        Analysis {
            experience_years: coerce_years(obj.get("experience_years")),
            experience_level: obj
                .get("experience_level")
                .and_then(Value::as_str)
                .and_then(ExperienceLevel::from_label)
                .unwrap_or(ExperienceLevel::Junior),
            skill_breakdown: categorize_skills(&skills),
            skills,
            overall_score: coerce_score(obj.get("overall_score"), DEFAULT_OVERALL_SCORE),
            skill_diversity: coerce_score(obj.get("skill_diversity"), DEFAULT_SKILL_DIVERSITY),
            fit_assessment: obj
                .get("fit_assessment")
                .and_then(Value::as_str)
                .and_then(FitAssessment::from_label)
                .unwrap_or(FitAssessment::Medium),
            summary,
            strengths: list_or_default(obj.get("strengths"), DEFAULT_STRENGTH),
            recommendations: list_or_default(obj.get("recommendations"), DEFAULT_RECOMMENDATION),
            achievements: first_list(obj, &["key_achievements", "achievements"]),
            education: coerce_string_list(obj.get("education")).unwrap_or_default(),
            certifications: coerce_string_list(obj.get("certifications")).unwrap_or_default(),
            extraction_confidence: AI_CONFIDENCE,
            candidate_name,
        }
    }

    /// Builds a low-confidence record from the text alone.
    pub fn fallback(&self, text: &str, filename: &str) -> Analysis {
        let p = &self.policy;
        let candidate_name = resolve_name(filename).unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string());
        let skills = extract_skills_from_text(text);
        let years = years_from_text(text);
        let skill_count = skills.len() as u32;

        let experience_level = if years >= p.senior_min_years {
            ExperienceLevel::Senior
        } else if years >= p.mid_level_min_years {
            ExperienceLevel::MidLevel
        } else {
            ExperienceLevel::Junior
        };

        let overall = p
            .base_score
            .saturating_add(p.score_per_skill.saturating_mul(skill_count))
            .saturating_add(p.score_per_year.saturating_mul(years));
        let overall_score = clamp_score(i64::from(overall));
        let skill_diversity = clamp_score(i64::from(p.diversity_per_skill.saturating_mul(skill_count)));

        let fit_assessment = if overall_score >= p.high_fit_min_score {
            FitAssessment::High
        } else if overall_score >= p.medium_fit_min_score {
            FitAssessment::Medium
        } else {
            FitAssessment::Low
        };

        Analysis {
            summary: format!("Fallback analysis for {candidate_name} - AI analysis unavailable"),
            candidate_name,
            experience_years: years,
            experience_level,
            skill_breakdown: categorize_skills(&skills),
            skills,
            overall_score,
            skill_diversity,
            fit_assessment,
            strengths: vec![DEFAULT_STRENGTH.to_string()],
            recommendations: vec![DEFAULT_RECOMMENDATION.to_string()],
            achievements: vec![],
            education: vec![],
            certifications: vec![],
            extraction_confidence: FALLBACK_CONFIDENCE,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field coercion
// ────────────────────────────────────────────────────────────────────────────

/// Best-effort integer from a JSON number or numeric-looking string
/// ("7", "7.6", "5+ years"). Placeholders like "N/A" yield `None`.
fn coerce_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.round() as i64)
                })
                .or_else(|| {
                    LEADING_INT
                        .captures(s)
                        .and_then(|c| c.get(1))
                        .and_then(|m| m.as_str().parse::<i64>().ok())
                })
        }
        _ => None,
    }
}

fn clamp_score(n: i64) -> u8 {
    n.clamp(1, 100) as u8
}

fn coerce_score(value: Option<&Value>, default: u8) -> u8 {
    coerce_int(value).map(clamp_score).unwrap_or(default)
}

/// Years floor at 1: zero, negative and unparseable all become 1.
fn coerce_years(value: Option<&Value>) -> u32 {
    match coerce_int(value) {
        Some(n) if n >= i64::from(MIN_EXPERIENCE_YEARS) => u32::try_from(n).unwrap_or(u32::MAX),
        _ => MIN_EXPERIENCE_YEARS,
    }
}

fn coerce_name(value: Option<&Value>) -> Option<String> {
    let name = clean_text(value?.as_str()?);
    if name.is_empty() || name.eq_ignore_ascii_case(UNKNOWN_CANDIDATE) {
        None
    } else {
        Some(name)
    }
}

/// `Some` only for JSON arrays; keeps non-blank string items.
fn coerce_string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(clean_text)
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn list_or_default(value: Option<&Value>, default: &str) -> Vec<String> {
    coerce_string_list(value)
        .filter(|items| !items.is_empty())
        .unwrap_or_else(|| vec![default.to_string()])
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(clean_text)
        .find(|s| !s.is_empty())
}

fn first_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|k| coerce_string_list(obj.get(*k)))
        .unwrap_or_default()
}

/// Largest "N years of experience" figure in the text, floored at 1.
fn years_from_text(text: &str) -> u32 {
    let lower = text.to_lowercase();
    [&*YEARS_OF_EXPERIENCE, &*EXPERIENCE_OF_YEARS]
        .iter()
        .flat_map(|re| re.captures_iter(&lower))
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        .max()
        .unwrap_or(MIN_EXPERIENCE_YEARS)
        .max(MIN_EXPERIENCE_YEARS)
}
