// Résumé analysis prompt templates.

/// Characters of résumé text embedded in the prompt.
pub const MAX_PROMPT_TEXT_CHARS: usize = 4000;

pub const ANALYSIS_SYSTEM: &str = "\
You are an expert HR analyst reviewing technical résumés. \
Extract only information that is actually present in the résumé. \
Respond with a single JSON object and nothing else.";

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze this résumé and extract its real content.

FILENAME: {filename}
POTENTIAL NAME FROM FILENAME: {filename_name}

RESUME CONTENT:
{resume_text}

NAME EXTRACTION:
1. Look for the candidate's name in the header, then the contact section, then email addresses.
2. If the résumé text looks garbled (OCR errors) and the filename holds a clear full name, prefer the filename.
3. Use "Unknown Candidate" only if no name is found anywhere.

OUTPUT SCHEMA (return exactly this structure):
{
  "candidate_name": "string",
  "experience_years": integer,
  "experience_level": "Entry" | "Junior" | "Mid-level" | "Senior" | "Lead",
  "skills": ["every technical skill, language, framework and tool mentioned"],
  "overall_score": integer 1-100 (résumé quality and experience),
  "skill_diversity": integer 1-100 (variety of skills),
  "fit_assessment": "Low" | "Medium" | "High",
  "strengths": ["string"],
  "recommendations": ["specific improvement recommendation"],
  "detailed_summary": "2-3 sentence summary of background and key qualifications",
  "key_achievements": ["string"],
  "education": ["string"],
  "certifications": ["string"]
}

Return ONLY the JSON object — no code fences, no commentary."#;
