//! Skill Categorizer and keyword skill extraction.

use crate::models::analysis::{SkillBreakdown, SkillCategory};

/// Cap on skills recovered from raw text when the AI supplied none.
pub const MAX_TEXT_SKILLS: usize = 15;

/// Vocabulary matched (case-insensitive substring) against résumé text.
const COMMON_SKILLS: &[&str] = &[
    "Python",
    "Java",
    "JavaScript",
    "TypeScript",
    "React",
    "Angular",
    "Vue",
    "Node.js",
    "Express",
    "Django",
    "Flask",
    "Spring",
    "HTML",
    "CSS",
    "SQL",
    "MySQL",
    "PostgreSQL",
    "MongoDB",
    "Redis",
    "AWS",
    "Azure",
    "GCP",
    "Docker",
    "Kubernetes",
    "Git",
    "Jenkins",
    "CI/CD",
    "Linux",
    "Windows",
    "Machine Learning",
    "AI",
    "TensorFlow",
    "PyTorch",
    "Pandas",
    "NumPy",
];

fn category_keywords(category: SkillCategory) -> &'static [&'static str] {
    match category {
        SkillCategory::Programming => &[
            "python",
            "java",
            "javascript",
            "typescript",
            "c++",
            "c#",
            "go",
            "rust",
        ],
        SkillCategory::Frontend => &[
            "react",
            "angular",
            "vue",
            "html",
            "css",
            "bootstrap",
            "tailwind",
        ],
        SkillCategory::Backend => &["node.js", "express", "django", "flask", "spring", "laravel"],
        SkillCategory::Database => &[
            "sql",
            "mysql",
            "postgresql",
            "mongodb",
            "redis",
            "elasticsearch",
        ],
        SkillCategory::Cloud => &["aws", "azure", "gcp", "docker", "kubernetes", "terraform"],
        SkillCategory::DevOps => &[
            "git",
            "jenkins",
            "ci/cd",
            "devops",
            "docker",
            "kubernetes",
            "linux",
        ],
        SkillCategory::Mobile => &[
            "ios",
            "android",
            "react native",
            "flutter",
            "swift",
            "kotlin",
        ],
        SkillCategory::AiMl => &[
            "machine learning",
            "ai",
            "tensorflow",
            "pytorch",
            "data science",
        ],
    }
}

/// Counts skills per fixed category by exact, case-insensitive membership.
/// A skill may land in more than one category ("Docker" is Cloud and DevOps).
pub fn categorize_skills(skills: &[String]) -> SkillBreakdown {
    let mut breakdown = SkillBreakdown::default();
    for skill in skills {
        let skill = skill.trim().to_lowercase();
        for category in SkillCategory::ALL {
            if category_keywords(category).contains(&skill.as_str()) {
                breakdown.increment(category);
            }
        }
    }
    breakdown
}

/// Finds vocabulary terms mentioned anywhere in `text`, in vocabulary order,
/// capped at `MAX_TEXT_SKILLS`.
pub fn extract_skills_from_text(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    COMMON_SKILLS
        .iter()
        .filter(|skill| lower.contains(&skill.to_lowercase()))
        .take(MAX_TEXT_SKILLS)
        .map(|skill| skill.to_string())
        .collect()
}
