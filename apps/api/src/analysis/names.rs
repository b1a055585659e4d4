//! Name Resolver — guesses a candidate name from an upload filename.

use std::sync::LazyLock;

use regex::Regex;

const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".doc", ".txt"];

/// Tokens that label the file as a résumé rather than naming a person.
const RESUME_MARKERS: &[&str] = &["resume", "résumé", "cv"];

static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Returns a title-cased name of at least two words, or `None` when the
/// filename carries no usable name.
///
/// `John_Smith_Resume_2023.pdf` → `John Smith`; `resume.pdf` → `None`.
pub fn resolve_name(filename: &str) -> Option<String> {
    let stem = strip_extension(filename.trim());
    let spaced = stem.replace(['_', '-', '.'], " ");
    let split = CAMEL_BOUNDARY.replace_all(&spaced, "$1 $2");
    // Covers 4-digit years along with any other digit run.
    let no_digits = DIGIT_RUN.replace_all(&split, " ");

    let words: Vec<String> = no_digits
        .split_whitespace()
        .filter(|w| !RESUME_MARKERS.iter().any(|m| w.to_lowercase() == *m))
        .map(title_case)
        .collect();

    if words.len() >= 2 {
        Some(words.join(" "))
    } else {
        None
    }
}

fn strip_extension(filename: &str) -> &str {
    for ext in DOCUMENT_EXTENSIONS {
        let Some(split) = filename.len().checked_sub(ext.len()) else {
            continue;
        };
        if let (Some(stem), Some(tail)) = (filename.get(..split), filename.get(split..)) {
            if tail.eq_ignore_ascii_case(ext) {
                return stem;
            }
        }
    }
    filename
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}
