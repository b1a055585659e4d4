use std::panic;

use tracing::debug;

use super::ExtractError;

/// Extracts text page by page and concatenates the pages in order.
/// Pages without a text layer contribute nothing.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| ExtractError::Pdf("PDF parser aborted on malformed input".to_string()))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    debug!("PDF has {} pages", pages.len());
    let text = join_pages(pages);
    if text.is_empty() {
        return Err(ExtractError::Pdf("no text could be extracted".to_string()));
    }
    Ok(text)
}

fn join_pages(pages: Vec<String>) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
