//! Analysis Inference Client — one prompt, one call, first JSON object.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::names::resolve_name;
use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM, MAX_PROMPT_TEXT_CHARS};
use crate::llm_client::{InferenceConfig, InferenceService, LlmError};
use crate::text::truncate_chars;

/// Why no structured object came back. Never fatal: the caller falls back.
#[derive(Debug, Error)]
pub enum InferenceUnavailable {
    #[error("inference call failed: {0}")]
    CallFailed(#[from] LlmError),

    #[error("no JSON object found in reply")]
    NoJsonObject,

    #[error("malformed JSON object in reply: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct AnalysisInferenceClient {
    service: Arc<dyn InferenceService>,
    config: InferenceConfig,
}

impl AnalysisInferenceClient {
    pub fn new(service: Arc<dyn InferenceService>, config: InferenceConfig) -> Self {
        Self { service, config }
    }

    /// Asks the model for a structured analysis of `text`. One attempt only.
    pub async fn analyze(&self, text: &str, filename: &str) -> Result<Value, InferenceUnavailable> {
        let prompt = build_prompt(text, filename);
        let reply = self
            .service
            .complete(&prompt, ANALYSIS_SYSTEM, &self.config)
            .await?;
        info!("Inference reply received for {filename} ({} chars)", reply.len());

        let span = first_json_object(&reply).ok_or_else(|| {
            warn!("No JSON object in inference reply for {filename}");
            InferenceUnavailable::NoJsonObject
        })?;
        Ok(serde_json::from_str(span)?)
    }
}

pub fn build_prompt(text: &str, filename: &str) -> String {
    let filename_name = resolve_name(filename).unwrap_or_default();
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{filename}", filename)
        .replace("{filename_name}", &filename_name)
        .replace("{resume_text}", truncate_chars(text, MAX_PROMPT_TEXT_CHARS))
}

/// Returns the first balanced `{...}` span in `reply`. Braces inside JSON
/// string literals are ignored. `None` when no span closes.
pub fn first_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in reply[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&reply[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
