//! Analysis — AI inference plus the deterministic repair and fallback logic
//! that turns whatever comes back into a canonical `Analysis`.

pub mod inference;
pub mod names;
pub mod normalizer;
pub mod prompts;
pub mod skills;

pub use inference::{AnalysisInferenceClient, InferenceUnavailable};
pub use normalizer::{AnalysisNormalizer, FallbackPolicy};
