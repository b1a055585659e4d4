use std::sync::Arc;

use crate::pipeline::Pipeline;
use crate::storage::StorageTierWriter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn tiers(&self) -> &StorageTierWriter {
        self.pipeline.tiers()
    }
}
