use std::fmt;

use serde::Serialize;

/// Where one document is in its processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    Received,
    Extracting,
    Analyzing,
    Persisting,
    Completed,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Completed | PipelineStage::Failed)
    }

    /// The forward path is fixed; FAILED is reachable from any live stage.
    pub fn can_advance_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Received, Extracting)
            | (Extracting, Analyzing)
            | (Analyzing, Persisting)
            | (Persisting, Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Received => "RECEIVED",
            PipelineStage::Extracting => "EXTRACTING",
            PipelineStage::Analyzing => "ANALYZING",
            PipelineStage::Persisting => "PERSISTING",
            PipelineStage::Completed => "COMPLETED",
            PipelineStage::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
