//! # Export Errors and States

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type for export operations
pub type ExportResult<T> = Result<T, PipelineError>;

/// Pipeline stage a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    /// Reading records from the source
    Sourcing,
    /// Compressing or reformatting
    Transforming,
    /// Writing to the destination
    Sinking,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Sourcing => "sourcing",
            PipelineStage::Transforming => "transforming",
            PipelineStage::Sinking => "sinking",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Sourcing,
    Transforming,
    Sinking,
    Done,
    Failed { stage: PipelineStage },
}

/// A stage of the export pipeline failed
#[derive(Debug, Clone, Error)]
#[error("Export failed while {stage}: {cause}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    pub cause: String,
}

impl PipelineError {
    pub fn new(stage: PipelineStage, cause: impl ToString) -> Self {
        Self {
            stage,
            cause: cause.to_string(),
        }
    }

    pub fn sourcing(cause: impl ToString) -> Self {
        Self::new(PipelineStage::Sourcing, cause)
    }

    pub fn transforming(cause: impl ToString) -> Self {
        Self::new(PipelineStage::Transforming, cause)
    }

    pub fn sinking(cause: impl ToString) -> Self {
        Self::new(PipelineStage::Sinking, cause)
    }
}
