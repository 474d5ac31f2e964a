//! Progress events emitted by the pipeline.

use serde::{Deserialize, Serialize};

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Scanning,
    Grouping,
    Planning,
    Copying,
    Transcoding,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Scanning => "scanning",
            PipelineStage::Grouping => "grouping",
            PipelineStage::Planning => "planning",
            PipelineStage::Copying => "copying",
            PipelineStage::Transcoding => "transcoding",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Severity of a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A progress update for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Stage the event belongs to.
    pub stage: PipelineStage,
    /// Overall completion, 0.0 to 100.0.
    pub overall_percent: f32,
    /// File the event is about, if any.
    pub current_file: Option<String>,
    /// Severity.
    pub level: EventLevel,
    /// Human readable message.
    pub message: String,
}
