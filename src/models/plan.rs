//! Plan data model.

use super::media::MediaFile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Plan for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Run identifier.
    pub id: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Source directory.
    pub source_path: PathBuf,
    /// Target library root.
    pub target_path: PathBuf,
    /// Planned transfers, in planning order.
    pub entries: Vec<TargetPlanEntry>,
    /// Groups whose destination folder could not be created.
    pub failures: Vec<PlanFailure>,
}

impl Plan {
    /// Entries for main (non-extra) files.
    pub fn main_entries(&self) -> impl Iterator<Item = &TargetPlanEntry> {
        self.entries.iter().filter(|e| !e.is_extra)
    }

    /// Entries for extras.
    pub fn extra_entries(&self) -> impl Iterator<Item = &TargetPlanEntry> {
        self.entries.iter().filter(|e| e.is_extra)
    }

    /// Look up the entry planned for a source file.
    pub fn entry_for(&self, source: &Path) -> Option<&TargetPlanEntry> {
        self.entries.iter().find(|e| e.source.path == source)
    }
}

/// Where a single file goes and how it gets there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetPlanEntry {
    /// The scanned file.
    pub source: MediaFile,
    /// Final destination path.
    pub target: PathBuf,
    /// Copy or move.
    pub operation: FileOperation,
    /// Whether the file goes into an extras sub-folder.
    pub is_extra: bool,
    /// Whether the audio downmix runs on the target after transfer.
    pub needs_transcode: bool,
}

/// Transfer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    Copy,
    Move,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Copy => write!(f, "copy"),
            FileOperation::Move => write!(f, "move"),
        }
    }
}

/// A group that could not be planned because its folder failed to create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanFailure {
    /// Folder that could not be created.
    pub folder: PathBuf,
    /// Reason for failure.
    pub reason: String,
    /// Source files left unplanned.
    pub sources: Vec<PathBuf>,
}
