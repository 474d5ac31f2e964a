//! Plan executor module.
//!
//! Performs the copy/move stage of a plan, one entry at a time. A failed
//! transfer is reported and the batch continues.

use crate::models::plan::{FileOperation, Plan, TargetPlanEntry};
use crate::utils::hash;
use crate::Result;
use std::fs;
use std::path::Path;

/// Executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Whether to verify checksums when a move falls back to copy + delete.
    pub verify_checksum: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            verify_checksum: true,
        }
    }
}

/// Outcome of the transfer stage.
#[derive(Debug, Clone, Default)]
pub struct TransferSummary {
    /// Entries copied.
    pub copied: usize,
    /// Entries moved.
    pub moved: usize,
    /// Entries that failed.
    pub failed: usize,
    /// Indices into `plan.entries` that reached their target.
    pub completed: Vec<usize>,
}

/// Plan executor.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecutorConfig,
}

fn transfer_error(from: &Path, to: &Path, reason: impl ToString) -> crate::Error {
    crate::Error::Transfer {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason: reason.to_string(),
    }
}

impl Executor {
    /// Create a new executor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new executor with custom configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Transfer every entry of a plan.
    ///
    /// `on_entry` is called after each entry with its position, the entry
    /// and the transfer result.
    pub fn execute<F>(&self, plan: &Plan, mut on_entry: F) -> TransferSummary
    where
        F: FnMut(usize, &TargetPlanEntry, &Result<()>),
    {
        let total = plan.entries.len();
        let mut summary = TransferSummary::default();

        for (idx, entry) in plan.entries.iter().enumerate() {
            tracing::info!(
                "Execute [{}/{}]: {} {}",
                idx + 1,
                total,
                entry.operation,
                entry.target.display()
            );

            let result = self.transfer(entry);
            match &result {
                Ok(()) => {
                    match entry.operation {
                        FileOperation::Copy => summary.copied += 1,
                        FileOperation::Move => summary.moved += 1,
                    }
                    summary.completed.push(idx);
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    summary.failed += 1;
                }
            }
            on_entry(idx, entry, &result);
        }

        tracing::info!(
            "Transfers done: {} copied, {} moved, {} failed",
            summary.copied,
            summary.moved,
            summary.failed
        );

        summary
    }

    /// Transfer a single entry.
    pub fn transfer(&self, entry: &TargetPlanEntry) -> Result<()> {
        let from = &entry.source.path;
        let to = &entry.target;

        if let Some(parent) = to.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| transfer_error(from, to, e))?;
            }
        }

        match entry.operation {
            FileOperation::Copy => self.copy_file(from, to),
            FileOperation::Move => self.move_file(from, to),
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        fs::copy(from, to).map_err(|e| transfer_error(from, to, e))?;
        tracing::debug!("Copied: {:?} -> {:?}", from, to);
        Ok(())
    }

    /// Move a file.
    ///
    /// Same-filesystem moves are a rename and need no verification. Moves
    /// across filesystems copy, optionally verify the checksum, then delete
    /// the source.
    fn move_file(&self, from: &Path, to: &Path) -> Result<()> {
        match fs::rename(from, to) {
            Ok(()) => {
                tracing::debug!("Moved (rename): {:?} -> {:?}", from, to);
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
                tracing::debug!("Cross-filesystem move detected, using copy+delete");
            }
            Err(e) => return Err(transfer_error(from, to, e)),
        }

        let checksum = if self.config.verify_checksum {
            Some(hash::sha256_file(from)?)
        } else {
            None
        };

        fs::copy(from, to).map_err(|e| transfer_error(from, to, e))?;

        if let Some(original_checksum) = checksum {
            let new_checksum = hash::sha256_file(to)?;
            if original_checksum != new_checksum {
                let _ = fs::remove_file(to);
                return Err(transfer_error(from, to, "checksum mismatch after copy"));
            }
        }

        fs::remove_file(from).map_err(|e| transfer_error(from, to, e))?;
        tracing::debug!("Moved (copy+delete): {:?} -> {:?}", from, to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::{ContentType, MediaFile};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn entry(source: PathBuf, target: PathBuf, operation: FileOperation) -> TargetPlanEntry {
        TargetPlanEntry {
            source: MediaFile {
                filename: source.file_name().unwrap().to_string_lossy().to_string(),
                path: source,
                extension: "mkv".to_string(),
                content_type: ContentType::Movie,
                title: "X".to_string(),
                year: None,
                season: None,
                episode: None,
                resolution: None,
                part: None,
                extra: None,
            },
            target,
            operation,
            is_extra: false,
            needs_transcode: false,
        }
    }

    #[test]
    fn test_executor_config_default() {
        let config = ExecutorConfig::default();
        assert!(config.verify_checksum);
    }

    #[test]
    fn test_copy_and_move() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.mkv");
        let b = dir.path().join("b.mkv");
        std::fs::write(&a, b"aaa").unwrap();
        std::fs::write(&b, b"bbb").unwrap();

        let plan = Plan {
            entries: vec![
                entry(a.clone(), dir.path().join("out/one/a.mkv"), FileOperation::Copy),
                entry(b.clone(), dir.path().join("out/two/b.mkv"), FileOperation::Move),
            ],
            ..Default::default()
        };

        let mut seen = Vec::new();
        let summary =
            Executor::new().execute(&plan, |idx, _, result| seen.push((idx, result.is_ok())));

        assert_eq!(summary.copied, 1);
        assert_eq!(summary.moved, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.completed, vec![0, 1]);
        assert_eq!(seen, vec![(0, true), (1, true)]);
        assert!(a.exists());
        assert!(!b.exists());
        assert_eq!(std::fs::read(dir.path().join("out/two/b.mkv")).unwrap(), b"bbb");
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.mkv");
        std::fs::write(&good, b"ok").unwrap();

        let plan = Plan {
            entries: vec![
                entry(
                    dir.path().join("missing.mkv"),
                    dir.path().join("out/m.mkv"),
                    FileOperation::Copy,
                ),
                entry(good, dir.path().join("out/g.mkv"), FileOperation::Copy),
            ],
            ..Default::default()
        };

        let summary = Executor::new().execute(&plan, |_, _, _| {});
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.completed, vec![1]);
        assert!(dir.path().join("out/g.mkv").exists());
    }
}
