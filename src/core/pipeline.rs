//! Organization pipeline.
//!
//! Runs one organization pass over a source directory:
//!
//! ```text
//! Scanning -> Grouping -> Planning -> Copying -> Transcoding -> Done
//! ```
//!
//! Every stage completes over the whole working set before the next starts.
//! Transcoding only runs when audio downmix was requested. Progress is
//! reported as [`ProgressEvent`]s on an optional channel.

use crate::core::executor::{Executor, ExecutorConfig};
use crate::core::grouping::Grouping;
use crate::core::metadata::MetadataExtractor;
use crate::core::planner::{validate_no_duplicate_targets, PathPlanner, PlannerOptions};
use crate::core::scanner::scan_directory;
use crate::core::transcoder::{CancelHandle, TranscodeCoordinator, TranscodeJob, TranscodeStatus};
use crate::models::config::{AppConfig, RunConfig};
use crate::models::event::{EventLevel, PipelineStage, ProgressEvent};
use crate::models::plan::Plan;
use crate::services::ffmpeg::{FfmpegTranscoder, Transcoder};
use crate::utils::fs::create_dir_all;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    /// Last stage reached.
    pub stage: PipelineStage,
    pub dry_run: bool,
    pub scanned: usize,
    pub unselected: usize,
    pub planned: usize,
    pub copied: usize,
    pub moved: usize,
    pub transfer_failed: usize,
    pub transcoded: usize,
    pub transcode_failed: usize,
    pub transcode_cancelled: usize,
    pub folder_failures: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// The plan that was executed.
    pub plan: Plan,
}

impl RunReport {
    fn new(dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            stage: PipelineStage::Scanning,
            dry_run,
            scanned: 0,
            unselected: 0,
            planned: 0,
            copied: 0,
            moved: 0,
            transfer_failed: 0,
            transcoded: 0,
            transcode_failed: 0,
            transcode_cancelled: 0,
            folder_failures: 0,
            started_at: Utc::now(),
            finished_at: None,
            plan: Plan::default(),
        }
    }

    /// Whether anything failed along the way.
    pub fn has_failures(&self) -> bool {
        self.transfer_failed > 0 || self.transcode_failed > 0 || self.folder_failures > 0
    }
}

/// Overall progress ranges per stage, in percent.
fn stage_range(stage: PipelineStage, downmix: bool) -> (f32, f32) {
    let copy_end = if downmix { 60.0 } else { 100.0 };
    match stage {
        PipelineStage::Scanning => (0.0, 10.0),
        PipelineStage::Grouping => (10.0, 15.0),
        PipelineStage::Planning => (15.0, 20.0),
        PipelineStage::Copying => (20.0, copy_end),
        PipelineStage::Transcoding => (60.0, 100.0),
        PipelineStage::Done => (100.0, 100.0),
    }
}

fn percent(stage: PipelineStage, downmix: bool, done: usize, total: usize) -> f32 {
    let (start, end) = stage_range(stage, downmix);
    if total == 0 {
        return end;
    }
    start + (end - start) * done as f32 / total as f32
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runs scan, grouping, planning, transfer and downmix for a [`RunConfig`].
pub struct OrganizationPipeline {
    extractor: MetadataExtractor,
    transcoder: Arc<dyn Transcoder>,
    config: AppConfig,
    events: Option<UnboundedSender<ProgressEvent>>,
    cancel: CancelHandle,
}

impl OrganizationPipeline {
    /// Create a pipeline with the heuristic guesser and the ffmpeg transcoder
    /// from `config`.
    pub fn new(config: AppConfig) -> Self {
        let transcoder = Arc::new(FfmpegTranscoder::new(config.transcode.program.clone()));
        Self {
            extractor: MetadataExtractor::default(),
            transcoder,
            config,
            events: None,
            cancel: CancelHandle::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: MetadataExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = transcoder;
        self
    }

    /// Send progress events to `tx`.
    pub fn with_events(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Handle that stops queued transcodes from starting.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn emit(
        &self,
        stage: PipelineStage,
        overall_percent: f32,
        current_file: Option<String>,
        level: EventLevel,
        message: impl Into<String>,
    ) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(ProgressEvent {
                stage,
                overall_percent,
                current_file,
                level,
                message: message.into(),
            });
        }
    }

    /// Run the pipeline.
    ///
    /// Fails only when the source cannot be scanned or the target root
    /// cannot be created. Per-group and per-file failures are counted in
    /// the report.
    pub async fn run(&self, run: &RunConfig) -> Result<RunReport> {
        let downmix = run.downmix_audio;
        let mut report = RunReport::new(run.dry_run);
        tracing::info!(
            "Run {}: {:?} -> {:?} (content={}, downmix={}, dry_run={})",
            report.run_id,
            run.source,
            run.target,
            run.content_mode,
            downmix,
            run.dry_run
        );

        // Scanning
        self.emit(
            PipelineStage::Scanning,
            0.0,
            None,
            EventLevel::Info,
            "Scanning source directory",
        );
        let scan = scan_directory(
            &run.source,
            &self.extractor,
            run.content_mode,
            run.selected_files.as_deref(),
        )?;
        report.scanned = scan.files.len();
        report.unselected = scan.unselected;
        self.emit(
            PipelineStage::Scanning,
            percent(PipelineStage::Scanning, downmix, 1, 1),
            None,
            EventLevel::Info,
            format!(
                "Found {} video files ({} movies, {} series)",
                scan.files.len(),
                scan.movie_count(),
                scan.series_count()
            ),
        );

        // Grouping
        report.stage = PipelineStage::Grouping;
        let grouping = Grouping::build(&scan.files);
        self.emit(
            PipelineStage::Grouping,
            percent(PipelineStage::Grouping, downmix, 1, 1),
            None,
            EventLevel::Info,
            format!(
                "Grouped into {} movies and {} series",
                grouping.movies().len(),
                grouping.series().len()
            ),
        );

        // Planning
        report.stage = PipelineStage::Planning;
        if !run.dry_run {
            create_dir_all(&run.target)?;
        }
        let planner = PathPlanner::new(PlannerOptions {
            downmix_audio: downmix,
            create_folders: !run.dry_run,
        });
        let plan = planner.plan(&grouping, &run.source, &run.target);
        validate_no_duplicate_targets(&plan)?;

        report.planned = plan.entries.len();
        report.folder_failures = plan.failures.len();
        for failure in &plan.failures {
            self.emit(
                PipelineStage::Planning,
                percent(PipelineStage::Planning, downmix, 0, 1),
                Some(file_label(&failure.folder)),
                EventLevel::Error,
                format!("Skipping {} files: {}", failure.sources.len(), failure.reason),
            );
        }
        self.emit(
            PipelineStage::Planning,
            percent(PipelineStage::Planning, downmix, 1, 1),
            None,
            EventLevel::Info,
            format!("Planned {} files", plan.entries.len()),
        );

        if run.dry_run {
            report.plan = plan;
            return Ok(self.finish(report));
        }

        // Copying
        report.stage = PipelineStage::Copying;
        let executor = Executor::with_config(ExecutorConfig {
            verify_checksum: self.config.transfer.verify_checksum,
        });
        let total = plan.entries.len();
        let transfers = executor.execute(&plan, |idx, entry, result| {
            let overall = percent(PipelineStage::Copying, downmix, idx + 1, total);
            let label = Some(file_label(&entry.source.path));
            match result {
                Ok(()) => self.emit(
                    PipelineStage::Copying,
                    overall,
                    label,
                    EventLevel::Info,
                    format!("{} -> {}", entry.operation, entry.target.display()),
                ),
                Err(e) => self.emit(
                    PipelineStage::Copying,
                    overall,
                    label,
                    EventLevel::Error,
                    e.to_string(),
                ),
            }
        });
        report.copied = transfers.copied;
        report.moved = transfers.moved;
        report.transfer_failed = transfers.failed;

        // Transcoding
        let jobs: Vec<TranscodeJob> = transfers
            .completed
            .iter()
            .filter(|&&idx| plan.entries[idx].needs_transcode)
            .map(|&idx| TranscodeJob {
                index: idx,
                target: plan.entries[idx].target.clone(),
            })
            .collect();

        if downmix && !jobs.is_empty() {
            report.stage = PipelineStage::Transcoding;
            let coordinator = TranscodeCoordinator::new(
                self.transcoder.clone(),
                self.config.transcode.max_concurrent,
            )
            .with_cancel(self.cancel.clone());

            let total = jobs.len();
            let mut done = 0;
            let summary = coordinator
                .run(jobs, |outcome| {
                    done += 1;
                    let overall = percent(PipelineStage::Transcoding, downmix, done, total);
                    let label = Some(file_label(&outcome.job.target));
                    match &outcome.status {
                        TranscodeStatus::Transcoded => self.emit(
                            PipelineStage::Transcoding,
                            overall,
                            label,
                            EventLevel::Success,
                            "Audio downmixed to stereo",
                        ),
                        TranscodeStatus::Failed(reason) => self.emit(
                            PipelineStage::Transcoding,
                            overall,
                            label,
                            EventLevel::Error,
                            format!("Downmix failed, original kept: {}", reason),
                        ),
                        TranscodeStatus::Cancelled => self.emit(
                            PipelineStage::Transcoding,
                            overall,
                            label,
                            EventLevel::Warning,
                            "Downmix cancelled",
                        ),
                    }
                })
                .await;

            report.transcoded = summary.transcoded;
            report.transcode_failed = summary.failed;
            report.transcode_cancelled = summary.cancelled;
        }

        report.plan = plan;
        Ok(self.finish(report))
    }

    fn finish(&self, mut report: RunReport) -> RunReport {
        report.stage = PipelineStage::Done;
        report.finished_at = Some(Utc::now());

        let level = if report.has_failures() {
            EventLevel::Warning
        } else {
            EventLevel::Success
        };
        let message = if report.dry_run {
            format!("Dry run planned {} files", report.planned)
        } else {
            format!(
                "Organized {} files ({} copied, {} moved, {} failed)",
                report.copied + report.moved,
                report.copied,
                report.moved,
                report.transfer_failed
            )
        };
        tracing::info!("Run {} done: {}", report.run_id, message);
        self.emit(PipelineStage::Done, 100.0, None, level, message);

        report
    }
}

impl std::fmt::Debug for OrganizationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizationPipeline")
            .field("config", &self.config)
            .field("events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}
