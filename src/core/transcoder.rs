//! Post-transfer audio downmix coordinator.
//!
//! A fixed number of workers drain a bounded job queue. Each job runs the
//! transcoder on the blocking pool, writing `{base}.temp{ext}` next to the
//! target, and on success renames the temp file over the target. The
//! coordinator returns only after every worker has finished.

use crate::services::ffmpeg::Transcoder;
use crate::utils::fs::temp_path_for;
use crate::Result;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Upper bound on transcodes running at once, whatever the caller asks for.
pub const MAX_CONCURRENT_TRANSCODES: usize = 2;

/// Shared flag that stops workers from starting queued jobs.
///
/// Jobs already running are not interrupted. The handle also tracks whether
/// a batch is running, so an interrupt outside a batch can be told apart.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether a transcode batch is running.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Cancel the running batch gracefully.
    ///
    /// Returns `false` when no batch is running or a cancel was already
    /// requested; the caller should then abort outright.
    pub fn request_cancel(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }
}

/// One file to downmix in place.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    /// Index of the plan entry the job belongs to.
    pub index: usize,
    /// Transferred file to downmix.
    pub target: PathBuf,
}

/// What happened to a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeStatus {
    Transcoded,
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct TranscodeOutcome {
    pub job: TranscodeJob,
    pub status: TranscodeStatus,
}

/// Totals for a transcode batch.
#[derive(Debug, Clone, Default)]
pub struct TranscodeSummary {
    pub transcoded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl TranscodeSummary {
    fn record(&mut self, status: &TranscodeStatus) {
        match status {
            TranscodeStatus::Transcoded => self.transcoded += 1,
            TranscodeStatus::Failed(_) => self.failed += 1,
            TranscodeStatus::Cancelled => self.cancelled += 1,
        }
    }
}

/// Downmix `target` through a temp file, replacing it on success.
///
/// On failure the temp file is removed and the target is left untouched.
pub fn downmix_in_place(transcoder: &dyn Transcoder, target: &Path) -> Result<()> {
    let temp = temp_path_for(target);

    if let Err(e) = transcoder.transcode(target, &temp) {
        if temp.exists() {
            let _ = std::fs::remove_file(&temp);
        }
        return Err(e);
    }

    std::fs::rename(&temp, target).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        crate::Error::Transcode {
            path: target.to_path_buf(),
            reason: format!("cannot replace with {:?}: {}", temp, e),
        }
    })
}

/// Bounded-concurrency transcode runner.
#[derive(Clone)]
pub struct TranscodeCoordinator {
    transcoder: Arc<dyn Transcoder>,
    max_concurrent: usize,
    cancel: CancelHandle,
}

impl std::fmt::Debug for TranscodeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscodeCoordinator")
            .field("max_concurrent", &self.max_concurrent)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl TranscodeCoordinator {
    /// Create a coordinator running at most `max_concurrent` jobs at once,
    /// clamped to `1..=MAX_CONCURRENT_TRANSCODES`.
    pub fn new(transcoder: Arc<dyn Transcoder>, max_concurrent: usize) -> Self {
        if max_concurrent > MAX_CONCURRENT_TRANSCODES {
            tracing::warn!(
                "Requested {} concurrent transcodes, capping at {}",
                max_concurrent,
                MAX_CONCURRENT_TRANSCODES
            );
        }
        Self {
            transcoder,
            max_concurrent: max_concurrent.clamp(1, MAX_CONCURRENT_TRANSCODES),
            cancel: CancelHandle::new(),
        }
    }

    /// Use an externally owned cancel handle.
    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run every job and wait for all workers.
    ///
    /// `on_outcome` is called on the calling task as each job finishes;
    /// completion order is unspecified.
    pub async fn run<F>(&self, jobs: Vec<TranscodeJob>, mut on_outcome: F) -> TranscodeSummary
    where
        F: FnMut(&TranscodeOutcome),
    {
        let mut summary = TranscodeSummary::default();
        if jobs.is_empty() {
            return summary;
        }

        tracing::info!(
            "Downmixing {} files with {} workers",
            jobs.len(),
            self.max_concurrent
        );

        self.cancel.set_active(true);
        let (job_tx, job_rx) = mpsc::channel::<TranscodeJob>(self.max_concurrent);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

        let feeder = tokio::spawn(async move {
            for job in jobs {
                if job_tx.send(job).await.is_err() {
                    break;
                }
            }
        });

        let workers: Vec<_> = (0..self.max_concurrent)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    job_rx.clone(),
                    outcome_tx.clone(),
                    self.transcoder.clone(),
                    self.cancel.clone(),
                ))
            })
            .collect();
        drop(outcome_tx);

        while let Some(outcome) = outcome_rx.recv().await {
            summary.record(&outcome.status);
            on_outcome(&outcome);
        }

        for result in join_all(workers).await {
            if let Err(e) = result {
                tracing::error!("Transcode worker failed: {}", e);
            }
        }
        if let Err(e) = feeder.await {
            tracing::error!("Transcode feeder failed: {}", e);
        }
        self.cancel.set_active(false);

        tracing::info!(
            "Downmix done: {} transcoded, {} failed, {} cancelled",
            summary.transcoded,
            summary.failed,
            summary.cancelled
        );

        summary
    }
}

async fn run_worker(
    worker_id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<TranscodeJob>>>,
    outcomes: mpsc::UnboundedSender<TranscodeOutcome>,
    transcoder: Arc<dyn Transcoder>,
    cancel: CancelHandle,
) {
    loop {
        let next = { jobs.lock().await.recv().await };
        let Some(job) = next else {
            break;
        };

        let status = if cancel.is_cancelled() {
            tracing::debug!("Worker {}: skipping {:?} (cancelled)", worker_id, job.target);
            TranscodeStatus::Cancelled
        } else {
            tracing::debug!("Worker {}: downmixing {:?}", worker_id, job.target);
            let transcoder = transcoder.clone();
            let target = job.target.clone();
            let task = tokio::task::spawn_blocking(move || {
                downmix_in_place(transcoder.as_ref(), &target)
            });
            match task.await {
                Ok(Ok(())) => TranscodeStatus::Transcoded,
                Ok(Err(e)) => {
                    tracing::error!("{}", e);
                    TranscodeStatus::Failed(e.to_string())
                }
                Err(e) => {
                    tracing::error!("Transcode task for {:?} panicked: {}", job.target, e);
                    TranscodeStatus::Failed(e.to_string())
                }
            }
        };

        if outcomes.send(TranscodeOutcome { job, status }).is_err() {
            break;
        }
    }
}
