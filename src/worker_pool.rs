/*!
 * Bounded worker pool for per-segment transcription.
 *
 * Every segment gets its own task up front. A semaphore sized to the worker
 * count limits how many of them run the transcriber at once, and the pool
 * waits for all tasks before reporting. A failing task never cancels the
 * others; failures are collected and returned together.
 */

use std::sync::Arc;

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::errors::{PipelineError, TaskFailure};
use crate::external::Transcriber;
use crate::file_utils::FileManager;
use crate::segments::Segment;

/// Outcome of one pool run
#[derive(Debug, Default)]
pub struct PoolReport {
    /// Tasks started
    pub attempted: usize,
    /// Tasks that finished without error
    pub succeeded: usize,
    /// One entry per failed task, in completion order
    pub failures: Vec<TaskFailure>,
}

impl PoolReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn a report with failures into [`PipelineError::TaskFailures`]
    pub fn into_result(self) -> Result<usize, PipelineError> {
        if self.failures.is_empty() {
            Ok(self.succeeded)
        } else {
            Err(PipelineError::TaskFailures(self.failures))
        }
    }
}

/// Runs one transcription per segment with bounded concurrency
pub struct WorkerPool {
    max_workers: usize,
    show_progress: bool,
}

impl WorkerPool {
    /// Create a pool admitting `max_workers` concurrent tasks (at least one)
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Transcribe every segment and wait for all of them to finish
    pub async fn run(&self, segments: Vec<Segment>, transcriber: Arc<dyn Transcriber>) -> PoolReport {
        let total = segments.len();
        if total == 0 {
            return PoolReport::default();
        }

        info!("Transcribing {} segment(s) with up to {} worker(s)", total, self.max_workers);

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let failures = Arc::new(Mutex::new(Vec::new()));
        let progress_bar = self.progress_bar(total);

        let mut tasks = Vec::with_capacity(total);
        let mut task_segments = Vec::with_capacity(total);

        for segment in segments {
            let semaphore = Arc::clone(&semaphore);
            let failures = Arc::clone(&failures);
            let transcriber = Arc::clone(&transcriber);
            let progress_bar = progress_bar.clone();
            task_segments.push((segment.ordinal, segment.input.clone()));

            tasks.push(tokio::spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();

                let result = process_segment(&segment, transcriber.as_ref()).await;
                if let Err(failure) = result {
                    error!("Error processing segment: {}", failure);
                    failures.lock().push(failure);
                }

                progress_bar.inc(1);
            }));
        }

        let outcomes = join_all(tasks).await;
        progress_bar.finish_and_clear();

        let mut failures = std::mem::take(&mut *failures.lock());
        for (outcome, (ordinal, input)) in outcomes.into_iter().zip(task_segments) {
            if let Err(join_error) = outcome {
                error!("Task for segment {} aborted: {}", ordinal, join_error);
                failures.push(TaskFailure::new(ordinal, &input, join_error));
            }
        }

        let report = PoolReport {
            attempted: total,
            succeeded: total - failures.len(),
            failures,
        };
        info!("Transcription finished: {} succeeded, {} failed", report.succeeded, report.failures.len());
        report
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}

/// Run one segment: make sure the fragment directory exists, transcribe,
/// then drop the consumed audio file.
async fn process_segment(segment: &Segment, transcriber: &dyn Transcriber) -> Result<(), TaskFailure> {
    if let Some(dir) = segment.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| TaskFailure::new(segment.ordinal, &segment.input, format!("cannot create {}: {}", dir.display(), e)))?;
    }

    debug!("Segment {}: {} -> {}", segment.ordinal, segment.input.display(), segment.output.display());
    transcriber
        .transcribe(&segment.input, &segment.output)
        .await
        .map_err(|e| TaskFailure::new(segment.ordinal, &segment.input, e))?;

    FileManager::remove_file_best_effort(&segment.input);
    Ok(())
}
