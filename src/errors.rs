/*!
 * Error types for the subweave application.
 *
 * This module contains custom error types for the different pipeline stages,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while validating the run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No input video was given
    #[error("-input is required")]
    MissingInput,

    /// Worker count must admit at least one task
    #[error("-workers must be at least 1 (got {0})")]
    InvalidWorkerCount(usize),
}

/// Errors from launching or running an external program
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started at all
    #[error("failed to launch {program}: {source}")]
    Launch {
        /// Program name
        program: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The program ran but reported failure
    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        /// Program name
        program: String,
        /// Rendered exit status
        status: String,
        /// Filtered standard error output
        stderr: String,
    },

    /// The program did not finish in time and was killed
    #[error("{program} timed out after {timeout:?}")]
    TimedOut {
        /// Program name
        program: String,
        /// Configured limit
        timeout: Duration,
    },
}

/// A single failed transcription task
#[derive(Error, Debug)]
#[error("segment {ordinal} ({input}): {reason}")]
pub struct TaskFailure {
    /// Ordinal of the segment the task was processing
    pub ordinal: u32,
    /// Segment audio path, kept as a display string
    pub input: String,
    /// What went wrong
    pub reason: String,
}

impl TaskFailure {
    pub fn new(ordinal: u32, input: &std::path::Path, reason: impl ToString) -> Self {
        Self {
            ordinal,
            input: input.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Main pipeline error type that wraps all other errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Splitter or transcriber failure
    #[error("External process error: {0}")]
    Process(#[from] ProcessError),

    /// Directory or file operation failure
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        /// Path being operated on
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// One or more worker tasks failed
    #[error("{} segment task(s) failed", .0.len())]
    TaskFailures(Vec<TaskFailure>),
}

impl PipelineError {
    /// Wrap an IO error with the path it happened on
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}
