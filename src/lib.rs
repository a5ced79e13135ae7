/*!
 * # subweave - parallel subtitle generation for video files
 *
 * Splits the audio track of a video into fixed-length segments with
 * `ffmpeg`, transcribes the segments concurrently with `whisper`, and weaves
 * the per-segment SRT fragments back into one time-ordered subtitle track.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Run configuration and shared constants
 * - `segments`: Discovery of generated audio segments
 * - `external`: Splitter and transcriber process seams
 * - `worker_pool`: Bounded concurrent transcription
 * - `subtitle_processor`: SRT fragment parsing and serialization
 * - `merge`: Time-shift and merge of fragments
 * - `file_utils`: File system operations
 * - `app_controller`: Pipeline driver
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod external;
pub mod file_utils;
pub mod merge;
pub mod segments;
pub mod subtitle_processor;
pub mod worker_pool;

// Re-export main types for easier usage
pub use app_config::{PipelineConfig, SEGMENT_SECONDS};
pub use app_controller::Controller;
pub use errors::{ConfigError, PipelineError, ProcessError, TaskFailure};
pub use segments::Segment;
pub use subtitle_processor::{SubtitleEntry, SubtitleTrack};
pub use worker_pool::{PoolReport, WorkerPool};
