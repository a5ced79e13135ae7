/*!
 * External programs driven by the pipeline.
 *
 * The audio splitter and the transcriber are opaque command-line tools. Each
 * sits behind a small async trait so the pipeline can be driven with stand-ins,
 * and both production implementations go through [`run_command`].
 */

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use tokio::process::Command;

use crate::app_config::{PipelineConfig, SEGMENT_EXTENSION, SEGMENT_PREFIX, SEGMENT_SECONDS};
use crate::errors::ProcessError;

/// Cuts the source video's audio track into fixed-length segments
#[async_trait]
pub trait AudioSplitter: Send + Sync {
    /// Write `part001.wav`, `part002.wav`, ... for `input` into `audio_dir`
    async fn split(&self, input: &Path, audio_dir: &Path) -> Result<(), ProcessError>;
}

/// Produces an SRT fragment for one audio segment
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, input: &Path, output: &Path) -> Result<(), ProcessError>;
}

/// `ffmpeg`-backed splitter
#[derive(Debug, Clone)]
pub struct FfmpegSplitter {
    program: String,
    timeout: Option<Duration>,
}

impl FfmpegSplitter {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self { program: program.into(), timeout }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.splitter_program.clone(), config.process_timeout)
    }

    /// Arguments for one split run
    pub fn build_args(input: &Path, audio_dir: &Path) -> Vec<OsString> {
        let pattern = audio_dir.join(format!("{}%03d.{}", SEGMENT_PREFIX, SEGMENT_EXTENSION));
        let segment_time = SEGMENT_SECONDS.to_string();
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];
        args.extend(
            [
                "-vn", // no video
                "-c:a", "pcm_s16le",
                "-ar", "16000",
                "-f", "segment",
                "-segment_time", segment_time.as_str(),
                // numbering from 1 keeps file suffixes equal to segment ordinals
                "-segment_start_number", "1",
                "-reset_timestamps", "1",
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(pattern.into());
        args
    }
}

#[async_trait]
impl AudioSplitter for FfmpegSplitter {
    async fn split(&self, input: &Path, audio_dir: &Path) -> Result<(), ProcessError> {
        run_command(&self.program, &Self::build_args(input, audio_dir), self.timeout).await
    }
}

/// `whisper`-backed transcriber
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    program: String,
    model: String,
    timeout: Option<Duration>,
}

impl WhisperTranscriber {
    pub fn new(program: impl Into<String>, model: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self { program: program.into(), model: model.into(), timeout }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.transcriber_program.clone(), config.model.clone(), config.process_timeout)
    }

    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            input.into(),
            "--model".into(),
            self.model.clone().into(),
            "-f".into(),
            "srt".into(),
            "-o".into(),
            output.into(),
        ]
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, input: &Path, output: &Path) -> Result<(), ProcessError> {
        run_command(&self.program, &self.build_args(input, output), self.timeout).await
    }
}

/// Run a program to completion, failing on launch error, non-zero exit or timeout.
///
/// The child is killed if the timeout fires.
pub async fn run_command(program: &str, args: &[OsString], timeout: Option<Duration>) -> Result<(), ProcessError> {
    info!("Running: {} {}", program, render_args(args));

    let output_future = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let result = match timeout {
        Some(limit) => tokio::select! {
            result = output_future => result,
            _ = tokio::time::sleep(limit) => {
                error!("{} timed out after {:?}", program, limit);
                return Err(ProcessError::TimedOut { program: program.to_string(), timeout: limit });
            }
        },
        None => output_future.await,
    };

    let output = result.map_err(|source| ProcessError::Launch { program: program.to_string(), source })?;

    if !output.stdout.is_empty() {
        debug!("{} stdout:\n{}", program, String::from_utf8_lossy(&output.stdout).trim_end());
    }

    if !output.status.success() {
        let stderr = filter_tool_stderr(&String::from_utf8_lossy(&output.stderr));
        return Err(ProcessError::NonZeroExit {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr,
        });
    }

    Ok(())
}

fn render_args(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep only meaningful stderr lines, dropping the ffmpeg banner, build
/// configuration and stream metadata noise.
pub fn filter_tool_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "no diagnostic output".to_string()
    } else {
        meaningful.join("\n")
    }
}
