//! Application configuration module.
//! Holds the run configuration built from command line flags, its defaults,
//! and the constants shared between pipeline stages.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;

/// Length of one audio segment in seconds.
///
/// The splitter cuts at this length and the merge engine shifts fragment
/// `k` by `(k - 1) * SEGMENT_SECONDS`, so both must read this constant.
pub const SEGMENT_SECONDS: u64 = 30;

/// Filename prefix of generated segments (`part001.wav`, ...)
pub const SEGMENT_PREFIX: &str = "part";

/// Audio extension of generated segments
pub const SEGMENT_EXTENSION: &str = "wav";

/// Extension of per-segment subtitle fragments
pub const FRAGMENT_EXTENSION: &str = "srt";

/// Log verbosity selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Represents the configuration of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Video file to transcribe
    pub input: PathBuf,

    /// Declared output path. Logged only, the pipeline never reads it.
    pub output: PathBuf,

    /// Maximum number of transcriber processes running at once
    pub workers: usize,

    /// Model selector passed to the transcriber
    pub model: String,

    /// Directory the splitter writes segments into
    pub audio_dir: PathBuf,

    /// Directory transcription fragments are written into
    pub subtitle_dir: PathBuf,

    /// Final merged subtitle file
    pub merged_output: PathBuf,

    /// Program name of the audio splitter
    pub splitter_program: String,

    /// Program name of the transcriber
    pub transcriber_program: String,

    /// Optional upper bound on a single external process
    pub process_timeout: Option<Duration>,

    /// Show a progress bar while segments are transcribed
    pub show_progress: bool,

    /// Log level
    pub log_level: LogLevel,
}

impl PipelineConfig {
    /// Create a configuration for the given input with every other field defaulted
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_process_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.process_timeout = timeout;
        self
    }

    /// Place the working directories and the merged output under `root`
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        self.audio_dir = root.join(default_audio_dir());
        self.subtitle_dir = root.join(default_subtitle_dir());
        self.merged_output = root.join(default_merged_output());
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::MissingInput);
        }

        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.workers));
        }

        Ok(())
    }
}

fn default_workers() -> usize {
    6
}

fn default_model() -> String {
    "base.en".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("output.mp4")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio_parts")
}

fn default_subtitle_dir() -> PathBuf {
    PathBuf::from("subtitles")
}

fn default_merged_output() -> PathBuf {
    PathBuf::from("merged_sub_titles.srt")
}

/// Default implementation for PipelineConfig
impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: default_output(),
            workers: default_workers(),
            model: default_model(),
            audio_dir: default_audio_dir(),
            subtitle_dir: default_subtitle_dir(),
            merged_output: default_merged_output(),
            splitter_program: "ffmpeg".to_string(),
            transcriber_program: "whisper".to_string(),
            process_timeout: None,
            show_progress: true,
            log_level: LogLevel::default(),
        }
    }
}
