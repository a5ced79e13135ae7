// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use subweave::app_config::{LogLevel, PipelineConfig};
use subweave::errors::ConfigError;
use subweave::Controller;

/// Long flags that may also be written with a single dash (`-input movie.mkv`)
const SINGLE_DASH_LONG_FLAGS: &[&str] = &["input", "output", "workers", "model", "timeout-secs", "log-level", "no-progress"];

/// Flags whose value is the next argument when not given inline with `=`
const VALUE_FLAGS: &[&str] = &[
    "-i", "--input", "-o", "--output", "-w", "--workers", "--model", "--timeout-secs", "--log-level",
];

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for subweave
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subweave - parallel subtitle generation
///
/// Splits the audio of a video into 30 second segments, transcribes them in
/// parallel and merges the results into one SRT file.
#[derive(Parser, Debug)]
#[command(name = "subweave")]
#[command(version)]
#[command(about = "Generate subtitles for a video with ffmpeg and whisper")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "subweave splits the audio track of a video into 30 second segments with ffmpeg,
transcribes every segment in parallel with whisper, and merges the fragments into
merged_sub_titles.srt in the current directory.

EXAMPLES:
    subweave -input movie.mkv                   # Transcribe with 6 workers
    subweave -input movie.mkv -workers 2        # Limit to 2 concurrent transcriptions
    subweave --input movie.mkv --model small    # Use a different whisper model
    subweave completions bash > subweave.bash   # Generate bash completions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file path
    #[arg(short, long, value_name = "PATH", allow_hyphen_values = true)]
    input: Option<PathBuf>,

    /// Output video path (informational only, not used)
    #[arg(short, long, value_name = "PATH", default_value = "output.mp4")]
    output: PathBuf,

    /// Number of parallel workers
    #[arg(short, long, default_value_t = 6)]
    workers: usize,

    /// Whisper model to transcribe with
    #[arg(long, default_value = "base.en")]
    model: String,

    /// Kill any external process running longer than this many seconds
    #[arg(long, value_name = "SECONDS")]
    timeout_secs: Option<u64>,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Do not draw the transcription progress bar
    #[arg(long)]
    no_progress: bool,
}

impl CommandLineOptions {
    fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        let input = self.input.ok_or(ConfigError::MissingInput)?;

        let mut config = PipelineConfig::new(input)
            .with_output(self.output)
            .with_workers(self.workers)
            .with_model(self.model)
            .with_process_timeout(self.timeout_secs.map(Duration::from_secs))
            .with_progress(!self.no_progress);
        if let Some(level) = self.log_level {
            config.log_level = level.into();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Rewrite `-input` style flags to `--input` so clap accepts the single-dash form.
///
/// Values of value-taking flags and everything after `--` are passed through
/// untouched, so `-input -output` keeps `-output` as the input path.
fn normalize_single_dash_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut normalized = Vec::new();
    let mut expecting_value = false;
    let mut passthrough = false;

    for arg in args {
        if passthrough || std::mem::take(&mut expecting_value) {
            normalized.push(arg);
            continue;
        }

        let Some(text) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };
        if text == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }

        let rewritten = match text.strip_prefix('-').filter(|r| !r.starts_with('-')) {
            Some(rest) if SINGLE_DASH_LONG_FLAGS.contains(&rest.split_once('=').map_or(rest, |(name, _)| name)) => {
                format!("-{}", text)
            }
            _ => text.to_string(),
        };

        expecting_value = !rewritten.contains('=') && VALUE_FLAGS.contains(&rewritten.as_str());
        normalized.push(OsString::from(rewritten));
    }

    normalized
}

// @struct: Custom logger implementation, filtered through log::max_level()
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => ("▶", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse_from(normalize_single_dash_flags(std::env::args_os()));

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subweave", &mut std::io::stdout());
        return Ok(());
    }

    let config = cli.into_config().inspect_err(|e| error!("Error: {}", e))?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    let summary = controller.run().await?;
    info!("Merged subtitles written to {}", summary.output.display());

    Ok(())
}
