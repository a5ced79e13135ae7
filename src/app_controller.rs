use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, error, info};

use crate::app_config::PipelineConfig;
use crate::errors::PipelineError;
use crate::external::{AudioSplitter, FfmpegSplitter, Transcriber, WhisperTranscriber};
use crate::file_utils::FileManager;
use crate::merge::{merge_fragments, MergeSummary};
use crate::segments::enumerate_segments;
use crate::worker_pool::WorkerPool;

// @module: Application controller driving the subtitle pipeline

/// Main application controller: split, transcribe in parallel, merge, clean up
pub struct Controller {
    // @field: Run configuration
    config: PipelineConfig,
    // @field: Audio splitter
    splitter: Arc<dyn AudioSplitter>,
    // @field: Transcriber shared by all worker tasks
    transcriber: Arc<dyn Transcriber>,
}

impl Controller {
    // @method: Create a controller using ffmpeg and whisper
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;

        let splitter = Arc::new(FfmpegSplitter::from_config(&config));
        let transcriber = Arc::new(WhisperTranscriber::from_config(&config));
        Ok(Self { config, splitter, transcriber })
    }

    // @method: Create a controller with custom external tools
    pub fn with_tools(
        config: PipelineConfig,
        splitter: Arc<dyn AudioSplitter>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config, splitter, transcriber })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline once
    pub async fn run(&self) -> Result<MergeSummary, PipelineError> {
        let start_time = Instant::now();
        let config = &self.config;

        info!("Subtitles will be saved to: {}", config.merged_output.display());
        debug!("Declared output {} is informational only", config.output.display());

        // 1. Working directories
        for dir in [&config.audio_dir, &config.subtitle_dir] {
            std::fs::create_dir_all(dir).map_err(|e| {
                error!("Error creating {} directory: {}", dir.display(), e);
                PipelineError::filesystem(dir.as_path(), e)
            })?;
        }

        // 2. Split the audio track
        info!("Splitting audio of {}", config.input.display());
        self.splitter.split(&config.input, &config.audio_dir).await.map_err(|e| {
            error!("Audio split failed: {}", e);
            PipelineError::from(e)
        })?;

        // 3. Transcribe segments in parallel
        let segments = enumerate_segments(&config.audio_dir, &config.subtitle_dir).map_err(|e| {
            error!("Error reading segments: {}", e);
            e
        })?;
        info!("Found {} audio segment(s)", segments.len());

        let pool = WorkerPool::new(config.workers).with_progress(config.show_progress);
        let report = pool.run(segments, Arc::clone(&self.transcriber)).await;
        report.into_result()?;

        // 4. Merge fragments
        let summary = merge_fragments(&config.subtitle_dir, &config.merged_output).map_err(|e| {
            error!("Merge failed: {}", e);
            e
        })?;

        // 5. Clean up
        FileManager::remove_dir_best_effort(&config.audio_dir);
        FileManager::remove_dir_best_effort(&config.subtitle_dir);

        info!(
            "Done in {:.1}s: {} entries from {} fragment(s) written to {}",
            start_time.elapsed().as_secs_f64(),
            summary.entries_written,
            summary.fragments_merged,
            summary.output.display()
        );
        Ok(summary)
    }
}
