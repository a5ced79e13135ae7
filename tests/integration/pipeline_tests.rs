/*!
 * End-to-end pipeline tests using stand-in splitter and transcriber
 */

use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use subweave::errors::PipelineError;
use subweave::subtitle_processor::parse_srt_string;
use subweave::{Controller, PipelineConfig};
use crate::common;
use crate::common::mock_tools::{MockSplitter, MockTranscriber};

fn config_in(root: &std::path::Path) -> PipelineConfig {
    PipelineConfig::new(root.join("movie.mkv"))
        .with_work_root(root)
        .with_workers(2)
        .with_progress(false)
}

/// Test a full run merges every segment and removes working directories
#[tokio::test]
async fn test_run_withThreeSegments_shouldMergeAndCleanUp() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let config = config_in(temp_dir.path());

    let transcriber = MockTranscriber::new()
        .with_fragment(1, common::srt(&[(1, "00:00:01,000", "00:00:02,000", "hello")]))
        .with_fragment(2, common::srt(&[
            (1, "00:00:03,000", "00:00:04,000", "from"),
            (2, "00:00:29,000", "00:00:30,000", "the middle"),
        ]))
        .with_fragment(3, common::srt(&[(1, "00:00:00,250", "00:00:01,000", "end")]))
        .with_delay(Duration::from_millis(5));

    let controller = Controller::with_tools(
        config.clone(),
        Arc::new(MockSplitter::producing(3)),
        Arc::new(transcriber),
    )?;
    let summary = controller.run().await?;

    assert_eq!(summary.entries_written, 4);
    assert_eq!(summary.output, config.merged_output);
    assert!(!config.audio_dir.exists());
    assert!(!config.subtitle_dir.exists());

    let merged = std::fs::read_to_string(&config.merged_output)?;
    let entries = parse_srt_string(&merged, 0);
    let rendered: Vec<(usize, String, String)> = entries
        .iter()
        .map(|e| (e.seq_num, e.format_start_time(), e.text.clone()))
        .collect();
    assert_eq!(
        rendered,
        vec![
            (1, "00:00:01,000".to_string(), "hello".to_string()),
            (2, "00:00:33,000".to_string(), "from".to_string()),
            (3, "00:00:59,000".to_string(), "the middle".to_string()),
            (4, "00:01:00,250".to_string(), "end".to_string()),
        ]
    );

    Ok(())
}

/// Test a failing segment aborts before merging
#[tokio::test]
async fn test_run_withFailingSegment_shouldNotMerge() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = config_in(temp_dir.path());

    let transcriber = Arc::new(MockTranscriber::new().failing_on(2));
    let controller = Controller::with_tools(
        config.clone(),
        Arc::new(MockSplitter::producing(4)),
        transcriber.clone(),
    )?;

    let result = controller.run().await;

    match result {
        Err(PipelineError::TaskFailures(failures)) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].ordinal, 2);
        }
        other => panic!("expected task failures, got {:?}", other),
    }
    assert_eq!(transcriber.calls(), 4);
    assert!(!config.merged_output.exists());

    Ok(())
}

/// Test a splitter failure stops the run before any transcription
#[tokio::test]
async fn test_run_withFailingSplitter_shouldAbort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = config_in(temp_dir.path());

    let transcriber = Arc::new(MockTranscriber::new());
    let controller = Controller::with_tools(config.clone(), Arc::new(MockSplitter::failing()), transcriber.clone())?;

    let result = controller.run().await;

    assert!(matches!(result, Err(PipelineError::Process(_))));
    assert_eq!(transcriber.calls(), 0);
    assert!(!config.merged_output.exists());

    Ok(())
}

/// Test a splitter that produces nothing still yields an empty subtitle file
#[tokio::test]
async fn test_run_withNoSegments_shouldWriteEmptyOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = config_in(temp_dir.path());

    let controller = Controller::with_tools(
        config.clone(),
        Arc::new(MockSplitter::producing(0)),
        Arc::new(MockTranscriber::new()),
    )?;
    let summary = controller.run().await?;

    assert_eq!(summary.entries_written, 0);
    assert_eq!(std::fs::metadata(&config.merged_output)?.len(), 0);

    Ok(())
}

/// Test invalid configuration is rejected when building the controller
#[test]
fn test_controller_withZeroWorkers_shouldRejectConfig() {
    let config = PipelineConfig::new("movie.mkv").with_workers(0);
    assert!(Controller::with_config(config).is_err());
}
