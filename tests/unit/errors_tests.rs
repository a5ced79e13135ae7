/*!
 * Tests for error types and conversions
 */

use std::path::Path;
use std::time::Duration;
use subweave::errors::{ConfigError, PipelineError, ProcessError, TaskFailure};

#[test]
fn test_configError_missingInput_shouldMentionFlag() {
    let display = format!("{}", ConfigError::MissingInput);
    assert!(display.contains("-input"));
}

#[test]
fn test_processError_nonZeroExit_shouldDisplayProgramAndStderr() {
    let error = ProcessError::NonZeroExit {
        program: "whisper".to_string(),
        status: "exit status: 2".to_string(),
        stderr: "model not found".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("whisper"));
    assert!(display.contains("exit status: 2"));
    assert!(display.contains("model not found"));
}

#[test]
fn test_processError_timedOut_shouldDisplayLimit() {
    let error = ProcessError::TimedOut {
        program: "ffmpeg".to_string(),
        timeout: Duration::from_secs(5),
    };
    assert_eq!(format!("{}", error), "ffmpeg timed out after 5s");
}

#[test]
fn test_taskFailure_shouldDisplayOrdinalAndInput() {
    let failure = TaskFailure::new(3, Path::new("audio_parts/part003.wav"), "boom");
    assert_eq!(format!("{}", failure), "segment 3 (audio_parts/part003.wav): boom");
}

#[test]
fn test_pipelineError_taskFailures_shouldCountFailures() {
    let error = PipelineError::TaskFailures(vec![
        TaskFailure::new(1, Path::new("a.wav"), "x"),
        TaskFailure::new(2, Path::new("b.wav"), "y"),
    ]);
    assert_eq!(format!("{}", error), "2 segment task(s) failed");
}

#[test]
fn test_pipelineError_fromConfigError_shouldWrap() {
    let error: PipelineError = ConfigError::InvalidWorkerCount(0).into();
    assert!(matches!(error, PipelineError::Config(ConfigError::InvalidWorkerCount(0))));
    assert!(format!("{}", error).contains("Configuration error"));
}
