/*!
 * Tests for segment discovery
 */

use anyhow::Result;
use subweave::errors::PipelineError;
use subweave::segments::{enumerate_segments, segment_offset_ms, Segment};
use subweave::SEGMENT_SECONDS;
use crate::common;

/// Test that valid segment files are discovered with their ordinals
#[test]
fn test_enumerate_segments_withMixedFiles_shouldKeepOnlyValidSegments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_dir = temp_dir.path().join("audio_parts");
    let subtitle_dir = temp_dir.path().join("subtitles");

    for name in ["part003.wav", "part001.wav", "part002.wav", "part000.wav", "notes.txt", "partx.wav", "part004.mp3"] {
        common::create_test_file(&audio_dir, name, "")?;
    }
    std::fs::create_dir_all(audio_dir.join("part005.wav"))?;

    let segments = enumerate_segments(&audio_dir, &subtitle_dir)?;

    let ordinals: Vec<u32> = segments.iter().map(|s| s.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3]);
    assert_eq!(segments[1].input, audio_dir.join("part002.wav"));
    assert_eq!(segments[1].output, subtitle_dir.join("part002.srt"));

    Ok(())
}

/// Test that a missing directory is fatal
#[test]
fn test_enumerate_segments_withMissingDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("does_not_exist");

    let result = enumerate_segments(&missing, temp_dir.path());
    assert!(matches!(result, Err(PipelineError::Filesystem { .. })));

    Ok(())
}

/// Test an empty directory yields no segments without error
#[test]
fn test_enumerate_segments_withEmptyDirectory_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let segments = enumerate_segments(temp_dir.path(), temp_dir.path())?;
    assert!(segments.is_empty());
    Ok(())
}

/// Test the offset of ordinal k is (k - 1) segment lengths
#[test]
fn test_segment_offset_withAnyOrdinal_shouldBeWholeSegmentLengths() {
    assert_eq!(segment_offset_ms(1), 0);
    assert_eq!(segment_offset_ms(2), 30_000);
    assert_eq!(segment_offset_ms(121), 120 * SEGMENT_SECONDS as i64 * 1_000);

    let segment = Segment {
        ordinal: 4,
        input: "audio_parts/part004.wav".into(),
        output: "subtitles/part004.srt".into(),
    };
    assert_eq!(segment.offset_ms(), 90_000);
}
