/*!
 * Discovery of generated audio segments.
 *
 * The splitter writes `part001.wav`, `part002.wav`, ... into the audio
 * directory. Each file becomes a [`Segment`] whose ordinal is the numeric
 * suffix and whose position in the final track is `(ordinal - 1)` segment
 * lengths from the start.
 */

use std::path::{Path, PathBuf};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use crate::app_config::{FRAGMENT_EXTENSION, SEGMENT_EXTENSION, SEGMENT_PREFIX, SEGMENT_SECONDS};
use crate::errors::PipelineError;

static SEGMENT_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{}(\d+)\.{}$", SEGMENT_PREFIX, SEGMENT_EXTENSION))
        .expect("segment name pattern is valid")
});

static FRAGMENT_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{}(\d+)\.{}$", SEGMENT_PREFIX, FRAGMENT_EXTENSION))
        .expect("fragment name pattern is valid")
});

/// One slice of the source audio and where its transcription goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position of the segment in the source
    pub ordinal: u32,
    /// Audio file produced by the splitter
    pub input: PathBuf,
    /// Subtitle fragment the transcriber writes
    pub output: PathBuf,
}

impl Segment {
    /// Offset of this segment from the start of the track, in milliseconds
    pub fn offset_ms(&self) -> i64 {
        segment_offset_ms(self.ordinal)
    }
}

/// `(ordinal - 1) * SEGMENT_SECONDS`, in milliseconds
pub fn segment_offset_ms(ordinal: u32) -> i64 {
    (i64::from(ordinal) - 1) * (SEGMENT_SECONDS as i64) * 1_000
}

/// Ordinal from a segment audio filename such as `part007.wav`
pub fn parse_segment_ordinal(file_name: &str) -> Option<u32> {
    parse_ordinal(&SEGMENT_NAME_REGEX, file_name)
}

/// Ordinal from a subtitle fragment filename such as `part007.srt`
pub fn parse_fragment_ordinal(file_name: &str) -> Option<u32> {
    parse_ordinal(&FRAGMENT_NAME_REGEX, file_name)
}

fn parse_ordinal(pattern: &Regex, file_name: &str) -> Option<u32> {
    let caps = pattern.captures(file_name)?;
    caps.get(1)?.as_str().parse::<u32>().ok().filter(|ordinal| *ordinal >= 1)
}

/// Fragment filename for a segment ordinal, zero-padded like the splitter output
pub fn fragment_file_name(ordinal: u32) -> String {
    format!("{}{:03}.{}", SEGMENT_PREFIX, ordinal, FRAGMENT_EXTENSION)
}

/// List the segments found directly inside `audio_dir`.
///
/// Files that do not match the naming pattern are skipped. A missing or
/// unreadable directory is an error.
pub fn enumerate_segments(audio_dir: &Path, subtitle_dir: &Path) -> Result<Vec<Segment>, PipelineError> {
    if !audio_dir.is_dir() {
        return Err(PipelineError::filesystem(
            audio_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "segment directory not found"),
        ));
    }

    let mut segments = Vec::new();
    for entry in WalkDir::new(audio_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(audio_dir).to_path_buf();
            PipelineError::filesystem(path, e.into())
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        match parse_segment_ordinal(&file_name) {
            Some(ordinal) => segments.push(Segment {
                ordinal,
                input: entry.path().to_path_buf(),
                output: subtitle_dir.join(fragment_file_name(ordinal)),
            }),
            None if file_name.ends_with(&format!(".{}", SEGMENT_EXTENSION)) => {
                warn!("Skipping audio file with unusable name: {}", file_name);
            }
            None => debug!("Ignoring non-segment file: {}", file_name),
        }
    }

    segments.sort_by_key(|segment| segment.ordinal);
    debug!("Found {} segment(s) in {}", segments.len(), audio_dir.display());

    Ok(segments)
}
