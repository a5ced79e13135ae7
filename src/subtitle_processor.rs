use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use anyhow::{Result, Context, anyhow};
use log::{debug, trace};

// @module: SRT fragment parsing and serialization

// @const: Separator between start and end timecodes
const TIMECODE_ARROW: &str = " --> ";

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number as read from the fragment, rewritten on output
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm`) to milliseconds.
    ///
    /// Minutes and seconds must be below 60. Hours are unbounded and the
    /// millisecond component is taken as a signed integer, so the result can
    /// be negative. Values that do not fit in an `i64` are rejected.
    pub fn parse_timestamp(timestamp: &str) -> Result<i64> {
        let timestamp = timestamp.trim();
        let (clock, millis) = timestamp
            .split_once(',')
            .ok_or_else(|| anyhow!("Invalid timestamp format: {}", timestamp))?;

        if millis.contains(',') {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let parts: Vec<&str> = clock.split(':').collect();
        if parts.len() != 3 {
            return Err(anyhow!("Invalid clock component: {}", clock));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: i64 = millis.parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        i64::try_from(hours)
            .ok()
            .and_then(|h| h.checked_mul(3_600_000))
            .and_then(|ms| ms.checked_add((minutes * 60_000 + seconds * 1_000) as i64))
            .and_then(|ms| ms.checked_add(millis))
            .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp))
    }

    /// Parse a `start --> end` line into a pair of millisecond values
    pub fn parse_timecode_line(line: &str) -> Result<(i64, i64)> {
        let parts: Vec<&str> = line.trim().split(TIMECODE_ARROW).collect();
        if parts.len() != 2 {
            return Err(anyhow!("Missing or repeated timecode arrow: {}", line));
        }

        Ok((Self::parse_timestamp(parts[0])?, Self::parse_timestamp(parts[1])?))
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Add a signed offset to a parsed timestamp, clamping at zero
    pub fn shift_timestamp(ms: i64, offset_ms: i64) -> u64 {
        ms.saturating_add(offset_ms).max(0).unsigned_abs()
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Where the block parser is inside the current block
enum BlockState<'a> {
    ExpectIndex,
    ExpectTimecode { seq_num: usize },
    ExpectText { seq_num: usize, start_ms: i64, end_ms: i64, lines: Vec<&'a str> },
    /// Block is malformed; ignore lines until the next blank line
    Skip,
}

/// Parse SRT fragment content into entries, shifting every timestamp by `offset_ms`.
///
/// Malformed blocks are dropped and parsing resumes at the next blank line.
pub fn parse_srt_string(content: &str, offset_ms: i64) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();
    let mut state = BlockState::ExpectIndex;
    let mut skipped = 0usize;

    let mut finish_block = |state: BlockState, entries: &mut Vec<SubtitleEntry>| match state {
        BlockState::ExpectText { seq_num, start_ms, end_ms, lines } if !lines.is_empty() => {
            entries.push(SubtitleEntry::new(
                seq_num,
                SubtitleEntry::shift_timestamp(start_ms, offset_ms),
                SubtitleEntry::shift_timestamp(end_ms, offset_ms),
                lines.join("\n"),
            ));
        }
        BlockState::ExpectIndex => {}
        _ => skipped += 1,
    };

    for (line_no, raw_line) in content.lines().enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        if line.trim().is_empty() {
            finish_block(std::mem::replace(&mut state, BlockState::ExpectIndex), &mut entries);
            continue;
        }

        state = match state {
            BlockState::ExpectIndex => match line.trim().parse::<usize>() {
                Ok(seq_num) => BlockState::ExpectTimecode { seq_num },
                Err(_) => {
                    debug!("Skipping block at line {}: bad index {:?}", line_no + 1, line);
                    BlockState::Skip
                }
            },
            BlockState::ExpectTimecode { seq_num } => match SubtitleEntry::parse_timecode_line(line) {
                Ok((start_ms, end_ms)) => BlockState::ExpectText { seq_num, start_ms, end_ms, lines: Vec::new() },
                Err(e) => {
                    debug!("Skipping block {} at line {}: {}", seq_num, line_no + 1, e);
                    BlockState::Skip
                }
            },
            BlockState::ExpectText { seq_num, start_ms, end_ms, mut lines } => {
                lines.push(line);
                BlockState::ExpectText { seq_num, start_ms, end_ms, lines }
            }
            BlockState::Skip => BlockState::Skip,
        };
    }
    finish_block(state, &mut entries);

    if skipped > 0 {
        debug!("Skipped {} malformed subtitle block(s)", skipped);
    }
    trace!("Parsed {} subtitle entries with offset {}ms", entries.len(), offset_ms);

    entries
}

/// A merged, globally ordered subtitle track
#[derive(Debug, Default)]
pub struct SubtitleTrack {
    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleTrack {
    /// Create an empty track
    pub fn new() -> Self {
        SubtitleTrack { entries: Vec::new() }
    }

    /// Append entries in the order given
    pub fn extend(&mut self, entries: impl IntoIterator<Item = SubtitleEntry>) {
        self.entries.extend(entries);
    }

    /// Stable sort by start time, then renumber from 1
    pub fn finalize(&mut self) {
        self.entries.sort_by_key(|entry| entry.start_time_ms);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the track as SRT text
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        for entry in &self.entries {
            write!(file, "{}", entry)?;
        }

        Ok(())
    }
}
