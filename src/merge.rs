/*!
 * Time-shift and merge of per-segment subtitle fragments.
 *
 * Fragment `partNNN.srt` holds timestamps relative to the start of segment
 * `NNN`. Merging shifts each fragment by `(NNN - 1) * SEGMENT_SECONDS`,
 * collects every entry into one track, orders it by start time and writes it
 * out with fresh sequence numbers. Fragment files are deleted afterwards.
 */

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::app_config::FRAGMENT_EXTENSION;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::segments::{parse_fragment_ordinal, segment_offset_ms};
use crate::subtitle_processor::{parse_srt_string, SubtitleTrack};

/// What a merge run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    /// Fragments that contributed entries (possibly zero entries each)
    pub fragments_merged: usize,
    /// Fragments ignored because their name carried no usable ordinal
    pub fragments_skipped: usize,
    /// Entries written to the output
    pub entries_written: usize,
    /// Where the merged track went
    pub output: PathBuf,
}

/// Fragments read from a subtitle directory, merged into one ordered track
#[derive(Debug, Default)]
pub struct CollectedFragments {
    /// Shifted, sorted and renumbered entries of every usable fragment
    pub track: SubtitleTrack,
    /// Every `.srt` file found, usable or not
    pub files: Vec<PathBuf>,
    /// Files ignored because their name carried no usable ordinal
    pub skipped: usize,
}

/// Build the merged track from every fragment in `subtitle_dir`
pub fn collect_fragments(subtitle_dir: &Path) -> Result<CollectedFragments, PipelineError> {
    let fragment_files = if subtitle_dir.is_dir() {
        FileManager::find_files(subtitle_dir, FRAGMENT_EXTENSION).map_err(|e| {
            PipelineError::filesystem(subtitle_dir, std::io::Error::other(e.to_string()))
        })?
    } else {
        debug!("No fragment directory at {}", subtitle_dir.display());
        Vec::new()
    };

    let mut numbered = Vec::with_capacity(fragment_files.len());
    let mut skipped = 0usize;
    for path in &fragment_files {
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match parse_fragment_ordinal(&file_name) {
            Some(ordinal) => numbered.push((ordinal, path.clone())),
            None => {
                warn!("Skipping invalid or zero index in filename: {}", file_name);
                skipped += 1;
            }
        }
    }

    // Visit fragments in segment order so equal start times keep a fixed order
    numbered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut track = SubtitleTrack::new();
    for (ordinal, path) in &numbered {
        let bytes = std::fs::read(path).map_err(|e| PipelineError::filesystem(path.clone(), e))?;
        let content = String::from_utf8_lossy(&bytes);
        if matches!(content, Cow::Owned(_)) {
            warn!("Fragment {} is not valid UTF-8, replacing invalid bytes", path.display());
        }
        let entries = parse_srt_string(&content, segment_offset_ms(*ordinal));
        debug!("Fragment {} contributed {} entries", path.display(), entries.len());
        track.extend(entries);
    }
    track.finalize();

    Ok(CollectedFragments {
        track,
        files: fragment_files,
        skipped,
    })
}

/// Merge all fragments in `subtitle_dir` into `output`, then delete the fragments.
///
/// No fragments at all still produces an (empty) output file.
pub fn merge_fragments(subtitle_dir: &Path, output: &Path) -> Result<MergeSummary, PipelineError> {
    let CollectedFragments { track, files: fragment_files, skipped } = collect_fragments(subtitle_dir)?;

    track.write_to_srt(output).map_err(|e| {
        PipelineError::filesystem(output, std::io::Error::other(format!("{:#}", e)))
    })?;
    info!("Wrote {} subtitle entries to {}", track.len(), output.display());

    for path in &fragment_files {
        FileManager::remove_file_best_effort(path);
    }

    Ok(MergeSummary {
        fragments_merged: fragment_files.len() - skipped,
        fragments_skipped: skipped,
        entries_written: track.len(),
        output: output.to_path_buf(),
    })
}
