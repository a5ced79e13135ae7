/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use subweave::file_utils::FileManager;
use crate::common;

/// Test that find_files matches the extension case-insensitively and does not recurse
#[test]
fn test_find_files_withMixedEntries_shouldReturnDirectMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();

    common::create_test_file(dir, "a.srt", "")?;
    common::create_test_file(dir, "b.SRT", "")?;
    common::create_test_file(dir, "c.txt", "")?;
    common::create_test_file(&dir.join("nested"), "d.srt", "")?;

    let mut found = FileManager::find_files(dir, ".srt")?;
    found.sort();

    assert_eq!(found, vec![dir.join("a.srt"), dir.join("b.SRT")]);

    Ok(())
}

/// Test best-effort file removal reports both outcomes without failing
#[test]
fn test_remove_file_best_effort_withExistingAndMissing_shouldNotFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "part001.wav", "RIFF")?;

    assert!(FileManager::remove_file_best_effort(&file));
    assert!(!file.exists());
    assert!(!FileManager::remove_file_best_effort(&file));

    Ok(())
}

/// Test best-effort directory removal treats a missing directory as removed
#[test]
fn test_remove_dir_best_effort_withTree_shouldRemoveEverything() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().join("audio_parts");
    common::create_test_file(&dir, "part001.wav", "RIFF")?;

    assert!(FileManager::remove_dir_best_effort(&dir));
    assert!(!dir.exists());
    assert!(FileManager::remove_dir_best_effort(&dir));

    Ok(())
}
