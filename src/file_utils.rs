use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, warn};
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    /// Find files with a specific extension directly inside a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Delete a file, logging instead of failing. Returns whether it was removed.
    pub fn remove_file_best_effort<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => {
                debug!("Deleted {}", path.display());
                true
            }
            Err(e) => {
                warn!("Error deleting file {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Delete a directory tree, logging instead of failing. A missing directory counts as removed.
    pub fn remove_dir_best_effort<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        match fs::remove_dir_all(path) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!("Error deleting directory {}: {}", path.display(), e);
                false
            }
        }
    }
}
