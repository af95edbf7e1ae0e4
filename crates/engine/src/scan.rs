//! Scanner module for listing the episode files of a batch directory.
//!
//! Only regular files directly inside the directory are considered. Names are
//! matched against the configured extensions case-sensitively and sorted in
//! byte-wise lexicographic order, which is the order episodes are numbered in.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Error type for directory scans
#[derive(Debug, Error)]
pub enum ScanError {
    /// No file in the directory carries a batch extension
    #[error("No {extensions} files found in {}", .dir.display())]
    Empty { dir: PathBuf, extensions: String },

    /// The skip count leaves nothing to encode
    #[error("Skip count {skip} is too large for {found} files")]
    SkipTooLarge { skip: usize, found: usize },

    /// The directory could not be read
    #[error("Failed to read directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Case-sensitive suffix match; the name must be longer than the suffix.
pub fn matches_extension(name: &str, extensions: &[String]) -> bool {
    extensions
        .iter()
        .any(|ext| name.len() > ext.len() && name.ends_with(ext.as_str()))
}

/// List matching file names in `dir`, sorted, with the first `skip` dropped.
pub fn list_sources(dir: &Path, extensions: &[String], skip: usize) -> Result<Vec<String>, ScanError> {
    let mut names = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "skipping file with a non UTF-8 name");
            continue;
        };
        if matches_extension(name, extensions) {
            names.push(name.to_string());
        }
    }

    if names.is_empty() {
        return Err(ScanError::Empty {
            dir: dir.to_path_buf(),
            extensions: extensions.join("/"),
        });
    }

    names.sort();

    if skip >= names.len() {
        return Err(ScanError::SkipTooLarge {
            skip,
            found: names.len(),
        });
    }
    let names = names.split_off(skip);

    debug!(count = names.len(), skipped = skip, "file listing:");
    for name in &names {
        debug!("  {}", name);
    }

    Ok(names)
}
