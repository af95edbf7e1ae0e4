//! File manifest for a batch run: which files, in which order, and the
//! episode name each one is written to.

use std::path::{Path, PathBuf};

/// Sorted source files of one season, with the episode numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileManifest {
    input_dir: PathBuf,
    files: Vec<String>,
    season: u64,
    start_episode: u64,
}

impl FileManifest {
    /// `files` must already be sorted; the manifest never reorders them.
    pub fn new(input_dir: impl Into<PathBuf>, files: Vec<String>, season: u64, start_episode: u64) -> Self {
        Self {
            input_dir: input_dir.into(),
            files,
            season,
            start_episode,
        }
    }

    pub fn episode_count(&self) -> usize {
        self.files.len()
    }

    pub fn season(&self) -> u64 {
        self.season
    }

    pub fn start_episode(&self) -> u64 {
        self.start_episode
    }

    /// Episode number of the `position`th file.
    pub fn episode(&self, position: usize) -> u64 {
        self.start_episode + position as u64
    }

    /// Zero-padded episode number of the `position`th file.
    pub fn episode_label(&self, position: usize) -> String {
        format!(
            "{:0width$}",
            self.episode(position),
            width = episode_width(self.files.len())
        )
    }

    /// `<output_dir>/S0<season>E<episode>.<container>` for the `position`th file.
    pub fn output_path(&self, output_dir: &Path, position: usize, container: &str) -> PathBuf {
        output_dir.join(format!(
            "S0{}E{}.{}",
            self.season,
            self.episode_label(position),
            container
        ))
    }

    /// Input and output paths for every file, in manifest order.
    pub fn jobs<'a>(
        &'a self,
        output_dir: &'a Path,
        container: &'a str,
    ) -> impl Iterator<Item = (PathBuf, PathBuf)> + 'a {
        self.files.iter().enumerate().map(move |(position, name)| {
            (
                self.input_dir.join(name),
                self.output_path(output_dir, position, container),
            )
        })
    }
}

/// Zero-fill width: at least 2, else the digit count of `total`.
pub fn episode_width(total: usize) -> usize {
    total.to_string().len().max(2)
}
