// src/ground_truth.rs
//
// Ground-truth file parsing: alternating image-path / label lines.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::FILENAME_TAG;

#[derive(Error, Debug)]
pub enum GroundTruthError {
    #[error("cannot read ground-truth file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One (image path, label) pair in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruthEntry {
    /// Zero-based pair index (line `2 * index` in the file)
    pub index: usize,
    /// Image path relative to the input root, tag and whitespace removed
    pub image_path: String,
    /// Transcription label, whitespace trimmed
    pub label: String,
}

impl GroundTruthEntry {
    fn from_lines(index: usize, path_line: &str, label_line: &str) -> Self {
        Self {
            index,
            image_path: path_line.trim().replace(FILENAME_TAG, ""),
            label: label_line.trim().to_string(),
        }
    }
}

/// The whole ground-truth file held in memory as lines.
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    lines: Vec<String>,
}

impl GroundTruth {
    /// Read the file fully. Missing files and non-UTF-8 content are errors.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GroundTruthError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GroundTruthError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(&text))
    }

    /// Split on `\n`, `\r\n` and a lone `\r`.
    pub fn from_text(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut rest = text;
        while let Some(end) = rest.find(['\n', '\r']) {
            lines.push(rest[..end].to_owned());
            let skip = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
            rest = &rest[end + skip..];
        }
        if !rest.is_empty() {
            lines.push(rest.to_owned());
        }
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Pre-validation sample estimate: `lines / 2`
    pub fn estimated_samples(&self) -> usize {
        self.lines.len() / 2
    }

    /// Entries two lines at a time; a trailing unpaired line is dropped.
    pub fn entries(&self) -> impl Iterator<Item = GroundTruthEntry> + '_ {
        self.lines
            .chunks_exact(2)
            .enumerate()
            .map(|(index, pair)| GroundTruthEntry::from_lines(index, &pair[0], &pair[1]))
    }
}
