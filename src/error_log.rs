// src/error_log.rs
//
// Append-only record of images that could not be decoded during a build.
// One line per failure: `<zero-based-pair-index>-th image data occurred error`.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::constants::ERROR_LOG_FILE_NAME;

#[derive(Debug, Clone)]
pub struct ErrorImageLog {
    path: PathBuf,
}

impl ErrorImageLog {
    /// Log living at `<output_dir>/error_image_log.txt`. Nothing is created until
    /// the first failure is recorded.
    pub fn in_dir(output_dir: impl AsRef<Path>) -> Self {
        Self {
            path: output_dir.as_ref().join(ERROR_LOG_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, pair_index: usize) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{pair_index}-th image data occurred error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn appends_one_line_per_failure() {
        let dir = TempDir::new().unwrap();
        let log = ErrorImageLog::in_dir(dir.path());
        assert!(!log.path().exists());

        log.record(1).unwrap();
        log.record(7).unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        assert_eq!(text, "1-th image data occurred error\n7-th image data occurred error\n");
    }

    #[test]
    fn keeps_lines_from_earlier_runs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(ERROR_LOG_FILE_NAME), "0-th image data occurred error\n").unwrap();

        ErrorImageLog::in_dir(dir.path()).record(3).unwrap();

        let text = fs::read_to_string(dir.path().join(ERROR_LOG_FILE_NAME)).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("3-th image data occurred error\n"));
    }
}
