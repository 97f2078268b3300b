// src/config.rs
//
// Run configuration for the dataset builder.
// Precedence: defaults (constants.rs) -> environment -> explicit setters / CLI flags.

use std::path::PathBuf;
use thiserror::Error;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CHECK_VALID, DEFAULT_MAP_SIZE, ENV_BATCH_SIZE, ENV_CHECK_VALID,
    ENV_MAP_SIZE,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{0}` must not be empty")]
    EmptyPath(&'static str),

    #[error("batch size must be greater than zero")]
    ZeroBatchSize,

    #[error("map size must be greater than zero")]
    ZeroMapSize,
}

/// Parameters of one dataset build.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Root directory that relative image paths are resolved against
    pub input_path: PathBuf,
    /// Text file of alternating image-path / label lines
    pub gt_file: PathBuf,
    /// Destination directory for the LMDB files (created if absent)
    pub output_path: PathBuf,
    /// Decode every image before accepting it
    pub check_valid: bool,
    /// LMDB map size reservation in bytes
    pub map_size: usize,
    /// Accepted samples per write transaction
    pub batch_size: usize,
}

impl DatasetConfig {
    pub fn new(
        input_path: impl Into<PathBuf>,
        gt_file: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            gt_file: gt_file.into(),
            output_path: output_path.into(),
            check_valid: DEFAULT_CHECK_VALID,
            map_size: DEFAULT_MAP_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_check_valid(mut self, check_valid: bool) -> Self {
        self.check_valid = check_valid;
        self
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Load overrides from the process environment
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any name -> value lookup. Unparseable values are ignored.
    pub fn apply_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(size) = lookup(ENV_MAP_SIZE).and_then(|v| parse_size(&v).ok()) {
            self.map_size = size;
        }
        if let Some(n) = lookup(ENV_BATCH_SIZE).and_then(|v| v.trim().parse::<usize>().ok()) {
            self.batch_size = n;
        }
        if let Some(flag) = lookup(ENV_CHECK_VALID) {
            self.check_valid = matches!(
                flag.trim().to_lowercase().as_str(),
                "true" | "1" | "yes" | "on" | "enable"
            );
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("input_path"));
        }
        if self.gt_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("gt_file"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("output_path"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.map_size == 0 {
            return Err(ConfigError::ZeroMapSize);
        }
        Ok(())
    }
}

/// Parse a byte count such as `1073741824`, `512M`, `1GiB` or `2g`.
/// Suffixes are binary multiples.
pub fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, suffix) = s.split_at(split);
    if digits.is_empty() {
        return Err(format!("invalid size `{s}`: expected a number"));
    }
    let value: usize = digits
        .parse()
        .map_err(|e| format!("invalid size `{s}`: {e}"))?;

    let shift = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 0,
        "k" | "kb" | "kib" => 10,
        "m" | "mb" | "mib" => 20,
        "g" | "gb" | "gib" => 30,
        "t" | "tb" | "tib" => 40,
        other => return Err(format!("invalid size `{s}`: unknown suffix `{other}`")),
    };

    value
        .checked_mul(1usize << shift)
        .ok_or_else(|| format!("invalid size `{s}`: overflow"))
}
