// src/builder.rs
//
// The ingestion loop: read ground truth, load and optionally validate each image,
// stage accepted samples, and commit them to the store in fixed-size batches.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, DatasetConfig};
use crate::error_log::ErrorImageLog;
use crate::ground_truth::{GroundTruth, GroundTruthEntry, GroundTruthError};
use crate::keys::{image_key, label_key, num_samples_value, NUM_SAMPLES_KEY};
use crate::lmdb_store::LmdbStore;
use crate::store::{DatasetStore, StoreError, WriteBatch};
use crate::validation::{check_image_is_valid, ImageCheckError};

/// Errors that abort a build.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    GroundTruth(#[from] GroundTruthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read image {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append to {}: {source}", .path.display())]
    ErrorLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single ground-truth entry was skipped. Never aborts a build.
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("{} does not exist", .path.display())]
    MissingInputFile { path: PathBuf },

    #[error("{} is not a valid image", .path.display())]
    InvalidImage { path: PathBuf },

    #[error("Error occurred with {index}th image: {source}")]
    ImageProcessing {
        index: usize,
        path: PathBuf,
        #[source]
        source: ImageCheckError,
    },
}

/// Tallies for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Samples written, equal to the value stored under `num-samples`
    pub num_samples: u64,
    /// `lines / 2` of the ground-truth file, before any skips
    pub estimated_samples: usize,
    pub missing_files: usize,
    pub invalid_images: usize,
    pub errored_images: usize,
    /// Write transactions committed, including the final one
    pub commits: usize,
    pub elapsed: Duration,
}

impl BuildSummary {
    pub fn skipped(&self) -> usize {
        self.missing_files + self.invalid_images + self.errored_images
    }
}

enum Outcome {
    Accepted(u64),
    Skipped(EntryError),
}

/// Signature of the per-image validity check, see [`check_image_is_valid`].
pub type ImageCheck = fn(&[u8]) -> Result<bool, ImageCheckError>;

/// Drives one build against any [`DatasetStore`].
pub struct DatasetBuilder<S> {
    config: DatasetConfig,
    store: S,
    image_check: ImageCheck,
    error_log: ErrorImageLog,
    pending: WriteBatch,
    next_index: u64,
    summary: BuildSummary,
}

impl<S: DatasetStore> DatasetBuilder<S> {
    /// Validate `config` and make sure the output directory exists.
    pub fn new(config: DatasetConfig, store: S) -> Result<Self, DatasetError> {
        config.validate()?;
        fs::create_dir_all(&config.output_path).map_err(|source| DatasetError::OutputDir {
            path: config.output_path.clone(),
            source,
        })?;
        Ok(Self::assemble(config, store))
    }

    /// Caller has already validated `config` and created the output directory.
    fn assemble(config: DatasetConfig, store: S) -> Self {
        let error_log = ErrorImageLog::in_dir(&config.output_path);
        Self {
            config,
            store,
            image_check: check_image_is_valid,
            error_log,
            pending: WriteBatch::new(),
            next_index: 1,
            summary: BuildSummary::default(),
        }
    }

    /// Replace the validity check applied when `check_valid` is set.
    pub fn with_image_check(mut self, check: ImageCheck) -> Self {
        self.image_check = check;
        self
    }

    /// Run every entry of `ground_truth` through the loop and finalize the store.
    pub fn build(mut self, ground_truth: &GroundTruth) -> Result<BuildSummary, DatasetError> {
        let started = Instant::now();
        self.summary.estimated_samples = ground_truth.estimated_samples();
        debug!(
            "building dataset from {} entries (check_valid={}, batch_size={})",
            self.summary.estimated_samples, self.config.check_valid, self.config.batch_size
        );

        for entry in ground_truth.entries() {
            match self.ingest(&entry)? {
                Outcome::Accepted(index) => {
                    debug!("accepted entry {} as sample {}", entry.index, index);
                }
                Outcome::Skipped(reason) => self.skip(reason)?,
            }
        }

        self.finish(started)
    }

    fn ingest(&mut self, entry: &GroundTruthEntry) -> Result<Outcome, DatasetError> {
        let image_path = self.config.input_path.join(&entry.image_path);
        if !image_path.exists() {
            return Ok(Outcome::Skipped(EntryError::MissingInputFile { path: image_path }));
        }

        let image = fs::read(&image_path).map_err(|source| DatasetError::ImageRead {
            path: image_path.clone(),
            source,
        })?;

        if self.config.check_valid {
            match (self.image_check)(&image) {
                Ok(true) => {}
                Ok(false) => {
                    return Ok(Outcome::Skipped(EntryError::InvalidImage { path: image_path }));
                }
                Err(source) => {
                    return Ok(Outcome::Skipped(EntryError::ImageProcessing {
                        index: entry.index,
                        path: image_path,
                        source,
                    }));
                }
            }
        }

        let index = self.accept(image, &entry.label)?;
        Ok(Outcome::Accepted(index))
    }

    fn skip(&mut self, reason: EntryError) -> Result<(), DatasetError> {
        warn!("{reason}");
        match reason {
            EntryError::MissingInputFile { .. } => self.summary.missing_files += 1,
            EntryError::InvalidImage { .. } => self.summary.invalid_images += 1,
            EntryError::ImageProcessing { index, .. } => {
                self.summary.errored_images += 1;
                self.error_log
                    .record(index)
                    .map_err(|source| DatasetError::ErrorLog {
                        path: self.error_log.path().to_path_buf(),
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Allocate the next index and stage the sample; commit on batch boundaries.
    fn accept(&mut self, image: Vec<u8>, label: &str) -> Result<u64, DatasetError> {
        let index = self.next_index;
        self.pending.put(image_key(index), image);
        self.pending.put(label_key(index), label.as_bytes());

        if index % self.config.batch_size as u64 == 0 {
            self.flush()?;
            info!("Written {} / {}", index, self.summary.estimated_samples);
        }

        self.next_index += 1;
        Ok(index)
    }

    fn flush(&mut self) -> Result<(), DatasetError> {
        self.store.commit(&self.pending)?;
        self.summary.commits += 1;
        self.pending.clear();
        Ok(())
    }

    fn finish(mut self, started: Instant) -> Result<BuildSummary, DatasetError> {
        let num_samples = self.next_index - 1;
        self.pending.put(NUM_SAMPLES_KEY, num_samples_value(num_samples));
        self.flush()?;
        self.store.sync()?;

        self.summary.num_samples = num_samples;
        self.summary.elapsed = started.elapsed();
        if self.summary.skipped() > 0 {
            info!(
                "skipped {} entries ({} missing, {} invalid, {} errored)",
                self.summary.skipped(),
                self.summary.missing_files,
                self.summary.invalid_images,
                self.summary.errored_images
            );
        }
        info!("Created dataset with {} samples", num_samples);
        Ok(self.summary)
    }
}

/// Build an LMDB dataset at `config.output_path`.
///
/// The store is opened before the ground-truth file is read. It is synced and
/// closed on every exit path, so batches committed before a fatal error persist.
pub fn create_dataset(config: &DatasetConfig) -> Result<BuildSummary, DatasetError> {
    config.validate()?;
    // creates the output directory
    let store = LmdbStore::create(&config.output_path, config.map_size)?;
    let ground_truth = GroundTruth::from_path(&config.gt_file)?;
    DatasetBuilder::assemble(config.clone(), store).build(&ground_truth)
}
