// src/reader.rs
//
// Read-side access to a finished dataset, mirroring how training loaders consume it:
// `num-samples` first, then `image-%09d` / `label-%09d` by 1-based index.

use std::path::Path;
use std::string::FromUtf8Error;
use thiserror::Error;

use crate::keys::{image_key, label_key, NUM_SAMPLES_KEY};
use crate::lmdb_store::LmdbStore;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("dataset has no `num-samples` record (incomplete or aborted build?)")]
    MissingNumSamples,

    #[error("`num-samples` is not a decimal count: {0:?}")]
    InvalidNumSamples(String),

    #[error("index {index} out of range: dataset holds samples 1..={num_samples}")]
    IndexOutOfRange { index: u64, num_samples: u64 },

    #[error("key `{0}` is missing")]
    MissingKey(String),

    #[error("label of sample {index} is not UTF-8: {source}")]
    InvalidLabel {
        index: u64,
        #[source]
        source: FromUtf8Error,
    },
}

/// One stored sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub index: u64,
    pub image: Vec<u8>,
    pub label: String,
}

pub struct DatasetReader {
    store: LmdbStore,
    num_samples: u64,
}

impl DatasetReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let store = LmdbStore::open(path)?;
        let raw = store
            .get(NUM_SAMPLES_KEY)?
            .ok_or(ReadError::MissingNumSamples)?;
        let text = String::from_utf8_lossy(&raw).into_owned();
        let num_samples = text
            .trim()
            .parse::<u64>()
            .map_err(|_| ReadError::InvalidNumSamples(text.clone()))?;
        Ok(Self { store, num_samples })
    }

    pub fn len(&self) -> u64 {
        self.num_samples
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    /// Fetch sample `index` (1-based).
    pub fn get(&self, index: u64) -> Result<Sample, ReadError> {
        if index == 0 || index > self.num_samples {
            return Err(ReadError::IndexOutOfRange {
                index,
                num_samples: self.num_samples,
            });
        }
        let image = self.fetch(image_key(index))?;
        let label = String::from_utf8(self.fetch(label_key(index))?)
            .map_err(|source| ReadError::InvalidLabel { index, source })?;
        Ok(Sample { index, image, label })
    }

    /// All samples in index order.
    pub fn iter(&self) -> impl Iterator<Item = Result<Sample, ReadError>> + '_ {
        (1..=self.num_samples).map(move |index| self.get(index))
    }

    fn fetch(&self, key: Vec<u8>) -> Result<Vec<u8>, ReadError> {
        self.store
            .get(&key)?
            .ok_or_else(|| ReadError::MissingKey(String::from_utf8_lossy(&key).into_owned()))
    }
}
