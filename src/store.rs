// src/store.rs
//
// Transactional key/value store seam used by the dataset builder.
// LmdbStore (lmdb_store.rs) is the on-disk implementation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store capacity exceeded: the {map_size}-byte map is full, rerun with a larger map size")]
    CapacityExceeded { map_size: usize },

    #[error("store I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no database found at {}", .path.display())]
    MissingDatabase { path: PathBuf },

    #[error(transparent)]
    Lmdb(#[from] heed::Error),
}

/// Ordered key/value writes committed together.
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    payload_bytes: usize,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        let (key, value) = (key.into(), value.into());
        self.payload_bytes += key.len() + value.len();
        self.entries.push((key, value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of key and value lengths
    pub fn payload_bytes(&self) -> usize {
        self.payload_bytes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.payload_bytes = 0;
    }
}

/// A store that applies a [`WriteBatch`] atomically.
///
/// Either every entry of a committed batch is visible afterwards or none is.
/// Batches committed before a later failure stay committed.
pub trait DatasetStore {
    fn commit(&mut self, batch: &WriteBatch) -> Result<(), StoreError>;

    /// Flush committed data to durable storage.
    fn sync(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<S: DatasetStore + ?Sized> DatasetStore for &mut S {
    fn commit(&mut self, batch: &WriteBatch) -> Result<(), StoreError> {
        (**self).commit(batch)
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        (**self).sync()
    }
}
