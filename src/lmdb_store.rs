// src/lmdb_store.rs
//
// LMDB-backed DatasetStore. Keys and values go into the unnamed main database
// as raw bytes so any LMDB binding can read the dataset back.

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, MdbError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::store::{DatasetStore, StoreError, WriteBatch};

/// An open LMDB environment plus its main database.
///
/// Dropping the store forces a sync so every committed batch is on disk,
/// including when a build aborts part way through, then closes the environment
/// so the same path can be opened again in this process.
pub struct LmdbStore {
    env: Env,
    db: Database<Bytes, Bytes>,
    path: PathBuf,
    map_size: usize,
}

impl LmdbStore {
    /// Create (or reopen for writing) the environment at `path` with a fixed map size.
    /// The directory is created if it does not exist.
    pub fn create(path: impl AsRef<Path>, map_size: usize) -> Result<Self, StoreError> {
        let path = path.as_ref();
        fs::create_dir_all(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: the environment is opened once per process for this path and the
        // memory map is never handed out beyond the transactions below.
        let env = unsafe { EnvOpenOptions::new().map_size(map_size).open(path) }
            .map_err(|e| classify(e, path, map_size))?;

        let mut wtxn = env.write_txn().map_err(|e| classify(e, path, map_size))?;
        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| classify(e, path, map_size))?;
        wtxn.commit().map_err(|e| classify(e, path, map_size))?;

        debug!("opened LMDB environment at {} (map size {} bytes)", path.display(), map_size);
        Ok(Self {
            env,
            db,
            path: path.to_path_buf(),
            map_size,
        })
    }

    /// Open an existing environment, keeping the map size it was created with.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(StoreError::MissingDatabase {
                path: path.to_path_buf(),
            });
        }

        // SAFETY: see `create`.
        let env = unsafe { EnvOpenOptions::new().open(path) }?;
        let rtxn = env.read_txn()?;
        let db = env
            .open_database::<Bytes, Bytes>(&rtxn, None)?
            .ok_or_else(|| StoreError::MissingDatabase {
                path: path.to_path_buf(),
            })?;
        drop(rtxn);

        let map_size = env.info().map_size;
        Ok(Self {
            env,
            db,
            path: path.to_path_buf(),
            map_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn map_size(&self) -> usize {
        self.map_size
    }

    /// Read one value in its own read transaction.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn()?;
        let value = self.db.get(&rtxn, key)?.map(<[u8]>::to_vec);
        Ok(value)
    }

    /// Number of entries in the main database.
    pub fn entry_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.db.len(&rtxn)?)
    }
}

impl DatasetStore for LmdbStore {
    fn commit(&mut self, batch: &WriteBatch) -> Result<(), StoreError> {
        let (path, map_size) = (self.path.as_path(), self.map_size);
        let mut wtxn = self.env.write_txn().map_err(|e| classify(e, path, map_size))?;
        for (key, value) in batch.iter() {
            // an error drops `wtxn`, which aborts the whole batch
            self.db
                .put(&mut wtxn, key, value)
                .map_err(|e| classify(e, path, map_size))?;
        }
        wtxn.commit().map_err(|e| classify(e, path, map_size))?;
        debug!(
            "committed {} entries ({} bytes) to {}",
            batch.len(),
            batch.payload_bytes(),
            self.path.display()
        );
        Ok(())
    }

    fn sync(&mut self) -> Result<(), StoreError> {
        self.env
            .force_sync()
            .map_err(|e| classify(e, &self.path, self.map_size))
    }
}

impl Drop for LmdbStore {
    fn drop(&mut self) {
        if let Err(e) = self.env.force_sync() {
            warn!("failed to sync LMDB environment at {}: {e}", self.path.display());
        }
        // heed keeps opened environments in a process-wide registry. Taking ours out
        // lets the last handle (`self.env`, dropped right after this) close it.
        let _closing = self.env.clone().prepare_for_closing();
    }
}

fn classify(err: heed::Error, path: &Path, map_size: usize) -> StoreError {
    match err {
        heed::Error::Mdb(MdbError::MapFull) => StoreError::CapacityExceeded { map_size },
        heed::Error::Io(source) => StoreError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => StoreError::Lmdb(other),
    }
}
