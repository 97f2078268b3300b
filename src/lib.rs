// src/lib.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// Crate root: public re-exports for building and reading LMDB image/label datasets.

pub mod constants;
pub mod config;
pub mod keys;
pub mod ground_truth;
pub mod validation;
pub mod store;
pub mod lmdb_store;
pub mod error_log;
pub mod builder;
pub mod reader;

// ===== Re-exports expected by src/bin/cli.rs and tests at the crate root =====
pub use builder::{
    create_dataset, BuildSummary, DatasetBuilder, DatasetError, EntryError,
    ImageCheck,
};
pub use config::{parse_size, ConfigError, DatasetConfig};
pub use ground_truth::{GroundTruth, GroundTruthEntry, GroundTruthError};
pub use lmdb_store::LmdbStore;
pub use reader::{DatasetReader, ReadError, Sample};
pub use store::{DatasetStore, StoreError, WriteBatch};
pub use validation::{check_image_is_valid, ImageCheckError};
