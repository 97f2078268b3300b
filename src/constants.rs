// src/constants.rs
//
// Centralized constants for lmdb-dataset to avoid hardcoded values throughout the codebase

/// Default LMDB map size reservation (1 GiB)
pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;

/// Number of accepted samples staged before a write transaction is committed
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Validate every image by decoding it before it is stored
pub const DEFAULT_CHECK_VALID: bool = true;

/// Width of the zero-padded sample counter inside keys (`image-000000001`)
pub const KEY_INDEX_WIDTH: usize = 9;

/// Key prefix for raw image bytes
pub const IMAGE_KEY_PREFIX: &str = "image";

/// Key prefix for UTF-8 label bytes
pub const LABEL_KEY_PREFIX: &str = "label";

/// Key holding the ASCII decimal count of stored samples
pub const NUM_SAMPLES_KEY: &[u8] = b"num-samples";

/// Literal tag some ground-truth files put in front of the image path
pub const FILENAME_TAG: &str = "Filename: ";

/// Append-only log of images that failed to decode, created inside the output directory
pub const ERROR_LOG_FILE_NAME: &str = "error_image_log.txt";

// ============================================================================
// Environment overrides
// ============================================================================

/// Map size override, plain bytes or with a K/M/G/T (binary) suffix
pub const ENV_MAP_SIZE: &str = "LMDB_DATASET_MAP_SIZE";

/// Batch size override
pub const ENV_BATCH_SIZE: &str = "LMDB_DATASET_BATCH_SIZE";

/// Validation toggle override ("true" | "1" | "yes" | "on" | "enable")
pub const ENV_CHECK_VALID: &str = "LMDB_DATASET_CHECK_VALID";
