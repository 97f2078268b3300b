// src/keys.rs
//
// Key layout shared by the builder and the reader.

use crate::constants::{IMAGE_KEY_PREFIX, KEY_INDEX_WIDTH, LABEL_KEY_PREFIX};

pub use crate::constants::NUM_SAMPLES_KEY;

/// `image-%09d` for a 1-based sample index.
pub fn image_key(index: u64) -> Vec<u8> {
    format!("{IMAGE_KEY_PREFIX}-{index:0width$}", width = KEY_INDEX_WIDTH).into_bytes()
}

/// `label-%09d` for a 1-based sample index.
pub fn label_key(index: u64) -> Vec<u8> {
    format!("{LABEL_KEY_PREFIX}-{index:0width$}", width = KEY_INDEX_WIDTH).into_bytes()
}

/// Value stored under [`NUM_SAMPLES_KEY`].
pub fn num_samples_value(num_samples: u64) -> Vec<u8> {
    num_samples.to_string().into_bytes()
}
