//! Image validity checks.
//!
//! An image is valid when its bytes are non-empty, decode as a single-channel
//! (grayscale) raster, and the raster has non-zero height and width.

use image::ImageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageCheckError {
    #[error("image buffer is empty")]
    Empty,

    #[error("image decode failed: {0}")]
    Decode(#[from] ImageError),
}

/// Decide whether `bytes` hold a usable image.
///
/// * `Ok(true)`  - decodes and has a non-zero area
/// * `Ok(false)` - zero-area raster
/// * `Err(_)`    - empty input, or the codec rejected the bytes
///
/// The check has no side effects, so the same bytes always give the same verdict.
pub fn check_image_is_valid(bytes: &[u8]) -> Result<bool, ImageCheckError> {
    if bytes.is_empty() {
        return Err(ImageCheckError::Empty);
    }
    let gray = image::load_from_memory(bytes)?.into_luma8();
    let (width, height) = gray.dimensions();
    Ok(u64::from(width) * u64::from(height) > 0)
}
