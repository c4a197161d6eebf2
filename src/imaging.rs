//! Image upload → model input tensor.
//!
//! Both image classifiers were trained on 224×224 RGB in NHWC layout with
//! intensities scaled to [0, 1]. Resizing ignores aspect ratio and uses
//! nearest-neighbour sampling, matching how the training set was prepared.

use image::imageops::FilterType;
use thiserror::Error;

use crate::artifacts::InputTensor;

/// Square edge length expected by the image models.
pub const TARGET_SIZE: u32 = 224;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10 MB

/// Multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Uploaded file exceeds {}MB limit", MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge,

    #[error("Uploaded file is not a readable image: {0}")]
    Undecodable(String),

    #[error("Malformed upload: {0}")]
    Multipart(String),
}

/// Decode, convert to RGB, resize and scale an uploaded image.
///
/// CPU-bound; call from `spawn_blocking`.
pub fn preprocess(bytes: &[u8]) -> Result<InputTensor, InputError> {
    if bytes.is_empty() {
        return Err(InputError::NoFile);
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(InputError::TooLarge);
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| InputError::Undecodable(e.to_string()))?;
    let rgb = img.to_rgb8();
    let resized = image::imageops::resize(&rgb, TARGET_SIZE, TARGET_SIZE, FilterType::Nearest);

    tracing::debug!(
        width = rgb.width(),
        height = rgb.height(),
        target = TARGET_SIZE,
        "Image preprocessed"
    );

    // RgbImage raw buffer is already row-major HWC.
    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| f32::from(v) / 255.0)
        .collect();
    let size = TARGET_SIZE as usize;

    InputTensor::new(vec![1, size, size, 3], data)
        .map_err(|e| InputError::Undecodable(e.to_string()))
}
