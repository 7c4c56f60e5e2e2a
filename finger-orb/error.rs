use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrbError {
    #[error("Invalid threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),

    #[error("Invalid arc length: {0} (must be 9-12)")]
    InvalidArcLength(usize),

    #[error("Invalid patch size: {0} (must be odd and at least 3)")]
    InvalidPatchSize(usize),

    #[error("Invalid keypoint cap: must be at least 1")]
    InvalidKeypointCap,

    #[error("Image {width}x{height} too small (minimum {min_size}x{min_size})")]
    ImageTooSmall { width: usize, height: usize, min_size: usize },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] finger_core::ExtractError),
}

pub type OrbResult<T> = Result<T, OrbError>;
