use std::path::PathBuf;
use thiserror::Error;

/// Why an image produced no usable descriptor set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// The image decoded but no keypoints were detected in it.
    #[error("no descriptors found")]
    NoDescriptors,

    /// The image could not be read or decoded.
    #[error("could not read image {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    /// Keypoint and descriptor sequences are not index-aligned.
    #[error("keypoint/descriptor count mismatch: {keypoints} keypoints, {descriptors} descriptors")]
    LengthMismatch { keypoints: usize, descriptors: usize },
}

/// Failure while presenting a result. The result itself stays valid.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render error: {0}")]
    Render(String),
}
