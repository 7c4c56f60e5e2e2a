//! Keypoint detection and binary descriptors for fingerprint images.
//!
//! [`OrbExtractor`] decodes an image file, finds FAST corners, orients them by
//! intensity centroid and describes each with a 256-bit rotated BRIEF string.
//! It is the [`DescriptorSource`] used by the `fingermatch` binary.

use finger_core::{BinaryDescriptor, Candidate, DescriptorSet, DescriptorSource, ExtractError};
use image::GrayImage;
use std::path::Path;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod brief;
pub mod error;
pub mod fast;

pub use brief::BriefGenerator;
pub use error::{OrbError, OrbResult};
pub use fast::{CornerDetector, ScoredKeypoint, MIN_IMAGE_SIZE};

/// Detector parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrbParams {
    /// FAST intensity threshold (1-127)
    pub threshold: u8,
    /// Contiguous circle pixels required for a corner (9 = FAST-9, 12 = FAST-12)
    pub arc_length: usize,
    /// Odd side length of the orientation patch
    pub patch_size: usize,
    pub nms_distance: f32,
    /// Strongest corners kept per image
    pub max_keypoints: usize,
}

impl Default for OrbParams {
    fn default() -> Self {
        Self {
            threshold: 20,
            arc_length: 9,
            patch_size: 15,
            nms_distance: 3.0,
            max_keypoints: 500,
        }
    }
}

impl OrbParams {
    pub fn validate(&self) -> OrbResult<()> {
        if self.threshold == 0 || self.threshold > 127 {
            return Err(OrbError::InvalidThreshold(self.threshold));
        }
        if !(9..=12).contains(&self.arc_length) {
            return Err(OrbError::InvalidArcLength(self.arc_length));
        }
        if self.patch_size < 3 || self.patch_size % 2 == 0 {
            return Err(OrbError::InvalidPatchSize(self.patch_size));
        }
        if self.max_keypoints == 0 {
            return Err(OrbError::InvalidKeypointCap);
        }
        Ok(())
    }
}

/// FAST + rotated BRIEF descriptor source for image files.
#[derive(Debug, Clone)]
pub struct OrbExtractor {
    params: OrbParams,
    detector: CornerDetector,
}

impl OrbExtractor {
    pub fn new(params: OrbParams) -> OrbResult<Self> {
        params.validate()?;
        let detector = CornerDetector::new(params.threshold, params.arc_length, params.patch_size);
        Ok(Self { params, detector })
    }

    /// Detect keypoints and compute their descriptors in one step
    pub fn detect_and_describe(&self, img: &GrayImage) -> OrbResult<DescriptorSet<BinaryDescriptor>> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        if w < MIN_IMAGE_SIZE || h < MIN_IMAGE_SIZE {
            return Err(OrbError::ImageTooSmall {
                width: w,
                height: h,
                min_size: MIN_IMAGE_SIZE,
            });
        }

        let raw = img.as_raw();
        let scored = self.detector.detect(raw, w, h);
        let kept = fast::non_maximum_suppression(&scored, self.params.nms_distance, self.params.max_keypoints);
        debug!("{} corners, {} after suppression", scored.len(), kept.len());

        let keypoints: Vec<_> = kept.into_iter().map(|sk| sk.keypoint).collect();
        let descriptors = BriefGenerator::new(raw, w, h).describe(&keypoints);

        Ok(DescriptorSet::new(keypoints, descriptors)?)
    }

    /// Decode an image file as 8-bit luma and describe it
    pub fn describe_file(&self, path: &Path) -> OrbResult<DescriptorSet<BinaryDescriptor>> {
        let img = image::open(path)?.to_luma8();
        self.detect_and_describe(&img)
    }
}

impl DescriptorSource for OrbExtractor {
    type Descriptor = BinaryDescriptor;

    fn extract(&self, candidate: &Candidate) -> Result<DescriptorSet<BinaryDescriptor>, ExtractError> {
        let set = match self.describe_file(&candidate.path) {
            Ok(set) => set,
            Err(OrbError::ImageTooSmall { .. }) => return Err(ExtractError::NoDescriptors),
            Err(OrbError::Descriptor(e)) => return Err(e),
            Err(e) => {
                return Err(ExtractError::Unreadable {
                    path: candidate.path.clone(),
                    reason: e.to_string(),
                })
            }
        };

        if set.is_empty() {
            return Err(ExtractError::NoDescriptors);
        }
        Ok(set)
    }
}
