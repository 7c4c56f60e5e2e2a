use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod collaborators;
mod error;

pub use collaborators::{CorrespondenceFinder, DescriptorSource, MatchReport, ResultReporter};
pub use error::{ExtractError, ReportError};

/// Detected corner with its orientation in radians
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// 256-bit binary descriptor = 32 bytes
pub type BinaryDescriptor = [u8; 32];

/// A fixed-length feature vector with a distance metric.
///
/// The matching core never looks inside a descriptor; it only compares two of
/// them. Binary descriptors use Hamming distance, float descriptors use
/// Euclidean distance.
pub trait Descriptor: Clone + Send + Sync {
    fn distance(&self, other: &Self) -> f32;
}

impl Descriptor for BinaryDescriptor {
    #[inline]
    fn distance(&self, other: &Self) -> f32 {
        self.iter()
            .zip(other.iter())
            .map(|(&a, &b)| (a ^ b).count_ones())
            .sum::<u32>() as f32
    }
}

impl<const N: usize> Descriptor for [f32; N] {
    #[inline]
    fn distance(&self, other: &Self) -> f32 {
        self.iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }
}

/// Keypoints and their descriptors, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorSet<D> {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<D>,
}

impl<D> DescriptorSet<D> {
    /// Pair up keypoints with descriptors; both sequences must have the same length
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<D>) -> Result<Self, ExtractError> {
        if keypoints.len() != descriptors.len() {
            return Err(ExtractError::LengthMismatch {
                keypoints: keypoints.len(),
                descriptors: descriptors.len(),
            });
        }
        Ok(Self { keypoints, descriptors })
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[D] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// An image to be scored against the reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Display name, usually the file name
    pub id: String,
    /// Where the descriptor source finds the image
    pub path: PathBuf,
}

impl Candidate {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Candidate named after the final path component
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(id, path)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Link from a reference descriptor (`query_idx`) to a candidate descriptor (`train_idx`)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrespondencePair {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}

/// Nearest and second-nearest neighbour of one reference descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborPair {
    pub nearest: CorrespondencePair,
    pub second: CorrespondencePair,
}

/// Nearest-neighbour correspondence that passed the ratio test
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoodMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}

impl From<CorrespondencePair> for GoodMatch {
    fn from(pair: CorrespondencePair) -> Self {
        Self {
            query_idx: pair.query_idx,
            train_idx: pair.train_idx,
            distance: pair.distance,
        }
    }
}

/// Score of one candidate together with the evidence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<D> {
    candidate: Candidate,
    position: usize,
    percentage: f32,
    matches: Vec<GoodMatch>,
    descriptors: DescriptorSet<D>,
}

impl<D> MatchResult<D> {
    /// `position` is the candidate's index in enumeration order.
    pub fn new(
        candidate: Candidate,
        position: usize,
        percentage: f32,
        matches: Vec<GoodMatch>,
        descriptors: DescriptorSet<D>,
    ) -> Self {
        Self {
            candidate,
            position,
            percentage,
            matches,
            descriptors,
        }
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Match percentage in `[0, 100]`
    pub fn percentage(&self) -> f32 {
        self.percentage
    }

    pub fn matches(&self) -> &[GoodMatch] {
        &self.matches
    }

    /// Descriptor set of the candidate this result was computed from
    pub fn descriptors(&self) -> &DescriptorSet<D> {
        &self.descriptors
    }
}
