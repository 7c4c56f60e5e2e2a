use finger_core::{GoodMatch, NeighborPair};

use crate::error::ConfigError;

pub const DEFAULT_RATIO_THRESHOLD: f32 = 0.75;

/// Lowe's ratio test over two-nearest-neighbour pairs.
///
/// A correspondence survives when its nearest distance is strictly below
/// `threshold` times the second-nearest distance, i.e. when the best
/// candidate vector is clearly closer than the runner-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioTest {
    threshold: f32,
}

impl RatioTest {
    /// `threshold` must lie in `(0, 1]`
    pub fn new(threshold: f32) -> Result<Self, ConfigError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::RatioThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Keep the nearest correspondence of every unambiguous pair, in input order
    pub fn apply(&self, pairs: &[NeighborPair]) -> Vec<GoodMatch> {
        pairs
            .iter()
            .filter(|p| self.accepts(p))
            .map(|p| GoodMatch::from(p.nearest))
            .collect()
    }

    #[inline]
    pub fn accepts(&self, pair: &NeighborPair) -> bool {
        pair.nearest.distance < self.threshold * pair.second.distance
    }
}

impl Default for RatioTest {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RATIO_THRESHOLD,
        }
    }
}
