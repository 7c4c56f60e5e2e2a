//! Descriptor matching and candidate ranking.
//!
//! A [`MatchPipeline`] extracts the reference descriptors once, then for each
//! candidate finds two-nearest-neighbour correspondences, keeps the ones that
//! pass the ratio test, turns the count into a match percentage and tracks
//! the best candidate until the candidates run out or the early-exit score is
//! reached.

pub mod config;
pub mod error;
pub mod finder;
pub mod pipeline;
pub mod ratio;
pub mod score;
pub mod tracker;

pub use config::{MatchConfig, MatchConfigBuilder};
pub use error::{ConfigError, MatchError, PipelineResult};
pub use finder::BruteForceMatcher;
pub use pipeline::{MatchPipeline, PipelineState, ScanOutcome, ScanStats, SkipReason, StopReason};
pub use ratio::RatioTest;
pub use score::match_percentage;
pub use tracker::BestMatchTracker;

pub use finger_core;
