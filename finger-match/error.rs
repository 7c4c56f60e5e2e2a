use finger_core::ExtractError;
use thiserror::Error;

/// Failures that stop a whole scan. Per-candidate problems never end up here.
#[derive(Error, Debug)]
pub enum MatchError {
    /// The reference image is unreadable or has no descriptors.
    #[error("reference image unusable: {0}")]
    Reference(#[source] ExtractError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("ratio threshold {0} must be in (0, 1]")]
    RatioThreshold(f32),

    #[error("early-exit score {0} must be in (0, 100]")]
    EarlyExitScore(f32),

    #[error("candidate cap must be at least 1")]
    MaxCandidates,

    #[error("worker count must be at least 1")]
    Workers,
}

pub type PipelineResult<T> = Result<T, MatchError>;
