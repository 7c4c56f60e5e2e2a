//! End-to-end fingerprint ranking: image files in, best match out.

use finger_match::{BruteForceMatcher, MatchError, MatchPipeline};
use finger_orb::{OrbError, OrbExtractor};
use thiserror::Error;

pub mod candidates;
pub mod report;
pub mod settings;

pub use candidates::{is_supported_image, ImageDirectory, SUPPORTED_EXTENSIONS};
pub use report::{LogReporter, MatchImageReporter};
pub use settings::{Settings, SettingsError};

pub use finger_core::{self, Candidate, MatchReport, ReportError};
pub use finger_match::{self, MatchConfig, ScanOutcome, StopReason};
pub use finger_orb::{self, OrbParams};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("detector: {0}")]
    Orb(#[from] OrbError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("cannot list candidates: {0}")]
    Candidates(#[from] std::io::Error),

    #[error("report failed: {0}")]
    Report(#[from] ReportError),
}

pub type CliResult<T> = Result<T, CliError>;

/// Pipeline over image files with FAST/BRIEF descriptors and exact matching
pub type ImagePipeline = MatchPipeline<OrbExtractor, BruteForceMatcher>;

/// Build the image pipeline from validated settings
pub fn image_pipeline(settings: &Settings) -> CliResult<ImagePipeline> {
    let extractor = OrbExtractor::new(settings.detector.clone())?;
    Ok(MatchPipeline::new(extractor, BruteForceMatcher, settings.matching.clone())?)
}

/// Scan `candidates` with the pool size from the settings
pub fn scan(
    pipeline: &mut ImagePipeline,
    reference: &Candidate,
    candidates: Vec<Candidate>,
) -> CliResult<ScanOutcome<finger_core::BinaryDescriptor>> {
    let outcome = if pipeline.config().workers > 1 {
        pipeline.run_parallel(reference, candidates)?
    } else {
        pipeline.run(reference, candidates)?
    };
    Ok(outcome)
}
