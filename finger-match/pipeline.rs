use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use finger_core::{
    Candidate, CorrespondenceFinder, DescriptorSet, DescriptorSource, ExtractError, MatchReport,
    MatchResult, ReportError, ResultReporter,
};
use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::MatchConfig;
use crate::error::{MatchError, PipelineResult};
use crate::ratio::RatioTest;
use crate::score::match_percentage;
use crate::tracker::BestMatchTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Ready,
    Scanning,
    Stopped,
    Reported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every candidate was examined
    Exhausted,
    /// The best score reached the early-exit threshold
    EarlyExit,
    /// `max_candidates` were examined and more were available
    CandidateCap,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted => f.write_str("candidates exhausted"),
            StopReason::EarlyExit => f.write_str("early exit"),
            StopReason::CandidateCap => f.write_str("candidate cap reached"),
        }
    }
}

/// Why a single candidate produced no score
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Extraction(ExtractError),
    /// One of the images has no keypoints, so the percentage is undefined
    UndefinedScore,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Extraction(e) => write!(f, "{}", e),
            SkipReason::UndefinedScore => f.write_str("no valid keypoints detected"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Candidates handed to the descriptor source
    pub examined: usize,
    /// Candidates that produced a score (possibly 0)
    pub scored: usize,
    /// Candidates dropped without a score
    pub skipped: usize,
}

/// Everything a scan produced: the reference it ran against and the winner, if any.
#[derive(Debug, Clone)]
pub struct ScanOutcome<D> {
    pub reference: Candidate,
    pub reference_set: DescriptorSet<D>,
    pub best: Option<MatchResult<D>>,
    pub stats: ScanStats,
    pub stop_reason: StopReason,
}

impl<D> ScanOutcome<D> {
    pub fn best_score(&self) -> f32 {
        self.best.as_ref().map_or(0.0, MatchResult::percentage)
    }

    pub fn as_report(&self) -> MatchReport<'_, D> {
        match &self.best {
            Some(best) => MatchReport::Found {
                reference: &self.reference,
                reference_set: &self.reference_set,
                best,
            },
            None => MatchReport::NoMatch {
                reference: &self.reference,
            },
        }
    }
}

/// Scores candidates against a reference image and keeps the best one.
pub struct MatchPipeline<S, F> {
    source: S,
    finder: F,
    config: MatchConfig,
    ratio_test: RatioTest,
    state: PipelineState,
}

impl<S, F> MatchPipeline<S, F>
where
    S: DescriptorSource,
    F: CorrespondenceFinder<S::Descriptor>,
{
    pub fn new(source: S, finder: F, config: MatchConfig) -> PipelineResult<Self> {
        config.validate()?;
        let ratio_test = config.ratio_test()?;
        Ok(Self {
            source,
            finder,
            config,
            ratio_test,
            state: PipelineState::Ready,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scan candidates one at a time in the order given.
    pub fn run<I>(&mut self, reference: &Candidate, candidates: I) -> PipelineResult<ScanOutcome<S::Descriptor>>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let reference_set = self.extract_reference(reference)?;
        self.state = PipelineState::Scanning;

        let mut tracker = BestMatchTracker::new();
        let mut stats = ScanStats::default();
        let mut stop_reason = StopReason::Exhausted;

        for (position, candidate) in candidates.into_iter().enumerate() {
            if position >= self.config.max_candidates {
                stop_reason = StopReason::CandidateCap;
                break;
            }

            stats.examined += 1;
            match self.evaluate(&reference_set, candidate, position) {
                Ok(result) => {
                    stats.scored += 1;
                    tracker.consider(result);
                }
                Err(_) => stats.skipped += 1,
            }

            if self.config.early_exit_reached(tracker.current_best_score()) {
                stop_reason = StopReason::EarlyExit;
                break;
            }
        }

        Ok(self.finish(reference, reference_set, tracker, stats, stop_reason))
    }

    /// Scan candidates on a pool of `config.workers` threads.
    ///
    /// Workers stop picking up new candidates once the early-exit score is
    /// reached; candidates already in flight still finish and are considered.
    pub fn run_parallel(
        &mut self,
        reference: &Candidate,
        mut candidates: Vec<Candidate>,
    ) -> PipelineResult<ScanOutcome<S::Descriptor>>
    where
        S: Sync,
        F: Sync,
    {
        let reference_set = self.extract_reference(reference)?;
        self.state = PipelineState::Scanning;

        let capped = candidates.len() > self.config.max_candidates;
        candidates.truncate(self.config.max_candidates);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()?;

        let tracker = Mutex::new(BestMatchTracker::new());
        let stop = AtomicBool::new(false);
        let examined = AtomicUsize::new(0);
        let scored = AtomicUsize::new(0);

        let this: &Self = self;
        pool.install(|| {
            candidates
                .into_par_iter()
                .enumerate()
                .for_each(|(position, candidate)| {
                    if stop.load(Ordering::Acquire) {
                        return;
                    }
                    examined.fetch_add(1, Ordering::Relaxed);

                    if let Ok(result) = this.evaluate(&reference_set, candidate, position) {
                        scored.fetch_add(1, Ordering::Relaxed);
                        let mut tracker = tracker.lock();
                        tracker.consider(result);
                        if this.config.early_exit_reached(tracker.current_best_score()) {
                            stop.store(true, Ordering::Release);
                        }
                    }
                })
        });

        let examined = examined.into_inner();
        let scored = scored.into_inner();
        let stats = ScanStats {
            examined,
            scored,
            skipped: examined - scored,
        };
        let stop_reason = if stop.into_inner() {
            StopReason::EarlyExit
        } else if capped {
            StopReason::CandidateCap
        } else {
            StopReason::Exhausted
        };

        Ok(self.finish(reference, reference_set, tracker.into_inner(), stats, stop_reason))
    }

    /// Hand the outcome to a reporter. A reporter failure does not affect the outcome.
    pub fn report<R>(&mut self, outcome: &ScanOutcome<S::Descriptor>, reporter: &mut R) -> Result<(), ReportError>
    where
        R: ResultReporter<S::Descriptor>,
    {
        self.state = PipelineState::Reported;
        reporter.report(outcome.as_report())
    }

    /// Score one candidate against the reference descriptors.
    pub fn evaluate(
        &self,
        reference_set: &DescriptorSet<S::Descriptor>,
        candidate: Candidate,
        position: usize,
    ) -> Result<MatchResult<S::Descriptor>, SkipReason> {
        let descriptors = match self.source.extract(&candidate) {
            Ok(set) => set,
            Err(e) => {
                warn!("Skipping {}: {}", candidate, e);
                return Err(SkipReason::Extraction(e));
            }
        };

        if descriptors.len() < 2 {
            debug!("{} has {} descriptor(s), no two-nearest-neighbour query possible", candidate, descriptors.len());
        }

        let pairs = self
            .finder
            .find_two_nearest(reference_set.descriptors(), descriptors.descriptors());
        let good = self.ratio_test.apply(&pairs);

        let Some(percentage) = match_percentage(good.len(), reference_set.len(), descriptors.len()) else {
            warn!("Image: {}, No valid keypoints detected.", candidate);
            return Err(SkipReason::UndefinedScore);
        };

        info!("Image: {}, Match Percentage: {:.2}%", candidate, percentage);
        Ok(MatchResult::new(candidate, position, percentage, good, descriptors))
    }

    fn extract_reference(&mut self, reference: &Candidate) -> PipelineResult<DescriptorSet<S::Descriptor>> {
        let extracted = self.source.extract(reference).and_then(|set| {
            if set.is_empty() {
                Err(ExtractError::NoDescriptors)
            } else {
                Ok(set)
            }
        });

        match extracted {
            Ok(set) => {
                debug!("Reference {} has {} descriptors", reference, set.len());
                Ok(set)
            }
            Err(e) => {
                self.state = PipelineState::Stopped;
                Err(MatchError::Reference(e))
            }
        }
    }

    fn finish(
        &mut self,
        reference: &Candidate,
        reference_set: DescriptorSet<S::Descriptor>,
        tracker: BestMatchTracker<S::Descriptor>,
        stats: ScanStats,
        stop_reason: StopReason,
    ) -> ScanOutcome<S::Descriptor> {
        self.state = PipelineState::Stopped;
        info!(
            "Scan stopped ({}): {} examined, {} scored, {} skipped, best {:.2}%",
            stop_reason,
            stats.examined,
            stats.scored,
            stats.skipped,
            tracker.current_best_score()
        );

        ScanOutcome {
            reference: reference.clone(),
            reference_set,
            best: tracker.into_best(),
            stats,
            stop_reason,
        }
    }
}
