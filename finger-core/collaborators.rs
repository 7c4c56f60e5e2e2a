use crate::error::{ExtractError, ReportError};
use crate::{Candidate, Descriptor, DescriptorSet, MatchResult, NeighborPair};

/// Produces keypoints and descriptors for a candidate image.
pub trait DescriptorSource {
    type Descriptor: Descriptor;

    /// Returns `ExtractError::NoDescriptors` when nothing was detected.
    fn extract(&self, candidate: &Candidate) -> Result<DescriptorSet<Self::Descriptor>, ExtractError>;
}

/// Two-nearest-neighbour search between descriptor sets.
pub trait CorrespondenceFinder<D: Descriptor> {
    /// One `NeighborPair` per query descriptor, in query order.
    ///
    /// Queries are omitted when `target` holds fewer than two descriptors, so
    /// the result may be shorter than `query`.
    fn find_two_nearest(&self, query: &[D], target: &[D]) -> Vec<NeighborPair>;
}

/// What a reporter is handed once a scan has stopped.
#[derive(Debug, Clone, Copy)]
pub enum MatchReport<'a, D> {
    Found {
        reference: &'a Candidate,
        reference_set: &'a DescriptorSet<D>,
        best: &'a MatchResult<D>,
    },
    NoMatch {
        reference: &'a Candidate,
    },
}

/// Presents the final outcome of a scan (log line, image file, ...).
pub trait ResultReporter<D> {
    fn report(&mut self, report: MatchReport<'_, D>) -> Result<(), ReportError>;
}
