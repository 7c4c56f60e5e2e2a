use finger_core::MatchResult;

/// Running best candidate of a scan.
///
/// A result replaces the current best only if its percentage is strictly
/// higher. On equal percentages the candidate that came first in enumeration
/// order is kept, which also holds when results arrive out of order from
/// parallel workers.
///
/// Because of that rule, a parallel result still in flight when early exit
/// fires can replace a best of equal score if it came earlier in the
/// enumeration. A sequential scan never sees such a result.
#[derive(Debug, Clone)]
pub struct BestMatchTracker<D> {
    best: Option<MatchResult<D>>,
    best_score: f32,
}

impl<D> BestMatchTracker<D> {
    pub fn new() -> Self {
        Self {
            best: None,
            best_score: 0.0,
        }
    }

    /// Returns true if `result` became the new best
    pub fn consider(&mut self, result: MatchResult<D>) -> bool {
        let score = result.percentage();
        let better = match &self.best {
            None => score > self.best_score,
            Some(best) => {
                score > self.best_score
                    || (score == self.best_score && result.position() < best.position())
            }
        };
        if better {
            self.best_score = score;
            self.best = Some(result);
        }
        better
    }

    pub fn current_best(&self) -> Option<&MatchResult<D>> {
        self.best.as_ref()
    }

    /// 0 until a candidate scores above zero
    pub fn current_best_score(&self) -> f32 {
        self.best_score
    }

    pub fn into_best(self) -> Option<MatchResult<D>> {
        self.best
    }
}

impl<D> Default for BestMatchTracker<D> {
    fn default() -> Self {
        Self::new()
    }
}
