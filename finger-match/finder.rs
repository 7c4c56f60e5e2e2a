use finger_core::{CorrespondenceFinder, CorrespondencePair, Descriptor, NeighborPair};
use rayon::prelude::*;

/// Exact two-nearest-neighbour search by linear scan.
///
/// Query descriptors are processed in parallel; the output keeps query order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceMatcher;

impl BruteForceMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<D: Descriptor> CorrespondenceFinder<D> for BruteForceMatcher {
    fn find_two_nearest(&self, query: &[D], target: &[D]) -> Vec<NeighborPair> {
        if target.len() < 2 {
            return Vec::new();
        }

        query
            .par_iter()
            .enumerate()
            .map(|(query_idx, q)| two_nearest(query_idx, q, target))
            .collect()
    }
}

fn two_nearest<D: Descriptor>(query_idx: usize, q: &D, target: &[D]) -> NeighborPair {
    let mut best = (0usize, f32::INFINITY);
    let mut second = (0usize, f32::INFINITY);

    for (train_idx, t) in target.iter().enumerate() {
        let d = q.distance(t);
        if d < best.1 {
            second = best;
            best = (train_idx, d);
        } else if d < second.1 {
            second = (train_idx, d);
        }
    }

    NeighborPair {
        nearest: CorrespondencePair { query_idx, train_idx: best.0, distance: best.1 },
        second: CorrespondencePair { query_idx, train_idx: second.0, distance: second.1 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finger_core::BinaryDescriptor;

    fn desc(bits: u32) -> BinaryDescriptor {
        let mut d = [0u8; 32];
        d[..4].copy_from_slice(&bits.to_le_bytes());
        d
    }

    #[test]
    fn test_too_few_targets() {
        let query = vec![desc(1), desc(2)];
        assert!(BruteForceMatcher.find_two_nearest(&query[..], &[]).is_empty());
        assert!(BruteForceMatcher.find_two_nearest(&query[..], &[desc(1)]).is_empty());
    }

    #[test]
    fn test_finds_nearest_and_second() {
        let query = vec![desc(0b0000), desc(0xFFFF_FFFF)];
        let target = vec![desc(0b1111), desc(0b0001), desc(0xFFFF_FFFE), desc(0b0011)];

        let pairs = BruteForceMatcher.find_two_nearest(&query[..], &target);
        assert_eq!(pairs.len(), 2);

        assert_eq!(pairs[0].nearest.query_idx, 0);
        assert_eq!(pairs[0].nearest.train_idx, 1);
        assert_eq!(pairs[0].nearest.distance, 1.0);
        assert_eq!(pairs[0].second.train_idx, 3);
        assert_eq!(pairs[0].second.distance, 2.0);

        assert_eq!(pairs[1].nearest.query_idx, 1);
        assert_eq!(pairs[1].nearest.train_idx, 2);
        assert_eq!(pairs[1].nearest.distance, 1.0);
    }

    #[test]
    fn test_equal_distances_keep_lower_index_first() {
        let query = vec![desc(0)];
        let target = vec![desc(0b01), desc(0b10), desc(0b100)];
        let pairs = BruteForceMatcher.find_two_nearest(&query[..], &target);
        assert_eq!(pairs[0].nearest.train_idx, 0);
        assert_eq!(pairs[0].second.train_idx, 1);
    }

    #[test]
    fn test_float_descriptors() {
        let query = vec![[0.0f32, 0.0], [10.0, 10.0]];
        let target = vec![[9.0f32, 10.0], [0.5, 0.0], [3.0, 4.0]];
        let pairs = BruteForceMatcher.find_two_nearest(&query[..], &target);
        assert_eq!(pairs[0].nearest.train_idx, 1);
        assert_eq!(pairs[0].second.train_idx, 2);
        assert!((pairs[0].second.distance - 5.0).abs() < 1e-6);
        assert_eq!(pairs[1].nearest.train_idx, 0);
    }
}
