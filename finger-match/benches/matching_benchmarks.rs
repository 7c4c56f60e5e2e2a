use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use finger_core::{BinaryDescriptor, CorrespondenceFinder};
use finger_match::{match_percentage, BruteForceMatcher, RatioTest};

/// Pseudo-random descriptors from a xorshift stream
fn create_descriptors(n: usize, seed: u64) -> Vec<BinaryDescriptor> {
    let mut state = seed.max(1);
    (0..n)
        .map(|_| {
            let mut d = [0u8; 32];
            for chunk in d.chunks_mut(8) {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                chunk.copy_from_slice(&state.to_le_bytes());
            }
            d
        })
        .collect()
}

/// Candidate sharing `shared` descriptors with the reference
fn create_candidate(reference: &[BinaryDescriptor], shared: usize, seed: u64) -> Vec<BinaryDescriptor> {
    let mut candidate = reference[..shared].to_vec();
    candidate.extend(create_descriptors(reference.len() - shared, seed));
    candidate
}

fn bench_two_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("two_nearest");

    for &n in &[64usize, 256, 500, 1000] {
        let reference = create_descriptors(n, 7);
        let candidate = create_candidate(&reference, n / 4, 11);

        group.bench_with_input(
            BenchmarkId::new("brute_force", n),
            &(reference, candidate),
            |b, (reference, candidate)| {
                b.iter(|| black_box(BruteForceMatcher.find_two_nearest(black_box(reference.as_slice()), black_box(candidate.as_slice()))))
            },
        );
    }

    group.finish();
}

fn bench_candidate_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate_score");
    let ratio = RatioTest::default();

    for &n in &[256usize, 500] {
        let reference = create_descriptors(n, 3);
        let candidate = create_candidate(&reference, n / 2, 5);

        group.bench_with_input(BenchmarkId::new("match_and_score", n), &(reference, candidate), |b, (reference, candidate)| {
            b.iter(|| {
                let pairs = BruteForceMatcher.find_two_nearest(reference.as_slice(), candidate.as_slice());
                let good = ratio.apply(&pairs);
                black_box(match_percentage(good.len(), reference.len(), candidate.len()))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_two_nearest, bench_candidate_score);
criterion_main!(benches);
