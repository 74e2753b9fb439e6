//! Benchmark profiles for pointbatch.
//!
//! Pre-built sample sets shaped like indoor-scene training batches:
//!
//! - [`indoor_profile`]: 8 scenes of 40K-120K points
//! - [`stress_profile`]: 64 scenes of 5K-200K points, for dynamic packing
//! - [`scene_point_counts`]: deterministic scene sizes via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use pointbatch_core::Record;
use pointbatch_test_utils::{counted_records, point_records};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic scene sizes in `[min, max)`, drawn from ChaCha8.
///
/// An empty range yields `min` for every scene.
pub fn scene_point_counts(scenes: usize, min: usize, max: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..scenes)
        .map(|_| if min < max { rng.random_range(min..max) } else { min })
        .collect()
}

/// 8 scenes of 40K-120K points: a typical static training batch.
pub fn indoor_profile(seed: u64) -> Vec<Record> {
    point_records(&scene_point_counts(8, 40_000, 120_000, seed), seed)
}

/// 64 scenes of 5K-200K points with their counts, for dynamic batching.
pub fn stress_profile(seed: u64) -> Vec<(Record, usize)> {
    counted_records(&scene_point_counts(64, 5_000, 200_000, seed), seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_deterministic_and_in_range() {
        let a = scene_point_counts(32, 10, 20, 7);
        assert_eq!(a, scene_point_counts(32, 10, 20, 7));
        assert!(a.iter().all(|&n| (10..20).contains(&n)));
    }

    #[test]
    fn empty_range_yields_min() {
        assert_eq!(scene_point_counts(3, 5, 5, 1), [5, 5, 5]);
    }
}
