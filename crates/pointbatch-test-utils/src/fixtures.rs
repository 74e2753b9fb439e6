//! Deterministic point-cloud sample fixtures.
//!
//! Every fixture is seeded through ChaCha8, so the same `(points, seed)`
//! always yields the same record.
//!
//! - [`point_record`]: numeric record with `coord`, `color`, `segment`, `offset`.
//! - [`named_point_record`]: the same plus a `name` text field.
//! - [`counted_records`] / [`counted_values`]: `(record, point_count)` pairs
//!   for dynamic batching.

use pointbatch_core::{Array, Record, Value};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Build one numeric sample with `points` points.
///
/// Fields, in order: `coord` `[n, 3]` f32 in `[0, 10)`, `color` `[n, 3]`
/// f32 in `[0, 1)`, `segment` `[n]` i64 in `[0, 20)`, `offset` `[1]` i64
/// holding `n`.
pub fn point_record(points: usize, seed: u64) -> Record {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let coord: Vec<f32> = (0..points * 3).map(|_| rng.random::<f32>() * 10.0).collect();
    let color: Vec<f32> = (0..points * 3).map(|_| rng.random::<f32>()).collect();
    let segment: Vec<i64> = (0..points).map(|_| rng.random_range(0..20)).collect();

    Record::new()
        .with("coord", Array::from_f32(&[points, 3], coord).unwrap())
        .with("color", Array::from_f32(&[points, 3], color).unwrap())
        .with("segment", Array::vector_i64(segment))
        .with("offset", Array::vector_i64(vec![points as i64]))
}

/// [`point_record`] with a trailing `name` text field.
pub fn named_point_record(points: usize, seed: u64) -> Record {
    point_record(points, seed).with("name", format!("scene{seed:04}_00"))
}

/// One [`point_record`] per count, seeded `seed, seed + 1, ...`.
pub fn point_records(counts: &[usize], seed: u64) -> Vec<Record> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &n)| point_record(n, seed.wrapping_add(i as u64)))
        .collect()
}

/// `(record, point_count)` pairs for the typed dynamic path.
pub fn counted_records(counts: &[usize], seed: u64) -> Vec<(Record, usize)> {
    point_records(counts, seed)
        .into_iter()
        .zip(counts.iter().copied())
        .collect()
}

/// Records wrapped as mapping values for the untyped static path.
pub fn record_values(counts: &[usize], seed: u64) -> Vec<Value> {
    point_records(counts, seed)
        .into_iter()
        .map(Value::Mapping)
        .collect()
}

/// `[record, point_count]` sequences for the untyped dynamic path.
pub fn counted_values(counts: &[usize], seed: u64) -> Vec<Value> {
    counted_records(counts, seed)
        .into_iter()
        .map(|(record, n)| Value::Sequence(vec![Value::Mapping(record), Value::from(n as i64)]))
        .collect()
}
