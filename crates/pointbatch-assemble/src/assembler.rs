//! The batch assembler: collation, dynamic packing, and Mix3D.

use pointbatch_collate::Collator;
use pointbatch_core::{Batch, Record, Scalar, Value, OFFSET_KEY};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::{AssemblerConfig, ConfigError};
use crate::error::AssembleError;
use crate::mix::mix_offset_array;
use crate::packing::pack_by_point_budget;

/// Contract message for a dynamic-mode sample that is not a pair.
pub const PAIR_CONTRACT: &str = "dynamic batching expects [record, num_points] pairs";

/// Contract message for a static-mode sample that is not a record.
pub const RECORD_CONTRACT: &str = "static batching expects record samples";

/// Output of [`BatchAssembler::assemble`].
#[derive(Clone, Debug, PartialEq)]
pub enum Assembled {
    /// One collated batch (static mode).
    Batch(Batch),
    /// Point-budgeted sub-batches, largest samples first (dynamic mode).
    SubBatches(Vec<Batch>),
}

impl Assembled {
    /// Flatten into a list of batches.
    pub fn into_batches(self) -> Vec<Batch> {
        match self {
            Self::Batch(b) => vec![b],
            Self::SubBatches(bs) => bs,
        }
    }

    /// The single batch of a static assembly.
    pub fn as_batch(&self) -> Option<&Batch> {
        match self {
            Self::Batch(b) => Some(b),
            Self::SubBatches(_) => None,
        }
    }
}

/// Assembles per-sample records into training batches.
///
/// Owns its random source, so two assemblers built from the same config
/// make the same mixing decisions for the same inputs.
#[derive(Debug)]
pub struct BatchAssembler<R = ChaCha8Rng> {
    config: AssemblerConfig,
    collator: Collator,
    rng: R,
}

impl BatchAssembler<ChaCha8Rng> {
    /// Create an assembler whose RNG is seeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `config` fails [`AssemblerConfig::validate`].
    pub fn new(config: AssemblerConfig) -> Result<Self, ConfigError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> BatchAssembler<R> {
    /// Create an assembler drawing mixing decisions from `rng`.
    /// `config.seed` is ignored.
    pub fn with_rng(config: AssemblerConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let collator = Collator::new(config.offset_fields.clone());
        Ok(Self {
            config,
            collator,
            rng,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// The underlying collator.
    pub fn collator(&self) -> &Collator {
        &self.collator
    }

    /// Assemble raw samples, selecting the mode from the config.
    ///
    /// In static mode every sample must be a [`Value::Mapping`]. In
    /// dynamic mode every sample must be a two-element
    /// [`Value::Sequence`] of a record and its point count (an integer
    /// scalar or a one-element integer array).
    ///
    /// # Errors
    ///
    /// [`AssembleError::ContractViolation`] for a sample of the wrong
    /// shape, [`AssembleError::Collate`] for a collation failure.
    pub fn assemble(&mut self, samples: &[Value]) -> Result<Assembled, AssembleError> {
        if self.config.dynamic_batching {
            let pairs = samples
                .iter()
                .enumerate()
                .map(|(index, sample)| {
                    counted_pair(sample).ok_or(AssembleError::ContractViolation {
                        message: PAIR_CONTRACT,
                        index,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.pack_and_collate(&pairs).map(Assembled::SubBatches)
        } else {
            let records = samples
                .iter()
                .enumerate()
                .map(|(index, sample)| {
                    sample.as_record().ok_or(AssembleError::ContractViolation {
                        message: RECORD_CONTRACT,
                        index,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            self.collate_and_mix(&records).map(Assembled::Batch)
        }
    }

    /// Static path: collate all records into one batch, then apply Mix3D
    /// with probability `mix_prob` if the batch has an `offset` field.
    pub fn assemble_records(&mut self, records: &[Record]) -> Result<Batch, AssembleError> {
        let refs: Vec<&Record> = records.iter().collect();
        self.collate_and_mix(&refs)
    }

    /// Dynamic path: pack `(record, point_count)` pairs largest-first under
    /// `max_points_per_batch` and collate each group. Sub-batches are not
    /// mixed. An empty input yields no sub-batches.
    pub fn assemble_dynamic(
        &mut self,
        samples: &[(Record, usize)],
    ) -> Result<Vec<Batch>, AssembleError> {
        let refs: Vec<(&Record, usize)> = samples.iter().map(|(r, n)| (r, *n)).collect();
        self.pack_and_collate(&refs)
    }

    fn collate_and_mix(&mut self, records: &[&Record]) -> Result<Batch, AssembleError> {
        let mut batch = self.collator.collate_record_refs(records)?;
        self.maybe_mix(&mut batch)?;
        Ok(batch)
    }

    fn maybe_mix(&mut self, batch: &mut Batch) -> Result<(), AssembleError> {
        let Some(offset) = batch.offset() else {
            return Ok(());
        };
        let draw: f64 = self.rng.random();
        if draw >= self.config.mix_prob {
            return Ok(());
        }

        let samples = offset.len();
        let mixed = mix_offset_array(offset)?;
        debug!(samples, groups = mixed.len(), "applied Mix3D offset merge");
        batch.insert(OFFSET_KEY, mixed);
        Ok(())
    }

    fn pack_and_collate(
        &mut self,
        samples: &[(&Record, usize)],
    ) -> Result<Vec<Batch>, AssembleError> {
        let counts: Vec<usize> = samples.iter().map(|&(_, n)| n).collect();
        let cap = self.config.max_points_per_batch;
        let groups = pack_by_point_budget(&counts, cap);

        let mut batches = Vec::with_capacity(groups.len());
        for group in &groups {
            let records: Vec<&Record> = group.indices.iter().map(|&i| samples[i].0).collect();
            if group.points > cap {
                debug!(points = group.points, cap, "sample exceeds the point budget alone");
            }
            debug!(samples = records.len(), points = group.points, "closed sub-batch");
            batches.push(self.collator.collate_record_refs(&records)?);
        }
        Ok(batches)
    }
}

/// Unpack a `[record, num_points]` sample.
fn counted_pair(sample: &Value) -> Option<(&Record, usize)> {
    match sample.as_sequence()? {
        [record, count] => Some((record.as_record()?, point_count(count)?)),
        _ => None,
    }
}

fn point_count(value: &Value) -> Option<usize> {
    let n = match value {
        Value::Scalar(Scalar::Int(n)) => *n,
        Value::Array(a) => match a.as_i64()? {
            [n] => *n,
            _ => return None,
        },
        _ => return None,
    };
    usize::try_from(n).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointbatch_core::Array;

    /// Yields only zero bits, so every uniform draw is 0.0.
    #[derive(Debug)]
    struct ZeroRng;

    impl rand::RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    fn record(points: usize) -> Record {
        Record::new()
            .with("coord", Array::from_f32(&[points, 3], vec![0.0; points * 3]).unwrap())
            .with("offset", Array::vector_i64(vec![points as i64]))
    }

    fn always_mix() -> AssemblerConfig {
        AssemblerConfig {
            mix_prob: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AssemblerConfig {
            mix_prob: 2.0,
            ..Default::default()
        };
        assert!(BatchAssembler::new(config).is_err());
    }

    #[test]
    fn no_mixing_by_default() {
        let mut assembler = BatchAssembler::new(AssemblerConfig::default()).unwrap();
        let batch = assembler
            .assemble_records(&[record(2), record(3), record(4)])
            .unwrap();
        assert_eq!(batch.offset().unwrap().as_i64().unwrap(), &[2, 5, 9]);
    }

    #[test]
    fn certain_mixing_merges_pairs() {
        let mut assembler = BatchAssembler::new(always_mix()).unwrap();
        let batch = assembler
            .assemble_records(&[record(2), record(3), record(4), record(5)])
            .unwrap();
        assert_eq!(batch.offset().unwrap().as_i64().unwrap(), &[5, 14]);
        assert_eq!(batch.coord().unwrap().len(), 14);
    }

    #[test]
    fn draw_below_threshold_mixes() {
        let config = AssemblerConfig {
            mix_prob: 0.01,
            ..Default::default()
        };
        let mut assembler = BatchAssembler::with_rng(config, ZeroRng).unwrap();
        let batch = assembler.assemble_records(&[record(1), record(1)]).unwrap();
        assert_eq!(batch.offset().unwrap().as_i64().unwrap(), &[2]);
    }

    #[test]
    fn zero_probability_never_mixes() {
        let mut assembler =
            BatchAssembler::with_rng(AssemblerConfig::default(), ZeroRng).unwrap();
        let batch = assembler.assemble_records(&[record(1), record(1)]).unwrap();
        assert_eq!(batch.offset().unwrap().len(), 2);
    }

    #[test]
    fn batches_without_offset_skip_mixing() {
        let plain = Record::new().with("coord", Array::from_f32(&[1, 3], vec![0.0; 3]).unwrap());
        let mut assembler = BatchAssembler::new(always_mix()).unwrap();
        let batch = assembler.assemble_records(&[plain.clone(), plain]).unwrap();
        assert!(batch.offset().is_none());
    }

    #[test]
    fn static_mode_rejects_non_records() {
        let mut assembler = BatchAssembler::new(AssemblerConfig::default()).unwrap();
        let samples = [Value::from(record(1)), Value::from("not a record")];
        assert_eq!(
            assembler.assemble(&samples).unwrap_err(),
            AssembleError::ContractViolation {
                message: RECORD_CONTRACT,
                index: 1
            }
        );
    }

    #[test]
    fn dynamic_mode_rejects_bare_records() {
        let config = AssemblerConfig {
            dynamic_batching: true,
            ..Default::default()
        };
        let mut assembler = BatchAssembler::new(config).unwrap();
        let samples = [Value::from(record(1))];
        assert_eq!(
            assembler.assemble(&samples).unwrap_err(),
            AssembleError::ContractViolation {
                message: PAIR_CONTRACT,
                index: 0
            }
        );
    }

    #[test]
    fn counted_pair_accepts_scalar_or_single_element_array() {
        let r = Value::from(record(3));
        let scalar = Value::Sequence(vec![r.clone(), Value::from(3i64)]);
        let array = Value::Sequence(vec![r.clone(), Array::vector_i64(vec![3]).into()]);
        let negative = Value::Sequence(vec![r.clone(), Value::from(-1i64)]);
        let triple = Value::Sequence(vec![r.clone(), Value::from(3i64), Value::from(3i64)]);
        assert_eq!(counted_pair(&scalar).map(|(_, n)| n), Some(3));
        assert_eq!(counted_pair(&array).map(|(_, n)| n), Some(3));
        assert!(counted_pair(&negative).is_none());
        assert!(counted_pair(&triple).is_none());
    }

    #[test]
    fn dynamic_sub_batches_are_not_mixed() {
        let config = AssemblerConfig {
            mix_prob: 1.0,
            max_points_per_batch: 100,
            ..Default::default()
        };
        let mut assembler = BatchAssembler::new(config).unwrap();
        let batches = assembler
            .assemble_dynamic(&[(record(3), 3), (record(4), 4)])
            .unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].offset().unwrap().as_i64().unwrap(), &[4, 7]);
    }

    #[test]
    fn collate_errors_are_wrapped() {
        let mut assembler = BatchAssembler::new(AssemblerConfig::default()).unwrap();
        let err = assembler.assemble_records(&[]).unwrap_err();
        assert!(matches!(err, AssembleError::Collate(_)));
    }

    #[test]
    fn into_batches_flattens() {
        let one = Assembled::Batch(record(1));
        assert!(one.as_batch().is_some());
        assert_eq!(one.into_batches().len(), 1);
        assert_eq!(Assembled::SubBatches(vec![]).into_batches().len(), 0);
    }
}
