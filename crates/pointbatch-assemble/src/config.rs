//! Assembler configuration and validation.

use std::error::Error;
use std::fmt;

use pointbatch_core::OffsetFields;

/// Default point budget per dynamic sub-batch.
pub const DEFAULT_MAX_POINTS_PER_BATCH: usize = 10_000_000;

// ── AssemblerConfig ────────────────────────────────────────────────

/// Configuration for a [`BatchAssembler`](crate::BatchAssembler).
#[derive(Clone, Debug, PartialEq)]
pub struct AssemblerConfig {
    /// Probability of applying Mix3D to a static batch. Must be in
    /// `[0, 1]`. Default: 0.0.
    pub mix_prob: f64,
    /// Pack samples into point-budgeted sub-batches. Inputs must then be
    /// `(record, point_count)` pairs. Default: false.
    pub dynamic_batching: bool,
    /// Point budget per dynamic sub-batch. Must be at least 1.
    /// Default: [`DEFAULT_MAX_POINTS_PER_BATCH`].
    pub max_points_per_batch: usize,
    /// Seed for the default ChaCha8 mixing RNG. Default: 0.
    pub seed: u64,
    /// Record keys cumulated into sample boundaries. Default: `{"offset"}`.
    pub offset_fields: OffsetFields,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            mix_prob: 0.0,
            dynamic_batching: false,
            max_points_per_batch: DEFAULT_MAX_POINTS_PER_BATCH,
            seed: 0,
            offset_fields: OffsetFields::default(),
        }
    }
}

impl AssemblerConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mix_prob) {
            return Err(ConfigError::InvalidMixProb {
                value: self.mix_prob,
            });
        }
        if self.max_points_per_batch == 0 {
            return Err(ConfigError::ZeroPointBudget);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`AssemblerConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `mix_prob` is NaN or outside `[0, 1]`.
    InvalidMixProb {
        /// The invalid value.
        value: f64,
    },
    /// `max_points_per_batch` is zero.
    ZeroPointBudget,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMixProb { value } => {
                write!(f, "mix_prob must be within [0, 1], got {value}")
            }
            Self::ZeroPointBudget => write!(f, "max_points_per_batch must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
