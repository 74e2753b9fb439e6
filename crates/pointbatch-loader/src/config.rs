//! Pool configuration and error types.

use std::error::Error;
use std::fmt;

use pointbatch_assemble::{AssembleError, AssemblerConfig, ConfigError};

/// Configuration for a [`CollatePool`](crate::CollatePool).
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of worker threads. `None` = auto-detect
    /// (`available_parallelism / 2`, clamped to `[1, 16]`).
    pub worker_count: Option<usize>,
    /// Capacity of the task queue; `submit` blocks while it is full.
    /// Default: 8.
    pub queue_depth: usize,
    /// Configuration shared by every worker's assembler.
    pub assembler: AssemblerConfig,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            queue_depth: 8,
            assembler: AssemblerConfig::default(),
        }
    }
}

impl PoolConfig {
    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(2);
                (cpus / 2).clamp(1, 16)
            }
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), PoolError> {
        self.assembler.validate()?;
        if self.queue_depth == 0 {
            return Err(PoolError::ZeroQueueDepth);
        }
        Ok(())
    }
}

/// Errors from [`CollatePool`](crate::CollatePool) construction and use.
///
/// Task failures are not pool errors; they are reported per task as a
/// [`TaskError`] in [`Completed::result`](crate::Completed).
#[derive(Debug, Clone, PartialEq)]
pub enum PoolError {
    /// The assembler configuration is invalid.
    Config(ConfigError),
    /// `queue_depth` is zero.
    ZeroQueueDepth,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of the spawn failure.
        reason: String,
    },
    /// The pool no longer accepts tasks.
    ShutDown,
    /// `recv` was called with no task in flight.
    NothingPending,
    /// Every worker exited while tasks were still in flight.
    WorkersLost,
    /// Workers panicked; reported on shutdown.
    WorkerPanicked {
        /// Number of workers that panicked.
        count: usize,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::ZeroQueueDepth => write!(f, "queue_depth must be at least 1"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::ShutDown => write!(f, "pool is shut down"),
            Self::NothingPending => write!(f, "no batches in flight"),
            Self::WorkersLost => write!(f, "all workers exited with batches in flight"),
            Self::WorkerPanicked { count } => write!(f, "{count} worker(s) panicked"),
        }
    }
}

impl Error for PoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for PoolError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Why one submitted batch produced no result.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskError {
    /// The assembler rejected the batch.
    Assemble(AssembleError),
    /// The worker panicked while assembling the batch. The worker itself
    /// keeps running.
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assemble(e) => write!(f, "assemble: {e}"),
            Self::Panicked { message } => write!(f, "worker panicked: {message}"),
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Assemble(e) => Some(e),
            Self::Panicked { .. } => None,
        }
    }
}

impl From<AssembleError> for TaskError {
    fn from(e: AssembleError) -> Self {
        Self::Assemble(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_worker_count_is_clamped() {
        let mut config = PoolConfig {
            worker_count: Some(0),
            ..Default::default()
        };
        assert_eq!(config.resolved_worker_count(), 1);
        config.worker_count = Some(1000);
        assert_eq!(config.resolved_worker_count(), 64);
    }

    #[test]
    fn auto_worker_count_is_in_range() {
        let n = PoolConfig::default().resolved_worker_count();
        assert!((1..=16).contains(&n));
    }

    #[test]
    fn zero_queue_depth_rejected() {
        let config = PoolConfig {
            queue_depth: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(PoolError::ZeroQueueDepth));
    }

    #[test]
    fn task_error_chains_the_assemble_error() {
        let err = TaskError::from(AssembleError::Config(ConfigError::ZeroPointBudget));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("assemble: config: "));
        let panicked = TaskError::Panicked {
            message: "boom".into(),
        };
        assert!(panicked.source().is_none());
    }

    #[test]
    fn assembler_config_is_validated() {
        let mut config = PoolConfig::default();
        config.assembler.max_points_per_batch = 0;
        assert!(matches!(config.validate(), Err(PoolError::Config(_))));
    }
}
