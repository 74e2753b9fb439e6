//! Error types for batch assembly.

use std::error::Error;
use std::fmt;

use pointbatch_core::CollateError;

use crate::config::ConfigError;

/// Errors from [`BatchAssembler`](crate::BatchAssembler).
///
/// Any malformed sample aborts the whole batch; there is no partial
/// result.
#[derive(Clone, Debug, PartialEq)]
pub enum AssembleError {
    /// The assembler configuration is invalid.
    Config(ConfigError),
    /// Structural collation failed.
    Collate(CollateError),
    /// A sample has the wrong shape for the selected batching mode.
    ContractViolation {
        /// Fixed description of the expected sample shape.
        message: &'static str,
        /// Position of the offending sample.
        index: usize,
    },
    /// The batch `offset` field cannot be mixed.
    InvalidOffset {
        /// What is wrong with the field.
        reason: String,
    },
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Collate(e) => write!(f, "collate: {e}"),
            Self::ContractViolation { message, index } => {
                write!(f, "sample {index}: {message}")
            }
            Self::InvalidOffset { reason } => write!(f, "cannot mix offsets: {reason}"),
        }
    }
}

impl Error for AssembleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Collate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for AssembleError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CollateError> for AssembleError {
    fn from(e: CollateError) -> Self {
        Self::Collate(e)
    }
}
