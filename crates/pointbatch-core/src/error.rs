//! Error types for array construction and structural collation.
//!
//! [`ArrayError`] covers the dense array primitives (construction,
//! concatenation, checked cumulative sums). [`CollateError`] covers the recursive
//! collator and carries the field path at which the failure happened,
//! written as `$` for the batch root, `$.coord` for a record key and
//! `$[2]` for a sequence position.

use std::error::Error;
use std::fmt;

use crate::array::DType;
use crate::value::ValueKind;

/// Errors from [`Array`](crate::Array) construction and arithmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// The element count does not match the product of the shape.
    ShapeDataMismatch {
        /// The requested shape.
        shape: Vec<usize>,
        /// Number of elements actually supplied.
        len: usize,
    },
    /// Arrays must have at least one axis; axis 0 is the point axis.
    ZeroRank,
    /// Two arrays with different element types were combined.
    DTypeMismatch {
        /// Element type of the first array.
        expected: DType,
        /// Element type of the offending array.
        found: DType,
    },
    /// Two arrays disagree on every axis except axis 0.
    TrailingShapeMismatch {
        /// Trailing shape of the first array.
        expected: Vec<usize>,
        /// Trailing shape of the offending array.
        found: Vec<usize>,
    },
    /// Concatenation or stacking of zero inputs.
    Empty,
    /// Float and integer scalars were stacked together.
    MixedScalars,
    /// An integer running total left the `i64` range.
    Overflow,
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeDataMismatch { shape, len } => {
                write!(f, "shape {shape:?} does not hold {len} elements")
            }
            Self::ZeroRank => write!(f, "arrays must have at least one axis"),
            Self::DTypeMismatch { expected, found } => {
                write!(f, "element type mismatch: expected {expected}, found {found}")
            }
            Self::TrailingShapeMismatch { expected, found } => write!(
                f,
                "trailing shape mismatch: expected {}, found {}",
                trailing(expected),
                trailing(found)
            ),
            Self::Empty => write!(f, "no arrays to combine"),
            Self::MixedScalars => write!(f, "cannot stack integer and float scalars"),
            Self::Overflow => write!(f, "cumulative sum overflows i64"),
        }
    }
}

impl Error for ArrayError {}

fn trailing(dims: &[usize]) -> String {
    let mut out = String::from("[_");
    for d in dims {
        out.push_str(&format!(", {d}"));
    }
    out.push(']');
    out
}

/// Errors from the structural collator.
///
/// Every structural variant names the field path where collation failed
/// so that a malformed sample can be traced back to its dataset schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollateError {
    /// The top-level input was not a sequence of samples.
    NotASequence {
        /// Kind of the value that was passed instead.
        found: ValueKind,
    },
    /// A sequence with zero samples was collated.
    EmptyBatch {
        /// Field path of the empty sequence.
        path: String,
    },
    /// A sample's value kind differs from the first sample's.
    KindMismatch {
        /// Field path being collated.
        path: String,
        /// Kind of the first sample's value.
        expected: ValueKind,
        /// Kind of the offending sample's value.
        found: ValueKind,
        /// Position of the offending sample within the batch.
        index: usize,
    },
    /// A record is missing a key present in the first record.
    MissingKey {
        /// Field path of the record.
        path: String,
        /// The missing key.
        key: String,
        /// Position of the offending sample within the batch.
        index: usize,
    },
    /// A sequence sample has a different length than the first sample.
    LengthMismatch {
        /// Field path of the sequence.
        path: String,
        /// Length of the first sample's sequence.
        expected: usize,
        /// Length of the offending sample's sequence.
        found: usize,
        /// Position of the offending sample within the batch.
        index: usize,
    },
    /// A sequence sample does not start with a coordinate array.
    MissingCoord {
        /// Field path of the sequence.
        path: String,
        /// Position of the offending sample within the batch.
        index: usize,
    },
    /// A registered offset field cannot be turned into boundaries.
    InvalidOffset {
        /// Field path of the offset field.
        path: String,
        /// Description of what is wrong with the field.
        reason: String,
    },
    /// An array primitive failed while merging a field.
    Array {
        /// Field path being merged.
        path: String,
        /// The underlying array error.
        source: ArrayError,
    },
}

impl fmt::Display for CollateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotASequence { found } => {
                write!(f, "{found} is not supported: expected a sequence of samples")
            }
            Self::EmptyBatch { path } => write!(f, "{path}: cannot collate an empty batch"),
            Self::KindMismatch {
                path,
                expected,
                found,
                index,
            } => write!(
                f,
                "{path}: sample {index} is {found}, expected {expected}"
            ),
            Self::MissingKey { path, key, index } => {
                write!(f, "{path}: sample {index} has no key '{key}'")
            }
            Self::LengthMismatch {
                path,
                expected,
                found,
                index,
            } => write!(
                f,
                "{path}: sample {index} has {found} elements, expected {expected}"
            ),
            Self::MissingCoord { path, index } => write!(
                f,
                "{path}: sample {index} does not start with a coordinate array"
            ),
            Self::InvalidOffset { path, reason } => {
                write!(f, "{path}: invalid offset field: {reason}")
            }
            Self::Array { path, source } => write!(f, "{path}: {source}"),
        }
    }
}

impl Error for CollateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Array { source, .. } => Some(source),
            _ => None,
        }
    }
}
