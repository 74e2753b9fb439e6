//! Core types for the pointbatch collation framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! value model that per-sample point-cloud records are expressed in, the
//! dense [`Array`] type, the explicit [`OffsetFields`] schema, the error
//! types shared by the collator and assembler, and the Gaussian distance
//! kernel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod error;
pub mod kernel;
pub mod schema;
pub mod value;

pub use array::{Array, ArrayData, DType, Shape};
pub use error::{ArrayError, CollateError};
pub use kernel::GaussianKernel;
pub use schema::OffsetFields;
pub use value::{Batch, Record, Scalar, Value, ValueKind, COORD_KEY, OFFSET_KEY};
