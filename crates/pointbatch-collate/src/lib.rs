//! Structural collation of point-cloud samples.
//!
//! The [`Collator`] merges an ordered sequence of same-shaped sample
//! values into one batched value of the same shape:
//!
//! - arrays are concatenated along the point axis;
//! - text is gathered into a sequence;
//! - bare scalars are stacked into a rank-1 array;
//! - sequences are collated position-wise, with one extra trailing
//!   element holding the cumulative per-sample point counts;
//! - records are collated key-wise, and every registered offset field
//!   is replaced by its cumulative sum.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collator;

pub use collator::{collate, Collator, ROOT_PATH};
