//! Batch assembly for point-cloud training pipelines.
//!
//! [`BatchAssembler`] wraps the structural collator with two optional
//! stages:
//!
//! - **Dynamic batching**: samples are packed largest-first into
//!   sub-batches whose total point count stays under a budget
//!   ([`pack_by_point_budget`]).
//! - **Mix3D**: with probability `mix_prob`, adjacent sample boundaries
//!   in the batch `offset` field are merged pairwise
//!   ([`mix3d_offsets`]), so the model sees pairs of scenes as one.
//!
//! The random source is owned by the assembler and seeded from
//! [`AssemblerConfig::seed`] unless injected with
//! [`BatchAssembler::with_rng`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assembler;
pub mod config;
pub mod error;
pub mod mix;
pub mod packing;

pub use assembler::{Assembled, BatchAssembler, PAIR_CONTRACT, RECORD_CONTRACT};
pub use config::{AssemblerConfig, ConfigError, DEFAULT_MAX_POINTS_PER_BATCH};
pub use error::AssembleError;
pub use mix::{mix3d_offsets, mix_offset_array};
pub use packing::{pack_by_point_budget, PackedGroup};
