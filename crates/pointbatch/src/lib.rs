//! pointbatch: batch assembly for point-cloud learning pipelines.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all pointbatch sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use pointbatch::prelude::*;
//!
//! let sample = |points: usize| {
//!     Record::new()
//!         .with("coord", Array::from_f32(&[points, 3], vec![0.0; points * 3]).unwrap())
//!         .with("offset", Array::vector_i64(vec![points as i64]))
//! };
//!
//! // Static batch: arrays concatenated, offsets cumulated.
//! let mut assembler = BatchAssembler::new(AssemblerConfig::default()).unwrap();
//! let batch = assembler.assemble_records(&[sample(3), sample(5)]).unwrap();
//! assert_eq!(batch.coord().unwrap().len(), 8);
//! assert_eq!(batch.offset().unwrap().as_i64().unwrap(), &[3, 8]);
//!
//! // Dynamic batching under a 6-point budget, largest samples first.
//! let config = AssemblerConfig {
//!     dynamic_batching: true,
//!     max_points_per_batch: 6,
//!     ..Default::default()
//! };
//! let mut assembler = BatchAssembler::new(config).unwrap();
//! let samples: Vec<_> = [5, 4, 3, 2, 1].into_iter().map(|n| (sample(n), n)).collect();
//! let sub_batches = assembler.assemble_dynamic(&samples).unwrap();
//! assert_eq!(sub_batches.len(), 3);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `pointbatch-core` | `Value`, `Record`, `Array`, errors, Gaussian kernel |
//! | [`collate`] | `pointbatch-collate` | Recursive structural collator |
//! | [`assemble`] | `pointbatch-assemble` | Batch assembler, dynamic packing, Mix3D |
//! | [`loader`] | `pointbatch-loader` | Threaded collate worker pool |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Value model, arrays, offset schema, errors, kernel (`pointbatch-core`).
pub use pointbatch_core as types;

/// Recursive structural collation (`pointbatch-collate`).
pub use pointbatch_collate as collate;

/// Batch assembly with dynamic packing and Mix3D (`pointbatch-assemble`).
pub use pointbatch_assemble as assemble;

/// Threaded collate worker pool (`pointbatch-loader`).
pub use pointbatch_loader as loader;

/// Common imports for typical pointbatch usage.
///
/// ```rust
/// use pointbatch::prelude::*;
/// ```
pub mod prelude {
    // Value model
    pub use pointbatch_core::{
        Array, Batch, DType, GaussianKernel, OffsetFields, Record, Scalar, Value, ValueKind,
    };

    // Errors
    pub use pointbatch_assemble::{AssembleError, ConfigError};
    pub use pointbatch_core::{ArrayError, CollateError};
    pub use pointbatch_loader::{PoolError, TaskError};

    // Collation and assembly
    pub use pointbatch_assemble::{Assembled, AssemblerConfig, BatchAssembler};
    pub use pointbatch_collate::Collator;

    // Worker pool
    pub use pointbatch_loader::{CollatePool, Completed, PoolConfig, Ticket};
}
