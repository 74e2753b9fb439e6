//! Threaded batch assembly for training loops.
//!
//! [`CollatePool`] runs [`BatchAssembler`](pointbatch_assemble::BatchAssembler)s
//! on a fixed set of worker threads. Raw sample batches go in through a
//! bounded crossbeam channel; assembled batches come back in submission
//! order. Each task is assembled with an RNG seeded from
//! `seed ^ ticket`, so the mixing decision for a given batch does not
//! depend on which worker ran it. A panic during assembly is caught and
//! reported for its ticket; the worker carries on with the next task.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod pool;

pub use config::{PoolConfig, PoolError, TaskError};
pub use pool::{CollatePool, Completed, Ticket};
