//! Test utilities for pointbatch development.

pub mod fixtures;

pub use fixtures::{
    counted_records, counted_values, named_point_record, point_record, point_records,
    record_values,
};
