//! The recursive, kind-dispatched collator.
//!
//! Dispatch is on the kind of the first sample; every other sample must
//! have the same kind. Recursion depth equals the nesting depth of the
//! sample schema.

use pointbatch_core::{Array, Batch, CollateError, DType, OffsetFields, Record, Value};
use tracing::trace;

/// Field path of the batch root in error messages.
pub const ROOT_PATH: &str = "$";

/// Merges per-sample values into batched values.
///
/// The collator is stateless apart from its offset schema and may be
/// shared across threads.
#[derive(Clone, Debug, Default)]
pub struct Collator {
    offsets: OffsetFields,
}

/// Collate a sequence of samples with the default offset schema.
///
/// Shorthand for `Collator::default().collate(samples)`.
pub fn collate(samples: &[Value]) -> Result<Value, CollateError> {
    Collator::default().collate(samples)
}

impl Collator {
    /// Create a collator that cumulates the given offset fields.
    pub fn new(offsets: OffsetFields) -> Self {
        Self { offsets }
    }

    /// The offset schema.
    pub fn offsets(&self) -> &OffsetFields {
        &self.offsets
    }

    /// Collate a value that must be a sequence of samples.
    ///
    /// # Errors
    ///
    /// [`CollateError::NotASequence`] if `batch` is not a
    /// [`Value::Sequence`], plus every error of [`Collator::collate`].
    pub fn collate_value(&self, batch: &Value) -> Result<Value, CollateError> {
        match batch {
            Value::Sequence(samples) => self.collate(samples),
            other => Err(CollateError::NotASequence {
                found: other.kind(),
            }),
        }
    }

    /// Collate an ordered, non-empty sequence of same-shaped samples.
    pub fn collate(&self, samples: &[Value]) -> Result<Value, CollateError> {
        let refs: Vec<&Value> = samples.iter().collect();
        trace!(samples = refs.len(), "collating values");
        self.merge(&refs, ROOT_PATH)
    }

    /// Collate records into one batch record.
    pub fn collate_records(&self, records: &[Record]) -> Result<Batch, CollateError> {
        let refs: Vec<&Record> = records.iter().collect();
        self.collate_record_refs(&refs)
    }

    /// Collate borrowed records into one batch record.
    pub fn collate_record_refs(&self, records: &[&Record]) -> Result<Batch, CollateError> {
        trace!(samples = records.len(), "collating records");
        self.merge_records(records, ROOT_PATH)
    }

    fn merge(&self, items: &[&Value], path: &str) -> Result<Value, CollateError> {
        let first = *items.first().ok_or_else(|| CollateError::EmptyBatch {
            path: path.to_owned(),
        })?;

        let expected = first.kind();
        if let Some((index, other)) = items
            .iter()
            .enumerate()
            .find(|(_, v)| v.kind() != expected)
        {
            return Err(CollateError::KindMismatch {
                path: path.to_owned(),
                expected,
                found: other.kind(),
                index,
            });
        }

        match first {
            Value::Array(_) => {
                Array::concat(items.iter().filter_map(|v| v.as_array()))
                    .map(Value::Array)
                    .map_err(|source| CollateError::Array {
                        path: path.to_owned(),
                        source,
                    })
            }
            // Text would otherwise look like a sequence of characters; it
            // is gathered as-is.
            Value::Text(_) => Ok(Value::Sequence(
                items.iter().map(|v| (*v).clone()).collect(),
            )),
            Value::Scalar(_) => {
                let scalars: Vec<_> = items.iter().filter_map(|v| v.as_scalar()).collect();
                Array::stack_scalars(&scalars)
                    .map(Value::Array)
                    .map_err(|source| CollateError::Array {
                        path: path.to_owned(),
                        source,
                    })
            }
            Value::Sequence(_) => self.merge_sequences(items, path).map(Value::Sequence),
            Value::Mapping(_) => {
                let records: Vec<&Record> = items.iter().filter_map(|v| v.as_record()).collect();
                self.merge_records(&records, path).map(Value::Mapping)
            }
        }
    }

    /// Position-wise merge. Each sample's first element is its coordinate
    /// array; the cumulative point counts are appended as a final element.
    fn merge_sequences(&self, items: &[&Value], path: &str) -> Result<Vec<Value>, CollateError> {
        let seqs: Vec<&[Value]> = items.iter().filter_map(|v| v.as_sequence()).collect();
        let width = seqs.first().map_or(0, |s| s.len());

        let mut counts = Vec::with_capacity(seqs.len());
        for (index, seq) in seqs.iter().enumerate() {
            if seq.len() != width {
                return Err(CollateError::LengthMismatch {
                    path: path.to_owned(),
                    expected: width,
                    found: seq.len(),
                    index,
                });
            }
            let coord = seq
                .first()
                .and_then(Value::as_array)
                .ok_or_else(|| CollateError::MissingCoord {
                    path: path.to_owned(),
                    index,
                })?;
            counts.push(coord.len() as i64);
        }

        let mut out = Vec::with_capacity(width + 1);
        for position in 0..width {
            let column: Vec<&Value> = seqs.iter().map(|s| &s[position]).collect();
            out.push(self.merge(&column, &format!("{path}[{position}]"))?);
        }
        let offsets = Array::vector_i64(counts)
            .cumsum()
            .map_err(|source| CollateError::Array {
                path: path.to_owned(),
                source,
            })?;
        out.push(Value::Array(offsets));
        Ok(out)
    }

    /// Key-wise merge over the first record's keys, in its order.
    fn merge_records(&self, records: &[&Record], path: &str) -> Result<Record, CollateError> {
        let first = *records.first().ok_or_else(|| CollateError::EmptyBatch {
            path: path.to_owned(),
        })?;

        let mut out = Record::new();
        for key in first.keys() {
            let field_path = format!("{path}.{key}");
            let mut column = Vec::with_capacity(records.len());
            for (index, record) in records.iter().enumerate() {
                let value = record.get(key).ok_or_else(|| CollateError::MissingKey {
                    path: path.to_owned(),
                    key: key.to_owned(),
                    index,
                })?;
                column.push(value);
            }

            let mut merged = self.merge(&column, &field_path)?;
            if self.offsets.contains(key) {
                merged = cumulate_offsets(merged, &field_path)?;
            }
            out.insert(key, merged);
        }
        Ok(out)
    }
}

/// Turn concatenated per-sample counts into cumulative boundaries.
fn cumulate_offsets(merged: Value, path: &str) -> Result<Value, CollateError> {
    match merged {
        Value::Array(counts) if counts.dtype() == DType::I64 => counts
            .cumsum()
            .map(Value::Array)
            .map_err(|source| CollateError::Array {
                path: path.to_owned(),
                source,
            }),
        Value::Array(counts) => Err(CollateError::InvalidOffset {
            path: path.to_owned(),
            reason: format!("expected integer counts, found {}", counts.dtype()),
        }),
        other => Err(CollateError::InvalidOffset {
            path: path.to_owned(),
            reason: format!("expected an array of counts, found {}", other.kind()),
        }),
    }
}
