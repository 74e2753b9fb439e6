//! The closed value model for per-sample records.
//!
//! A dataset produces one [`Record`] per sample. Record fields are
//! [`Value`]s, a tagged variant over arrays, text, bare scalars, nested
//! sequences and nested records. The collator dispatches on this tag.

use std::fmt;

use indexmap::IndexMap;

use crate::array::Array;

/// Key of the point coordinate field, `[n, 3]`. Its axis 0 is the
/// per-sample point count.
pub const COORD_KEY: &str = "coord";

/// Key of the per-sample boundary field that becomes the batch offsets.
pub const OFFSET_KEY: &str = "offset";

/// A bare scalar sample value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    /// Integer scalar (class index, point count, scene id).
    Int(i64),
    /// Float scalar.
    Float(f32),
}

/// Discriminant of a [`Value`], used in error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Array`].
    Array,
    /// [`Value::Text`].
    Text,
    /// [`Value::Scalar`].
    Scalar,
    /// [`Value::Sequence`].
    Sequence,
    /// [`Value::Mapping`].
    Mapping,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Array => "array",
            Self::Text => "text",
            Self::Scalar => "scalar",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// One field of a sample, or a whole sample.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Dense numeric array, concatenated along axis 0 when batched.
    Array(Array),
    /// Text (scene name, file path), gathered into a sequence when batched.
    Text(String),
    /// Bare scalar, stacked into a rank-1 array when batched.
    Scalar(Scalar),
    /// Positional sequence of values, collated element-wise.
    Sequence(Vec<Value>),
    /// Nested record, collated key-wise.
    Mapping(Record),
}

impl Value {
    /// The variant tag.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Array(_) => ValueKind::Array,
            Self::Text(_) => ValueKind::Text,
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Mapping(_) => ValueKind::Mapping,
        }
    }

    /// Borrow the array payload, if any.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Borrow the scalar payload, if any.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Borrow the sequence payload, if any.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the record payload, if any.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Mapping(r) => Some(r),
            _ => None,
        }
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Self::Array(a)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Self::Mapping(r)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Scalar(Scalar::Int(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Scalar(Scalar::Float(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

/// One sample: an insertion-ordered mapping from field name to value.
///
/// Key order is preserved through collation, so a batch lists its fields
/// in the order the first sample declared them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

/// A collated record. Arrays hold every sample's rows back to back and
/// offset fields hold cumulative sample boundaries.
pub type Batch = Record;

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the previous value for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up a field mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Remove a field, keeping the order of the remaining fields.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// Returns `true` if the field exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow a field as an array.
    pub fn array(&self, key: &str) -> Option<&Array> {
        self.get(key).and_then(Value::as_array)
    }

    /// The coordinate array, if present.
    pub fn coord(&self) -> Option<&Array> {
        self.array(COORD_KEY)
    }

    /// Number of points in this sample, read from the coordinate array.
    pub fn point_count(&self) -> Option<usize> {
        self.coord().map(Array::len)
    }

    /// The offset array, if present.
    pub fn offset(&self) -> Option<&Array> {
        self.array(OFFSET_KEY)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
