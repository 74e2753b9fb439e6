//! Explicit tagging of offset-bearing record fields.
//!
//! A field is cumulated into sample boundaries only if its key is
//! registered here. Key matching is exact: `"grid_offset_scale"` is an
//! ordinary field unless it is registered by name.

use indexmap::IndexSet;

use crate::value::OFFSET_KEY;

/// The set of record keys whose collated values are replaced by their
/// cumulative sum.
///
/// Defaults to `{"offset"}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetFields {
    keys: IndexSet<String>,
}

impl OffsetFields {
    /// A schema with no offset fields.
    pub fn none() -> Self {
        Self {
            keys: IndexSet::new(),
        }
    }

    /// Register an additional offset key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    /// Returns `true` if `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Registered keys in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no key is registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for OffsetFields {
    fn default() -> Self {
        Self::none().with_key(OFFSET_KEY)
    }
}

impl<S: Into<String>> FromIterator<S> for OffsetFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}
