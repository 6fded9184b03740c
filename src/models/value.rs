//! Structured values parsed from exporter fragments.
//!
//! Fragments are arbitrarily shaped YAML. Rather than handing the renderer an
//! opaque dynamic value, every fragment is normalised into the closed
//! [`StructuredValue`] sum type so consumers can match on it exhaustively.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A parsed exporter configuration value.
///
/// Serializes untagged, so a value renders as the plain JSON/YAML it came from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredValue {
    /// An explicit null (`~`, `null`).
    #[default]
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// An integer scalar that fits in `i64`.
    Integer(i64),
    /// Any other numeric scalar.
    Float(f64),
    /// A string scalar.
    String(String),
    /// An ordered sequence.
    Sequence(Vec<StructuredValue>),
    /// A string-keyed mapping.
    Mapping(BTreeMap<String, StructuredValue>),
}

impl StructuredValue {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn empty_mapping() -> Self {
        Self::Mapping(BTreeMap::new())
    }

    /// Returns the kind of this value, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Returns true if the value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as a string slice, or None if not a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a bool, or None if not a bool.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an `i64`, or None if not an integer.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an `f64`. Integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a sequence, or None if not a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the value as a mapping, or None if not a mapping.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a key when the value is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_mapping().and_then(|map| map.get(key))
    }
}

impl fmt::Display for StructuredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str(self.kind()),
        }
    }
}

impl From<&str> for StructuredValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for StructuredValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for StructuredValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for StructuredValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for StructuredValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Vec<Self>> for StructuredValue {
    fn from(items: Vec<Self>) -> Self {
        Self::Sequence(items)
    }
}

impl From<BTreeMap<String, Self>> for StructuredValue {
    fn from(map: BTreeMap<String, Self>) -> Self {
        Self::Mapping(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Self)> for StructuredValue {
    fn from_iter<I: IntoIterator<Item = (K, Self)>>(iter: I) -> Self {
        Self::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl FromIterator<Self> for StructuredValue {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        Self::Sequence(iter.into_iter().collect())
    }
}
