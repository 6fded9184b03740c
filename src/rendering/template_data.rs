//! Template data aggregate.
//!
//! The string-keyed bag of values handed to the collector configuration
//! renderer. Exporter data lives next to unrelated keys such as `Namespace`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

use crate::models::StructuredValue;
use crate::services::ExporterTemplateData;
use crate::{Error, Result};

/// Key holding the exporter name to configuration mapping.
pub const CUSTOM_METRICS_EXPORTERS_KEY: &str = "CustomMetricsExporters";

/// Key holding the list of exporter names.
pub const CUSTOM_METRICS_EXPORTER_NAMES_KEY: &str = "CustomMetricsExporterNames";

/// A value that can be handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A simple string value.
    String(String),
    /// A list of names.
    List(Vec<String>),
    /// Exporter name to parsed configuration.
    Exporters(HashMap<String, StructuredValue>),
}

impl TemplateValue {
    /// Creates a string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Returns the value as a string, or None if not a string.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
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

    /// Returns the value as an integer, or None if not an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a list, or None if not a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the value as an exporter mapping, or None if not one.
    #[must_use]
    pub const fn as_exporters(&self) -> Option<&HashMap<String, StructuredValue>> {
        match self {
            Self::Exporters(e) => Some(e),
            _ => None,
        }
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<bool> for TemplateValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for TemplateValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<Vec<String>> for TemplateValue {
    fn from(l: Vec<String>) -> Self {
        Self::List(l)
    }
}

/// Template data passed to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateData {
    values: HashMap<String, TemplateValue>,
}

impl TemplateData {
    /// Creates empty template data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any previous value under the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<TemplateValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Merges assembled exporters under the two well-known keys.
    pub fn merge_exporters(&mut self, data: ExporterTemplateData) {
        let (exporters, names) = data.into_parts();
        self.values.insert(
            CUSTOM_METRICS_EXPORTERS_KEY.to_string(),
            TemplateValue::Exporters(exporters),
        );
        self.values.insert(
            CUSTOM_METRICS_EXPORTER_NAMES_KEY.to_string(),
            TemplateValue::List(names),
        );
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.values.get(key)
    }

    /// Gets a string value.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(TemplateValue::as_string)
    }

    /// Gets a bool value.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(TemplateValue::as_bool)
    }

    /// Gets an integer value.
    #[must_use]
    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(TemplateValue::as_integer)
    }

    /// Gets a list value.
    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).and_then(TemplateValue::as_list)
    }

    /// Returns the assembled custom exporters, if merged.
    #[must_use]
    pub fn custom_exporters(&self) -> Option<&HashMap<String, StructuredValue>> {
        self.values
            .get(CUSTOM_METRICS_EXPORTERS_KEY)
            .and_then(TemplateValue::as_exporters)
    }

    /// Returns the assembled custom exporter names, if merged.
    #[must_use]
    pub fn custom_exporter_names(&self) -> Option<&[String]> {
        self.get_list(CUSTOM_METRICS_EXPORTER_NAMES_KEY)
    }

    /// Checks if a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys.into_iter()
    }

    /// Renders the data as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::OperationFailed {
            operation: "json_conversion".to_string(),
            cause: e.to_string(),
        })
    }

    /// Renders the data as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| Error::OperationFailed {
            operation: "yaml_conversion".to_string(),
            cause: e.to_string(),
        })
    }
}

/// Serializes with keys sorted, including the exporter names inside
/// `CustomMetricsExporters`, so rendered output is stable across runs.
/// The exporter name list keeps its assembled order.
impl Serialize for TemplateData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for key in self.keys() {
            match self.values.get(key) {
                Some(TemplateValue::Exporters(exporters)) => {
                    let sorted: BTreeMap<&String, &StructuredValue> = exporters.iter().collect();
                    map.serialize_entry(key, &sorted)?;
                },
                Some(value) => map.serialize_entry(key, value)?,
                None => {},
            }
        }
        map.end()
    }
}
