//! Exporter fragment parser.
//!
//! Parses one raw YAML fragment into a [`StructuredValue`]. Any well-formed
//! single document is accepted, including bare scalars. A blank document
//! (whitespace, comments and document markers only) always yields an empty
//! mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde_yaml_ng::Value as YamlValue;
use thiserror::Error as ThisError;

use crate::models::StructuredValue;

/// Position of a syntax failure inside a fragment (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxLocation {
    /// Line number.
    pub line: usize,
    /// Column number.
    pub column: usize,
}

impl fmt::Display for SyntaxLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// A fragment that is not well-formed YAML.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("invalid YAML: {detail}")]
pub struct SyntaxError {
    detail: String,
    location: Option<SyntaxLocation>,
}

impl SyntaxError {
    /// Creates a syntax error from a diagnostic message.
    #[must_use]
    pub fn new(detail: impl Into<String>, location: Option<SyntaxLocation>) -> Self {
        Self {
            detail: detail.into(),
            location,
        }
    }

    /// Returns the underlying parser diagnostic.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns where the failure was detected, when the parser reported it.
    #[must_use]
    pub const fn location(&self) -> Option<SyntaxLocation> {
        self.location
    }
}

impl From<serde_yaml_ng::Error> for SyntaxError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        let location = e.location().map(|loc| SyntaxLocation {
            line: loc.line(),
            column: loc.column(),
        });
        Self::new(e.to_string(), location)
    }
}

/// Parses a raw exporter fragment.
///
/// # Errors
///
/// Returns a [`SyntaxError`] if the fragment is malformed, holds more than
/// one document, or uses a sequence or mapping as a mapping key.
pub fn parse_fragment(raw: &str) -> Result<StructuredValue, SyntaxError> {
    if is_blank_document(raw) {
        return Ok(StructuredValue::empty_mapping());
    }

    let value: YamlValue = serde_yaml_ng::from_str(raw)?;
    convert(value)
}

/// Returns true if the text holds no YAML content at all.
///
/// Directive lines (`%YAML`, `%TAG`) only count as blank when a `---`
/// marker follows them; a dangling directive is left for the parser to
/// reject.
fn is_blank_document(raw: &str) -> bool {
    let mut dangling_directive = false;
    for line in raw.lines().map(|line| strip_comment(line).trim()) {
        match line {
            "" | "..." => {},
            "---" => dangling_directive = false,
            _ if line.starts_with('%') => dangling_directive = true,
            _ => return false,
        }
    }
    !dangling_directive
}

/// Drops a trailing `#` comment. A `#` only starts a comment at the start
/// of a line or after whitespace.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let start = bytes
        .iter()
        .enumerate()
        .find(|&(i, &b)| b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()))
        .map_or(line.len(), |(i, _)| i);
    &line[..start]
}

/// Converts a parsed YAML value into a [`StructuredValue`].
fn convert(value: YamlValue) -> Result<StructuredValue, SyntaxError> {
    Ok(match value {
        YamlValue::Null => StructuredValue::Null,
        YamlValue::Bool(b) => StructuredValue::Bool(b),
        YamlValue::Number(n) => convert_number(&n),
        YamlValue::String(s) => StructuredValue::String(s),
        YamlValue::Sequence(items) => StructuredValue::Sequence(
            items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = BTreeMap::new();
            for (key, value) in mapping {
                let key = convert_key(key)?;
                if map.contains_key(&key) {
                    return Err(SyntaxError::new(
                        format!("duplicate mapping key '{key}'"),
                        None,
                    ));
                }
                map.insert(key, convert(value)?);
            }
            StructuredValue::Mapping(map)
        },
        YamlValue::Tagged(tagged) => convert(tagged.value)?,
    })
}

#[allow(clippy::cast_precision_loss)]
fn convert_number(n: &serde_yaml_ng::Number) -> StructuredValue {
    if let Some(i) = n.as_i64() {
        StructuredValue::Integer(i)
    } else if let Some(u) = n.as_u64() {
        StructuredValue::Float(u as f64)
    } else {
        StructuredValue::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Stringifies a scalar mapping key.
fn convert_key(key: YamlValue) -> Result<String, SyntaxError> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => convert_key(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(SyntaxError::new(
            "non-scalar mapping key is not supported",
            None,
        )),
    }
}
