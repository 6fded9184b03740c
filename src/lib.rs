//! # Monitoring Synth
//!
//! Validates user-supplied metrics exporter fragments and builds the template
//! data consumed by the collector configuration renderer.
//!
//! Each entry of a `Monitoring` resource's `spec.metrics.exporters` maps an
//! exporter name to a raw YAML fragment. Assembly guards the names the
//! monitoring service owns itself, parses every fragment into a
//! [`StructuredValue`], and produces two views that always agree: a keyed
//! mapping and a name list.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use monitoring_synth::services::ExporterAssembler;
//!
//! let mut sources = HashMap::new();
//! sources.insert("logging".to_string(), "loglevel: debug".to_string());
//!
//! let data = ExporterAssembler::new().assemble(&sources)?;
//! assert_eq!(data.exporter_names, vec!["logging".to_string()]);
//! # Ok::<(), monitoring_synth::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod models;
pub mod observability;
pub mod reconcile;
pub mod rendering;
pub mod services;

pub use config::{SynthConfig, TemplateDefaults};
pub use models::{Monitoring, StructuredValue};
pub use reconcile::{ReconcileContext, ReconciliationRequest};
pub use rendering::{TemplateData, TemplateValue};
pub use services::{
    ExporterAssembler, ExporterTemplateData, ReservedNames, SyntaxError, TemplateDataBuilder,
    get_template_data, parse_fragment,
};

/// Error type for exporter assembly and template data operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `ReservedName` | An exporter uses a name the monitoring service manages itself |
/// | `InvalidYaml` | An exporter fragment is not well-formed YAML |
/// | `Cancelled` | The reconciliation was cancelled before assembly started |
/// | `InvalidInput` | A `Monitoring` manifest or CLI argument is malformed |
/// | `OperationFailed` | File I/O, config parsing or logging setup fails |
#[derive(Debug, ThisError)]
pub enum Error {
    /// An exporter name collides with a reserved, system-managed exporter.
    ///
    /// Not retryable: the user must rename or remove the entry.
    #[error("exporter name '{name}' is reserved and cannot be used")]
    ReservedName {
        /// The offending exporter name.
        name: String,
    },

    /// An exporter fragment failed to parse.
    ///
    /// The display string always contains `invalid YAML` followed by the
    /// parser diagnostic, including the location when known.
    #[error("exporter '{exporter}': {source}")]
    InvalidYaml {
        /// The exporter whose fragment is malformed.
        exporter: String,
        /// The underlying syntax failure.
        #[source]
        source: SyntaxError,
    },

    /// The reconciliation context was cancelled.
    #[error("reconciliation '{reconcile_id}' cancelled before exporter assembly")]
    Cancelled {
        /// Correlation ID of the cancelled reconciliation.
        reconcile_id: String,
    },

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A `Monitoring` manifest cannot be deserialized
    /// - A CLI option has an unsupported value
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - A configuration or manifest file cannot be read
    /// - A TOML configuration file cannot be parsed
    /// - Logging cannot be initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns true if this error is a reserved-name conflict.
    #[must_use]
    pub const fn is_reserved_name(&self) -> bool {
        matches!(self, Self::ReservedName { .. })
    }

    /// Returns true if this error is a fragment syntax failure.
    #[must_use]
    pub const fn is_invalid_yaml(&self) -> bool {
        matches!(self, Self::InvalidYaml { .. })
    }

    /// Returns the exporter this error refers to, if any.
    #[must_use]
    pub fn exporter(&self) -> Option<&str> {
        match self {
            Self::ReservedName { name } => Some(name),
            Self::InvalidYaml { exporter, .. } => Some(exporter),
            _ => None,
        }
    }
}

/// Result type alias for monitoring synth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ReservedName {
            name: "prometheus".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "exporter name 'prometheus' is reserved and cannot be used"
        );

        let err = Error::InvalidInput("bad manifest".to_string());
        assert_eq!(err.to_string(), "invalid input: bad manifest");

        let err = Error::OperationFailed {
            operation: "read_manifest".to_string(),
            cause: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'read_manifest' failed: not found");
    }

    #[test]
    fn test_invalid_yaml_display_and_source() {
        use std::error::Error as _;

        let err = Error::InvalidYaml {
            exporter: "logging".to_string(),
            source: SyntaxError::new("unexpected end of stream", None),
        };
        let message = err.to_string();
        assert!(message.contains("invalid YAML"));
        assert!(message.contains("'logging'"));
        assert!(message.contains("unexpected end of stream"));
        assert!(err.source().is_some());
        assert_eq!(err.exporter(), Some("logging"));
        assert!(err.is_invalid_yaml());
        assert!(!err.is_reserved_name());
    }
}
