//! Custom metrics exporter assembly.
//!
//! Turns the `exporters` map of a `Monitoring` resource into the two views the
//! collector template consumes:
//!
//! - `exporters`: exporter name to parsed configuration
//! - `exporter_names`: the same names as a list
//!
//! Assembly is all-or-nothing. Every name is checked against the reserved set
//! before any fragment is parsed, so a reserved name is reported even when
//! another fragment is also malformed. Within each pass the first failure
//! aborts the call and nothing is returned.

use std::collections::HashMap;

use tracing::instrument;

use crate::models::StructuredValue;
use crate::reconcile::current_reconcile_id;
use crate::services::parser::parse_fragment;
use crate::services::reserved::ReservedNames;
use crate::{Error, Result};

/// Validated exporter data for the collector template.
///
/// `exporter_names` holds exactly the keys of `exporters`. Its order follows
/// the input map and carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExporterTemplateData {
    /// Exporter name to parsed configuration.
    pub exporters: HashMap<String, StructuredValue>,
    /// Exporter names, in no particular order.
    pub exporter_names: Vec<String>,
}

impl ExporterTemplateData {
    /// Returns the number of exporters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    /// Returns true if no exporters were configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }

    /// Returns the parsed configuration of an exporter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StructuredValue> {
        self.exporters.get(name)
    }

    /// Splits the data into its mapping and name list.
    #[must_use]
    pub fn into_parts(self) -> (HashMap<String, StructuredValue>, Vec<String>) {
        (self.exporters, self.exporter_names)
    }
}

/// Assembles custom metrics exporters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExporterAssembler {
    reserved: ReservedNames,
}

impl ExporterAssembler {
    /// Creates an assembler guarding the system reserved names.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reserved: ReservedNames::system(),
        }
    }

    /// Creates an assembler guarding a specific reserved name set.
    #[must_use]
    pub const fn with_reserved(reserved: ReservedNames) -> Self {
        Self { reserved }
    }

    /// Returns the reserved name set this assembler enforces.
    #[must_use]
    pub const fn reserved(&self) -> &ReservedNames {
        &self.reserved
    }

    /// Validates and parses every exporter.
    ///
    /// An empty map is a normal, successful input and yields empty views.
    ///
    /// # Errors
    ///
    /// - [`Error::ReservedName`] if any exporter uses a reserved name.
    /// - [`Error::InvalidYaml`] if any fragment is not well-formed YAML.
    #[instrument(
        skip(self, sources),
        fields(exporters = sources.len(), reconcile_id = tracing::field::Empty)
    )]
    pub fn assemble(&self, sources: &HashMap<String, String>) -> Result<ExporterTemplateData> {
        record_reconcile_id();
        if let Some(name) = sources.keys().find(|name| self.reserved.contains(name)) {
            metrics::counter!("exporter_assembly_total", "status" => "reserved_name").increment(1);
            tracing::debug!(exporter = %name, "Rejected reserved exporter name");
            return Err(Error::ReservedName { name: name.clone() });
        }

        let mut exporters = HashMap::with_capacity(sources.len());
        let mut exporter_names = Vec::with_capacity(sources.len());

        for (name, raw) in sources {
            let value = parse_fragment(raw).map_err(|source| {
                metrics::counter!("exporter_assembly_total", "status" => "invalid_yaml")
                    .increment(1);
                tracing::debug!(exporter = %name, error = %source, "Rejected malformed exporter");
                Error::InvalidYaml {
                    exporter: name.clone(),
                    source,
                }
            })?;
            exporters.insert(name.clone(), value);
            exporter_names.push(name.clone());
        }

        metrics::counter!("exporter_assembly_total", "status" => "success").increment(1);
        tracing::debug!(count = exporter_names.len(), "Assembled custom metrics exporters");

        Ok(ExporterTemplateData {
            exporters,
            exporter_names,
        })
    }

    /// Reports every problem in `sources` instead of stopping at the first.
    ///
    /// Reserved-name errors are reported without parsing that exporter's
    /// fragment. Results are sorted by exporter name. An empty result means
    /// [`Self::assemble`] would succeed.
    #[must_use]
    #[instrument(
        skip(self, sources),
        fields(exporters = sources.len(), reconcile_id = tracing::field::Empty)
    )]
    pub fn diagnose(&self, sources: &HashMap<String, String>) -> Vec<Error> {
        record_reconcile_id();
        let mut entries: Vec<_> = sources.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        entries
            .into_iter()
            .filter_map(|(name, raw)| {
                if let Err(e) = self.reserved.check(name) {
                    return Some(e);
                }
                parse_fragment(raw).err().map(|source| Error::InvalidYaml {
                    exporter: name.clone(),
                    source,
                })
            })
            .collect()
    }
}

/// Tags the current span with the ambient reconciliation id, if any.
fn record_reconcile_id() {
    if let Some(reconcile_id) = current_reconcile_id() {
        tracing::Span::current().record("reconcile_id", reconcile_id.as_str());
    }
}
