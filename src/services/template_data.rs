//! Collector template data builder.
//!
//! Entry point for the reconciler: reads the `Monitoring` instance from the
//! request, assembles its custom exporters and fills in the other keys the
//! collector template expects. Assembly errors are returned unchanged.

use std::collections::HashMap;

use tracing::instrument;

use crate::config::TemplateDefaults;
use crate::models::{Metrics, Traces};
use crate::reconcile::{ReconcileContext, ReconciliationRequest, enter_reconcile_context};
use crate::rendering::TemplateData;
use crate::services::assembler::ExporterAssembler;
use crate::{Error, Result};

/// Builds template data for the collector configuration.
#[derive(Debug, Clone, Default)]
pub struct TemplateDataBuilder {
    assembler: ExporterAssembler,
    defaults: TemplateDefaults,
}

impl TemplateDataBuilder {
    /// Creates a builder with the default assembler and fallback values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback values for unset resource fields.
    #[must_use]
    pub fn with_defaults(mut self, defaults: TemplateDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Sets the exporter assembler.
    #[must_use]
    pub const fn with_assembler(mut self, assembler: ExporterAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Builds the template data for one reconciliation.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if `ctx` was cancelled; no assembly is attempted.
    /// - [`Error::ReservedName`] or [`Error::InvalidYaml`] from exporter assembly.
    #[instrument(
        skip(self, ctx, request),
        fields(reconcile_id = %ctx.reconcile_id(), monitoring = %request.monitoring().metadata.name)
    )]
    pub fn build(
        &self,
        ctx: &ReconcileContext,
        request: &ReconciliationRequest,
    ) -> Result<TemplateData> {
        if ctx.is_cancelled() {
            tracing::debug!("Reconciliation cancelled, skipping template data");
            return Err(Error::Cancelled {
                reconcile_id: ctx.reconcile_id().to_string(),
            });
        }

        let _context = enter_reconcile_context(ctx.clone());
        let spec = &request.monitoring().spec.common;
        let no_exporters = HashMap::new();
        let sources = request
            .monitoring()
            .metrics_exporters()
            .unwrap_or(&no_exporters);
        let exporters = self.assembler.assemble(sources)?;

        let mut data = TemplateData::new();
        data.set("Namespace", spec.namespace.as_str());
        data.set("Metrics", spec.metrics.is_some());
        data.set("Traces", spec.traces.is_some());
        if let Some(metrics) = &spec.metrics {
            self.set_metrics_keys(&mut data, metrics);
        }
        if let Some(traces) = &spec.traces {
            self.set_traces_keys(&mut data, traces);
        }
        data.merge_exporters(exporters);

        tracing::info!(keys = data.len(), "Built collector template data");
        Ok(data)
    }

    fn set_metrics_keys(&self, data: &mut TemplateData, metrics: &Metrics) {
        let d = &self.defaults;
        let storage = metrics.storage.as_ref();
        let resources = metrics.resources.as_ref();

        data.set(
            "Replicas",
            metrics.replicas.map_or(d.replicas, i64::from),
        );
        data.set(
            "StorageSize",
            or_default(storage.and_then(|s| s.size.as_deref()), &d.storage_size),
        );
        data.set(
            "StorageRetention",
            or_default(storage.and_then(|s| s.retention.as_deref()), &d.storage_retention),
        );
        data.set(
            "CPULimit",
            or_default(resources.and_then(|r| r.cpu_limit.as_deref()), &d.cpu_limit),
        );
        data.set(
            "MemoryLimit",
            or_default(resources.and_then(|r| r.memory_limit.as_deref()), &d.memory_limit),
        );
        data.set(
            "CPURequest",
            or_default(resources.and_then(|r| r.cpu_request.as_deref()), &d.cpu_request),
        );
        data.set(
            "MemoryRequest",
            or_default(resources.and_then(|r| r.memory_request.as_deref()), &d.memory_request),
        );
    }

    fn set_traces_keys(&self, data: &mut TemplateData, traces: &Traces) {
        let d = &self.defaults;
        let backend = traces
            .storage
            .backend
            .map_or_else(|| d.traces_backend.clone(), |b| b.as_str().to_string());

        data.set("TracesBackend", backend);
        data.set(
            "TracesRetention",
            or_default(traces.storage.retention.as_deref(), &d.traces_retention),
        );
        data.set(
            "SampleRatio",
            or_default(traces.sample_ratio.as_deref(), &d.sample_ratio),
        );
    }
}

fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Builds template data with the default builder.
///
/// # Errors
///
/// See [`TemplateDataBuilder::build`].
pub fn get_template_data(
    ctx: &ReconcileContext,
    request: &ReconciliationRequest,
) -> Result<TemplateData> {
    TemplateDataBuilder::new().build(ctx, request)
}
