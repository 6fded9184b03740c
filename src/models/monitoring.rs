//! Typed `Monitoring` custom resource.
//!
//! Only the fields the template data builder reads are modelled. Unknown
//! fields in a manifest are ignored so newer resource versions still load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::{Error, Result};

/// API version of the `Monitoring` resource.
pub const MONITORING_API_VERSION: &str = "services.platform.opendatahub.io/v1alpha1";

/// Kind of the `Monitoring` resource.
pub const MONITORING_KIND: &str = "Monitoring";

/// The owning `Monitoring` custom resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitoring {
    /// API version of the manifest.
    #[serde(default)]
    pub api_version: String,
    /// Resource kind.
    #[serde(default)]
    pub kind: String,
    /// Object metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired state.
    #[serde(default)]
    pub spec: MonitoringSpec,
}

/// Minimal object metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Resource name.
    #[serde(default)]
    pub name: String,
    /// Resource namespace, when namespaced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// `Monitoring` spec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringSpec {
    /// Settings shared with the platform-level monitoring configuration.
    #[serde(flatten)]
    pub common: MonitoringCommonSpec,
}

/// Monitoring settings common to every monitoring-aware resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringCommonSpec {
    /// Namespace the monitoring stack is deployed into.
    #[serde(default)]
    pub namespace: String,
    /// Metrics collection settings; absent when metrics are disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    /// Trace collection settings; absent when tracing is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traces: Option<Traces>,
}

/// Metrics collection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Persistent storage for the metrics backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<MetricsStorage>,
    /// Compute resources for the metrics backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<MetricsResources>,
    /// Number of metrics backend replicas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Custom exporters: exporter name to raw YAML configuration.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub exporters: HashMap<String, String>,
}

/// Metrics storage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsStorage {
    /// Volume size, e.g. `5Gi`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Retention period, e.g. `90d`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<String>,
}

/// Metrics compute resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResources {
    /// CPU limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<String>,
    /// Memory limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,
    /// CPU request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_request: Option<String>,
    /// Memory request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_request: Option<String>,
}

/// Trace collection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Traces {
    /// Trace storage backend.
    #[serde(default)]
    pub storage: TracesStorage,
    /// Sampling ratio as a decimal string, e.g. `0.1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_ratio: Option<String>,
}

/// Trace storage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracesStorage {
    /// Storage backend kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<TracesBackend>,
    /// Volume size for the `pv` backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Secret holding object storage credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Retention period, e.g. `2160h`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<String>,
}

/// Trace storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracesBackend {
    /// Persistent volume.
    #[default]
    Pv,
    /// S3-compatible object storage.
    S3,
    /// Google Cloud Storage.
    Gcs,
}

impl TracesBackend {
    /// Returns the backend as it appears in manifests.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pv => "pv",
            Self::S3 => "s3",
            Self::Gcs => "gcs",
        }
    }
}

impl fmt::Display for TracesBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TracesBackend {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pv" => Ok(Self::Pv),
            "s3" => Ok(Self::S3),
            "gcs" => Ok(Self::Gcs),
            _ => Err(Error::InvalidInput(format!(
                "Invalid traces backend: {s}. Expected: pv, s3, or gcs"
            ))),
        }
    }
}

impl Monitoring {
    /// Creates a `Monitoring` resource targeting the given namespace.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            api_version: MONITORING_API_VERSION.to_string(),
            kind: MONITORING_KIND.to_string(),
            metadata: ObjectMeta {
                name: "default-monitoring".to_string(),
                namespace: None,
            },
            spec: MonitoringSpec {
                common: MonitoringCommonSpec {
                    namespace: namespace.into(),
                    metrics: None,
                    traces: None,
                },
            },
        }
    }

    /// Sets the metrics configuration.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.spec.common.metrics = Some(metrics);
        self
    }

    /// Sets the traces configuration.
    #[must_use]
    pub fn with_traces(mut self, traces: Traces) -> Self {
        self.spec.common.traces = Some(traces);
        self
    }

    /// Parses a `Monitoring` manifest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the manifest is not valid YAML, does
    /// not match the resource schema, or declares a different kind.
    pub fn from_yaml(manifest: &str) -> Result<Self> {
        let monitoring: Self = serde_yaml_ng::from_str(manifest)
            .map_err(|e| Error::InvalidInput(format!("Failed to parse Monitoring manifest: {e}")))?;

        if !monitoring.kind.is_empty() && monitoring.kind != MONITORING_KIND {
            return Err(Error::InvalidInput(format!(
                "Expected kind {MONITORING_KIND}, got {}",
                monitoring.kind
            )));
        }

        Ok(monitoring)
    }

    /// Returns the configured custom metrics exporters, if metrics are enabled.
    #[must_use]
    pub fn metrics_exporters(&self) -> Option<&HashMap<String, String>> {
        self.spec
            .common
            .metrics
            .as_ref()
            .map(|metrics| &metrics.exporters)
    }
}

impl Metrics {
    /// Creates a metrics configuration with the given exporters.
    #[must_use]
    pub fn with_exporters(exporters: HashMap<String, String>) -> Self {
        Self {
            exporters,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r"
apiVersion: services.platform.opendatahub.io/v1alpha1
kind: Monitoring
metadata:
  name: default-monitoring
spec:
  namespace: opendatahub
  metrics:
    replicas: 3
    storage:
      size: 10Gi
      retention: 30d
    resources:
      cpuLimit: '1'
      memoryRequest: 1Gi
    exporters:
      logging: 'loglevel: debug'
      otlp/jaeger: |
        endpoint: http://jaeger:4317
        tls:
          insecure: true
  traces:
    sampleRatio: '0.5'
    storage:
      backend: s3
      secret: traces-bucket
";

    #[test]
    fn test_from_yaml_full_manifest() {
        let monitoring = Monitoring::from_yaml(MANIFEST).unwrap();

        assert_eq!(monitoring.kind, MONITORING_KIND);
        assert_eq!(monitoring.metadata.name, "default-monitoring");
        assert_eq!(monitoring.spec.common.namespace, "opendatahub");

        let metrics = monitoring.spec.common.metrics.as_ref().unwrap();
        assert_eq!(metrics.replicas, Some(3));
        assert_eq!(
            metrics.storage.as_ref().and_then(|s| s.size.as_deref()),
            Some("10Gi")
        );
        assert_eq!(
            metrics.resources.as_ref().and_then(|r| r.cpu_limit.as_deref()),
            Some("1")
        );

        let exporters = monitoring.metrics_exporters().unwrap();
        assert_eq!(exporters.len(), 2);
        assert_eq!(exporters.get("logging").map(String::as_str), Some("loglevel: debug"));
        assert!(exporters["otlp/jaeger"].contains("insecure: true"));

        let traces = monitoring.spec.common.traces.as_ref().unwrap();
        assert_eq!(traces.storage.backend, Some(TracesBackend::S3));
        assert_eq!(traces.sample_ratio.as_deref(), Some("0.5"));
    }

    #[test]
    fn test_from_yaml_without_metrics() {
        let monitoring = Monitoring::from_yaml("kind: Monitoring\nspec:\n  namespace: ns\n").unwrap();
        assert!(monitoring.metrics_exporters().is_none());
    }

    #[test]
    fn test_from_yaml_metrics_without_exporters() {
        let monitoring =
            Monitoring::from_yaml("spec:\n  namespace: ns\n  metrics:\n    replicas: 1\n").unwrap();
        assert_eq!(monitoring.metrics_exporters().map(HashMap::len), Some(0));
    }

    #[test]
    fn test_from_yaml_rejects_other_kind() {
        let err = Monitoring::from_yaml("kind: ConfigMap\n").unwrap_err();
        assert!(err.to_string().contains("Expected kind Monitoring"));
    }

    #[test]
    fn test_from_yaml_rejects_malformed_manifest() {
        let err = Monitoring::from_yaml("spec: [unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_traces_backend_parse() {
        assert_eq!("PV".parse::<TracesBackend>().unwrap(), TracesBackend::Pv);
        assert_eq!("gcs".parse::<TracesBackend>().unwrap(), TracesBackend::Gcs);
        assert!("azure".parse::<TracesBackend>().is_err());
        assert_eq!(TracesBackend::S3.to_string(), "s3");
    }

    #[test]
    fn test_builder() {
        let mut exporters = HashMap::new();
        exporters.insert("debug".to_string(), "verbosity: detailed".to_string());
        let monitoring = Monitoring::new("monitoring-ns").with_metrics(Metrics::with_exporters(exporters));

        assert_eq!(monitoring.api_version, MONITORING_API_VERSION);
        assert_eq!(monitoring.metrics_exporters().map(HashMap::len), Some(1));
    }
}
