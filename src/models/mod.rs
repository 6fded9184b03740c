//! Data models for monitoring synth.
//!
//! The typed `Monitoring` resource that feeds assembly, and the structured
//! value every exporter fragment is parsed into.

mod monitoring;
mod value;

pub use monitoring::{
    MONITORING_API_VERSION, MONITORING_KIND, Metrics, MetricsResources, MetricsStorage,
    Monitoring, MonitoringCommonSpec, MonitoringSpec, ObjectMeta, Traces, TracesBackend,
    TracesStorage,
};
pub use value::StructuredValue;
