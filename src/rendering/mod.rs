//! Renderer-facing template data.
//!
//! The collector configuration renderer itself lives outside this crate; this
//! module defines the aggregate it consumes.

mod template_data;

pub use template_data::{
    CUSTOM_METRICS_EXPORTER_NAMES_KEY, CUSTOM_METRICS_EXPORTERS_KEY, TemplateData, TemplateValue,
};
