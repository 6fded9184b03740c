//! Exporter validation and template data services.
//!
//! Leaf-first: the reserved name guard and fragment parser are composed by
//! the assembler, which the template data builder calls once per
//! reconciliation.

mod assembler;
mod parser;
mod reserved;
mod template_data;

pub use assembler::{ExporterAssembler, ExporterTemplateData};
pub use parser::{SyntaxError, SyntaxLocation, parse_fragment};
pub use reserved::{RESERVED_EXPORTER_NAMES, ReservedNames};
pub use template_data::{TemplateDataBuilder, get_template_data};
