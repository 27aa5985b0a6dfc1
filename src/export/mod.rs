//! # Export Module
//!
//! Streams a collection through at most one transform into a sink:
//!
//! - `None` - JSON array
//! - `Compress` - gzip of the JSON array
//! - `Tabular` - CSV with a header row
//! - `Documentize` - PDF table, rendered once the whole collection is read

pub mod document;
pub mod errors;
pub mod pipeline;
pub mod source;
pub mod tabular;
pub mod transform;

pub use document::{DocumentLayout, TableColumn};
pub use errors::{ExportResult, ExportState, PipelineError, PipelineStage};
pub use pipeline::{ExportPipeline, ExportSummary};
pub use source::RecordSource;
pub use tabular::TabularEncoder;
pub use transform::Transform;
