//! Validation module
//!
//! Declarative field presence and type rules evaluated against payloads
//! before a record is created.

mod policy;
mod types;

pub use policy::{ValidationPolicy, Violation};
pub use types::{json_type_name, FieldRule, FieldType};
