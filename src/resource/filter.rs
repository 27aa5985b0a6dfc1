//! # Record Filters
//!
//! Equality predicates used by `list`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Record;

/// Keeps records whose `field` equals `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Field to filter on
    pub field: String,

    /// Value to compare against
    pub value: Value,
}

impl RecordFilter {
    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Check if a record matches this filter.
    ///
    /// A record without the field never matches.
    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.field) == Some(&self.value)
    }
}
