//! # Records and Collections
//!
//! A record is a flat JSON object describing one book or one user. The server
//! owns three fields:
//!
//! - `id` - assigned at creation, never changes
//! - `createdAt` - assigned at creation, never changes
//! - `updatedAt` - refreshed on every update, absent before the first one
//!
//! Everything else is supplied by the caller and stored as-is.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the record identifier
pub const ID_FIELD: &str = "id";
/// Field holding the creation timestamp
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Field holding the last update timestamp
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Fields callers can never set through a payload
pub const SERVER_FIELDS: [&str; 3] = [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// Caller-supplied field mapping
pub type Payload = Map<String, Value>;

/// Ordered records of one resource type, persisted as a unit
pub type Collection = Vec<Record>;

/// One stored resource instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Build a new record from a payload, stamping server-owned fields.
    ///
    /// Server values win over anything the payload carries under the same
    /// names.
    pub fn create(payload: Payload, id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let mut fields = payload;
        fields.remove(UPDATED_AT_FIELD);
        fields.insert(CREATED_AT_FIELD.to_string(), timestamp(created_at));
        fields.insert(ID_FIELD.to_string(), Value::String(id.into()));
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Record identifier, if the record carries a string id
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id() == Some(id)
    }

    /// Stamp `updatedAt`
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.0.insert(UPDATED_AT_FIELD.to_string(), timestamp(at));
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Merge an update payload into an existing record.
///
/// Incoming fields override existing ones, fields absent from the payload
/// are kept, and server-owned fields in the payload are ignored.
pub fn merge_fields(existing: &Record, incoming: &Payload) -> Record {
    let mut merged = existing.0.clone();
    for (field, value) in incoming {
        if SERVER_FIELDS.contains(&field.as_str()) {
            continue;
        }
        merged.insert(field.clone(), value.clone());
    }
    Record(merged)
}

/// Render a timestamp the way records store it
pub fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
