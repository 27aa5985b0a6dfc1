//! Validation policies for create payloads
//!
//! A policy is an ordered list of field rules. Checking a payload never
//! stops at the first problem: every violated rule is reported, in rule
//! order, so clients can fix a request in one round trip.
//!
//! Fields without a rule are accepted untouched.

use serde::Serialize;

use super::types::{json_type_name, FieldRule, FieldType};
use crate::record::Payload;

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ordered rule set checked before records are created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    rules: Vec<(String, FieldRule)>,
}

impl ValidationPolicy {
    /// Policy with no rules; accepts every payload
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Add a rule for `field`
    pub fn rule(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.push((field.into(), rule));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules for books: a string title and a string category
    pub fn books() -> Self {
        Self::permissive()
            .rule(
                "title",
                FieldRule::required_string()
                    .with_message("Title is a mandatory field and needs to be a string!"),
            )
            .rule(
                "category",
                FieldRule::required_string()
                    .with_message("Category is a mandatory field and needs to be a string!"),
            )
    }

    /// Users carry arbitrary fields and are never rejected
    pub fn users() -> Self {
        Self::permissive()
    }

    /// Check a payload, returning every violation (empty = pass)
    pub fn check(&self, payload: &Payload) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (field, rule) in &self.rules {
            let problem = match payload.get(field) {
                None if rule.required => Some(format!("{} is required", field)),
                None => None,
                Some(value) if !rule.field_type.matches(value) => Some(type_mismatch(
                    field,
                    rule.field_type,
                    json_type_name(value),
                )),
                Some(_) => None,
            };

            if let Some(generated) = problem {
                let message = rule.message.clone().unwrap_or(generated);
                violations.push(Violation::new(field.clone(), message));
            }
        }

        violations
    }
}

fn type_mismatch(field: &str, expected: FieldType, found: &str) -> String {
    format!("{} must be a {}, found {}", field, expected.type_name(), found)
}
