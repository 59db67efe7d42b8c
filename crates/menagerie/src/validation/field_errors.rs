//! Field-keyed validation error aggregation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accumulated validation failures, keyed by the field of the originating
/// input so callers can surface each message against the right form field.
///
/// Field order is insertion order, which for pipeline output means the
/// order the checks ran in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldErrors {
    errors: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Create an empty set of errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Merge all messages from another set into this one.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
    }

    /// True when no failure has been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn message_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Fields that have at least one failure, in check order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Messages recorded against a single field.
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over `(field, messages)` pairs in check order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Convert into `Ok(())` when empty, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_lookup() {
        let mut errors = FieldErrors::new();
        errors.push("organism_type", "not permitted");
        errors.push("additional_metadata", "missing property 'age'");
        errors.push("additional_metadata", "unexpected property 'color'");

        assert!(!errors.is_empty());
        assert_eq!(errors.message_count(), 3);
        assert_eq!(errors.messages("organism_type"), ["not permitted"]);
        assert_eq!(errors.messages("additional_metadata").len(), 2);
        assert!(errors.messages("labels").is_empty());
    }

    #[test]
    fn test_field_order_is_insertion_order() {
        let mut errors = FieldErrors::new();
        errors.push("collection", "a");
        errors.push("organism_type", "b");
        errors.push("identification_info", "c");

        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, ["collection", "organism_type", "identification_info"]);
    }

    #[test]
    fn test_merge_appends_messages() {
        let mut a = FieldErrors::new();
        a.push("labels", "first");
        let mut b = FieldErrors::new();
        b.push("labels", "second");
        b.push("organism", "third");

        a.merge(b);
        assert_eq!(a.messages("labels"), ["first", "second"]);
        assert_eq!(a.messages("organism"), ["third"]);
    }

    #[test]
    fn test_display_joins_all_messages() {
        let mut errors = FieldErrors::new();
        errors.push("organism_type", "not permitted");
        errors.push("labels", "category not allowed");
        assert_eq!(
            errors.to_string(),
            "organism_type: not permitted; labels: category not allowed"
        );
    }

    #[test]
    fn test_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());
        let mut errors = FieldErrors::new();
        errors.push("name", "taken");
        assert!(errors.into_result().is_err());
    }
}
