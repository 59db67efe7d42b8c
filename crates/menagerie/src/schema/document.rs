//! Schema document wrapper and instance validation.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{MenagerieError, Result};

/// The default schema used when a type or join is registered without one:
/// accepts any JSON object and nothing else.
static SIMPLE_OBJECT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {},
    })
});

/// A single schema violation found while validating an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// JSON pointer into the instance where the violation occurred.
    /// Empty string means the instance root.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl SchemaViolation {
    /// Render the violation for a field-level error message.
    pub fn describe(&self) -> String {
        if self.path.is_empty() {
            self.message.clone()
        } else {
            format!("{} (at {})", self.message, self.path)
        }
    }
}

/// A JSON-Schema document attached to a type or a collection-type join.
///
/// The document is stored as plain JSON and compiled on demand for each
/// validation call. Construction verifies the document actually compiles,
/// so a malformed schema is rejected when the owning entity is registered
/// rather than on the first record write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataSchema {
    document: Value,
}

impl MetadataSchema {
    /// Wrap a schema document, verifying it compiles.
    pub fn new(document: Value) -> Result<Self> {
        if let Err(error) = jsonschema::validator_for(&document) {
            return Err(MenagerieError::Schema {
                context: "metadata schema".to_string(),
                message: error.to_string(),
            });
        }
        Ok(Self { document })
    }

    /// The default schema: any JSON object passes, anything else fails.
    pub fn simple() -> Self {
        Self {
            document: SIMPLE_OBJECT_SCHEMA.clone(),
        }
    }

    /// The underlying schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate an instance, collecting every violation.
    pub fn validate(&self, instance: &Value) -> std::result::Result<(), Vec<SchemaViolation>> {
        let validator = match jsonschema::validator_for(&self.document) {
            Ok(validator) => validator,
            // The document compiled at construction; a failure here means
            // it was mutated through deserialization of a corrupt file.
            Err(error) => {
                return Err(vec![SchemaViolation {
                    path: String::new(),
                    message: format!("schema document no longer compiles: {error}"),
                }]);
            }
        };

        let violations: Vec<SchemaViolation> = validator
            .iter_errors(instance)
            .map(|error| SchemaViolation {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// True when the instance satisfies the schema.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validate(instance).is_ok()
    }
}

impl Default for MetadataSchema {
    fn default() -> Self {
        Self::simple()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_schema_accepts_any_object() {
        let schema = MetadataSchema::simple();
        assert!(schema.is_valid(&json!({})));
        assert!(schema.is_valid(&json!({"anything": [1, 2, 3]})));
    }

    #[test]
    fn test_simple_schema_rejects_non_objects() {
        let schema = MetadataSchema::simple();
        assert!(!schema.is_valid(&json!("a string")));
        assert!(!schema.is_valid(&json!([1, 2])));
        assert!(!schema.is_valid(&json!(null)));
    }

    #[test]
    fn test_required_property_violation_carries_path() {
        let schema = MetadataSchema::new(json!({
            "type": "object",
            "properties": {
                "wingspan_cm": {"type": "number"}
            },
            "required": ["wingspan_cm"]
        }))
        .unwrap();

        let violations = schema.validate(&json!({})).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("wingspan_cm"));
    }

    #[test]
    fn test_nested_violation_path_points_into_instance() {
        let schema = MetadataSchema::new(json!({
            "type": "object",
            "properties": {
                "measurements": {
                    "type": "object",
                    "properties": {"mass_g": {"type": "number"}}
                }
            }
        }))
        .unwrap();

        let instance = json!({"measurements": {"mass_g": "heavy"}});
        let violations = schema.validate(&instance).unwrap_err();
        assert_eq!(violations[0].path, "/measurements/mass_g");
        assert!(violations[0].describe().contains("/measurements/mass_g"));
    }

    #[test]
    fn test_malformed_document_rejected_at_construction() {
        let result = MetadataSchema::new(json!({"type": "not-a-type"}));
        assert!(matches!(result, Err(MenagerieError::Schema { .. })));
    }

    #[test]
    fn test_all_violations_collected() {
        let schema = MetadataSchema::new(json!({
            "type": "object",
            "properties": {
                "age": {"type": "integer"},
                "sex": {"type": "string", "enum": ["male", "female", "unknown"]}
            },
            "required": ["age", "sex"]
        }))
        .unwrap();

        let violations = schema
            .validate(&json!({"age": "old", "sex": "yes"}))
            .unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_serde_round_trip_preserves_document() {
        let schema = MetadataSchema::new(json!({"type": "object"})).unwrap();
        let text = serde_json::to_string(&schema).unwrap();
        let back: MetadataSchema = serde_json::from_str(&text).unwrap();
        assert_eq!(back, schema);
    }
}
