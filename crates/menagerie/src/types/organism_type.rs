//! Organism types: reference entities describing a kind of organism.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::ids::{OrganismTypeId, TermCategoryId};
use crate::platform::{Term, TermCategory};
use crate::schema::MetadataSchema;

/// A kind of organism, e.g. "Bird" or "Mammal".
///
/// Carries the JSON-Schema every organism of this type must satisfy with
/// its identification info, and the set of term categories that may label
/// organisms of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismType {
    pub id: OrganismTypeId,
    /// Unique type name.
    pub name: String,
    pub description: String,
    /// Schema for the identification-info document of organisms of this
    /// type.
    pub identification_info_schema: MetadataSchema,
    /// Term categories valid for describing organisms of this type.
    pub term_categories: BTreeSet<TermCategoryId>,
    /// Whether a single record of this type may represent multiple
    /// organisms (e.g. a colony or a herd).
    pub is_multi_organism: bool,
    pub created_on: DateTime<Utc>,
}

impl OrganismType {
    /// Create a type with the default accept-any-object schema.
    pub fn new(id: OrganismTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            identification_info_schema: MetadataSchema::simple(),
            term_categories: BTreeSet::new(),
            is_multi_organism: false,
            created_on: Utc::now(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the identification-info schema.
    pub fn with_identification_info_schema(mut self, schema: MetadataSchema) -> Self {
        self.identification_info_schema = schema;
        self
    }

    /// Permit a term category for labels on organisms of this type.
    pub fn with_term_category(mut self, category: TermCategoryId) -> Self {
        self.term_categories.insert(category);
        self
    }

    /// Mark this type as possibly representing multiple organisms.
    pub fn multi_organism(mut self) -> Self {
        self.is_multi_organism = true;
        self
    }

    /// Validate an identification-info document against this type's schema.
    ///
    /// Returns one message per schema violation.
    pub fn validate_identification_info(&self, info: &Value) -> Result<(), Vec<String>> {
        self.identification_info_schema
            .validate(info)
            .map_err(|violations| {
                violations
                    .iter()
                    .map(|violation| {
                        format!(
                            "invalid identification info for organism type '{}': {}",
                            self.name,
                            violation.describe()
                        )
                    })
                    .collect()
            })
    }

    /// True when terms of the given category may label organisms of this
    /// type.
    pub fn allows_term_category(&self, category: TermCategoryId) -> bool {
        self.term_categories.contains(&category)
    }

    /// Validate a label term against this type's permitted term categories.
    pub fn validate_term(&self, term: &Term, category: &TermCategory) -> Result<(), String> {
        if self.allows_term_category(term.category) {
            Ok(())
        } else {
            Err(format!(
                "terms of category '{}' are not allowed for organisms of type '{}' (term: '{}')",
                category.name, self.name, term.value
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TermId;
    use serde_json::json;

    fn bird() -> OrganismType {
        OrganismType::new(OrganismTypeId(1), "Bird")
            .with_description("Avian specimens")
            .with_identification_info_schema(
                MetadataSchema::new(json!({
                    "type": "object",
                    "properties": {
                        "species": {"type": "string"}
                    },
                    "required": ["species"]
                }))
                .unwrap(),
            )
            .with_term_category(TermCategoryId(1))
    }

    #[test]
    fn test_identification_info_matches_schema() {
        let bird = bird();
        assert!(
            bird.validate_identification_info(&json!({"species": "Turdus migratorius"}))
                .is_ok()
        );
    }

    #[test]
    fn test_identification_info_violations_reported() {
        let bird = bird();
        let messages = bird.validate_identification_info(&json!({})).unwrap_err();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("organism type 'Bird'"));
        assert!(messages[0].contains("species"));
    }

    #[test]
    fn test_term_category_membership() {
        let bird = bird();
        let life_stage = TermCategory::new(TermCategoryId(1), "Life Stage");
        let habitat = TermCategory::new(TermCategoryId(2), "Habitat");
        let juvenile = Term::new(TermId(1), life_stage.id, "Juvenile");
        let riparian = Term::new(TermId(2), habitat.id, "Riparian");

        assert!(bird.validate_term(&juvenile, &life_stage).is_ok());
        let message = bird.validate_term(&riparian, &habitat).unwrap_err();
        assert!(message.contains("'Habitat'"));
        assert!(message.contains("'Riparian'"));
    }

    #[test]
    fn test_default_schema_accepts_empty_object() {
        let plain = OrganismType::new(OrganismTypeId(2), "Mammal");
        assert!(plain.validate_identification_info(&json!({})).is_ok());
        assert!(plain.validate_identification_info(&json!(7)).is_err());
    }
}
