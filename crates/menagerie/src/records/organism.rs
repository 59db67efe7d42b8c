//! Organism records: concrete specimens/individuals within a collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fmt;

use crate::ids::{CollectionId, ItemId, OrganismId, OrganismTypeId, TermId};

/// A concrete organism observed within a collection.
///
/// Carries the free-form identification info and additional metadata that
/// are validated against the declared type's schema and the collection
/// type's overlay on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    /// Collection this organism belongs to.
    pub collection: CollectionId,
    /// Declared type of this organism.
    pub organism_type: OrganismTypeId,
    /// Optional unique label for the individual, e.g. "Ringed hawk #7".
    pub name: Option<String>,
    /// Free-text notes.
    pub remarks: String,
    /// Identification information, validated against the type's schema.
    pub identification_info: Value,
    /// Additional metadata, validated against the collection-type overlay.
    pub additional_metadata: Value,
    /// Controlled-vocabulary labels describing the organism.
    pub labels: BTreeSet<TermId>,
    /// Items associated with this organism.
    pub items: BTreeSet<ItemId>,
    pub created_on: DateTime<Utc>,
}

impl Organism {
    /// Create an organism with empty JSON documents and no labels.
    pub fn new(id: OrganismId, collection: CollectionId, organism_type: OrganismTypeId) -> Self {
        Self {
            id,
            collection,
            organism_type,
            name: None,
            remarks: String::new(),
            identification_info: json!({}),
            additional_metadata: json!({}),
            labels: BTreeSet::new(),
            items: BTreeSet::new(),
            created_on: Utc::now(),
        }
    }

    /// Set the unique name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the free-text remarks.
    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    /// Set the identification-info document.
    pub fn with_identification_info(mut self, info: Value) -> Self {
        self.identification_info = info;
        self
    }

    /// Set the additional-metadata document.
    pub fn with_additional_metadata(mut self, metadata: Value) -> Self {
        self.additional_metadata = metadata;
        self
    }

    /// Attach a label term.
    pub fn with_label(mut self, term: TermId) -> Self {
        self.labels.insert(term);
        self
    }

    /// Associate an item.
    pub fn with_item(mut self, item: ItemId) -> Self {
        self.items.insert(item);
        self
    }
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "Organism {}", self.id),
        }
    }
}
