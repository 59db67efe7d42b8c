//! The per-collection-type configuration and its resolver operations.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::{CaptureTypeId, CollectionTypeId, OrganismTypeId};
use crate::types::{CaptureType, OrganismType};

use super::{ConfigCaptureType, ConfigOrganismType};

/// Organism support configuration for one collection type (1:1).
///
/// Holds the toggle enabling organisms and the join rows for every
/// permitted organism/capture type, keyed by type id. Uniqueness per
/// `(config, type)` pair is structural: one map slot per type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionOrganismConfig {
    pub collection_type: CollectionTypeId,
    /// Whether organisms are used at all in collections of this type.
    pub use_organisms: bool,
    /// Permitted organism types, in registration order.
    pub organism_types: IndexMap<OrganismTypeId, ConfigOrganismType>,
    /// Permitted capture types, in registration order.
    pub capture_types: IndexMap<CaptureTypeId, ConfigCaptureType>,
    pub created_on: DateTime<Utc>,
}

impl CollectionOrganismConfig {
    pub fn new(collection_type: CollectionTypeId, use_organisms: bool) -> Self {
        Self {
            collection_type,
            use_organisms,
            organism_types: IndexMap::new(),
            capture_types: IndexMap::new(),
            created_on: Utc::now(),
        }
    }

    /// Resolve the join row permitting an organism type in this
    /// configuration.
    ///
    /// Absence means the type is not permitted in this collection type: a
    /// user-facing validation message, not a system fault. The returned
    /// join row carries the overlay schema to apply on top of the base
    /// type's schema.
    pub fn resolve_organism_type(
        &self,
        organism_type: &OrganismType,
        collection_type_name: &str,
    ) -> Result<&ConfigOrganismType, String> {
        self.organism_types.get(&organism_type.id).ok_or_else(|| {
            format!(
                "organism type '{}' is not accepted in collections of type '{}'",
                organism_type.name, collection_type_name
            )
        })
    }

    /// Resolve the join row permitting a capture type in this
    /// configuration. Same contract as [`Self::resolve_organism_type`].
    pub fn resolve_capture_type(
        &self,
        capture_type: &CaptureType,
        collection_type_name: &str,
    ) -> Result<&ConfigCaptureType, String> {
        self.capture_types.get(&capture_type.id).ok_or_else(|| {
            format!(
                "capture type '{}' is not accepted in collections of type '{}'",
                capture_type.name, collection_type_name
            )
        })
    }

    /// True when an organism type has a join row in this configuration.
    pub fn allows_organism_type(&self, organism_type: OrganismTypeId) -> bool {
        self.organism_types.contains_key(&organism_type)
    }

    /// True when a capture type has a join row in this configuration.
    pub fn allows_capture_type(&self, capture_type: CaptureTypeId) -> bool {
        self.capture_types.contains_key(&capture_type)
    }
}
