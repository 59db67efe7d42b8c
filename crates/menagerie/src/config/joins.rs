//! Overlay join rows binding a configuration to one permitted type.
//!
//! These are distinct entities rather than plain link rows because each
//! carries its own JSON-Schema overlay: the base type's schema and the
//! per-collection-type overlay are both applied to a record's metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{CaptureTypeId, CollectionTypeId, OrganismTypeId};
use crate::schema::MetadataSchema;

/// Permits one organism type within a collection type, with an overlay
/// schema for the additional metadata of organisms of that type in
/// collections of that type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOrganismType {
    pub collection_type: CollectionTypeId,
    pub organism_type: OrganismTypeId,
    /// Schema for the additional-metadata document of matching organisms.
    pub metadata_schema: MetadataSchema,
    pub created_on: DateTime<Utc>,
}

impl ConfigOrganismType {
    pub fn new(
        collection_type: CollectionTypeId,
        organism_type: OrganismTypeId,
        metadata_schema: MetadataSchema,
    ) -> Self {
        Self {
            collection_type,
            organism_type,
            metadata_schema,
            created_on: Utc::now(),
        }
    }

    /// Validate an additional-metadata document against the overlay schema.
    ///
    /// Returns one message per schema violation.
    pub fn validate_additional_metadata(&self, metadata: &Value) -> Result<(), Vec<String>> {
        self.metadata_schema
            .validate(metadata)
            .map_err(describe_violations)
    }
}

/// Permits one capture type within a collection type, with an overlay
/// schema for the additional metadata of matching captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigCaptureType {
    pub collection_type: CollectionTypeId,
    pub capture_type: CaptureTypeId,
    /// Schema for the additional-metadata document of matching captures.
    pub metadata_schema: MetadataSchema,
    pub created_on: DateTime<Utc>,
}

impl ConfigCaptureType {
    pub fn new(
        collection_type: CollectionTypeId,
        capture_type: CaptureTypeId,
        metadata_schema: MetadataSchema,
    ) -> Self {
        Self {
            collection_type,
            capture_type,
            metadata_schema,
            created_on: Utc::now(),
        }
    }

    /// Validate an additional-metadata document against the overlay schema.
    pub fn validate_additional_metadata(&self, metadata: &Value) -> Result<(), Vec<String>> {
        self.metadata_schema
            .validate(metadata)
            .map_err(describe_violations)
    }
}

fn describe_violations(violations: Vec<crate::schema::SchemaViolation>) -> Vec<String> {
    violations
        .iter()
        .map(|violation| format!("invalid additional metadata: {}", violation.describe()))
        .collect()
}
