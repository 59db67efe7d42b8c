//! Boundary entities consumed by the organism domain.
//!
//! These mirror the host platform's collection, sampling, device, and
//! controlled-vocabulary records with just enough structure for the
//! validation traversals: organism → collection → collection type, and
//! capture → sampling-event device → sampling event → collection →
//! collection type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ids::{
    CollectionId, CollectionTypeId, DeviceCategoryId, ItemId, SamplingEventDeviceId,
    SamplingEventId, TermCategoryId, TermId,
};

/// A category of capture device, e.g. "Camera" or "Audio Recorder".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCategory {
    pub id: DeviceCategoryId,
    /// Unique category name.
    pub name: String,
    pub created_on: DateTime<Utc>,
}

impl DeviceCategory {
    pub fn new(id: DeviceCategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_on: Utc::now(),
        }
    }
}

/// A controlled-vocabulary category scoping terms, e.g. "Life Stage".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermCategory {
    pub id: TermCategoryId,
    /// Unique category name.
    pub name: String,
    pub created_on: DateTime<Utc>,
}

impl TermCategory {
    pub fn new(id: TermCategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_on: Utc::now(),
        }
    }
}

/// A controlled-vocabulary label, e.g. "Juvenile" within "Life Stage".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub category: TermCategoryId,
    pub value: String,
    pub created_on: DateTime<Utc>,
}

impl Term {
    pub fn new(id: TermId, category: TermCategoryId, value: impl Into<String>) -> Self {
        Self {
            id,
            category,
            value: value.into(),
            created_on: Utc::now(),
        }
    }
}

/// A classification of data collections. Determines which device categories
/// (and, through [`crate::config::CollectionOrganismConfig`], which organism
/// and capture types) are valid within collections of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionType {
    pub id: CollectionTypeId,
    /// Unique type name, e.g. "Forest Survey".
    pub name: String,
    /// Device categories usable in collections of this type.
    pub device_categories: BTreeSet<DeviceCategoryId>,
    pub created_on: DateTime<Utc>,
}

impl CollectionType {
    pub fn new(id: CollectionTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            device_categories: BTreeSet::new(),
            created_on: Utc::now(),
        }
    }

    /// Permit a device category in collections of this type.
    pub fn with_device_category(mut self, category: DeviceCategoryId) -> Self {
        self.device_categories.insert(category);
        self
    }

    /// True when devices of the given category may be used in collections
    /// of this type.
    pub fn allows_device_category(&self, category: DeviceCategoryId) -> bool {
        self.device_categories.contains(&category)
    }
}

/// A concrete data collection, e.g. one survey campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub collection_type: CollectionTypeId,
    pub created_on: DateTime<Utc>,
}

impl Collection {
    pub fn new(
        id: CollectionId,
        name: impl Into<String>,
        collection_type: CollectionTypeId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            collection_type,
            created_on: Utc::now(),
        }
    }
}

/// A sampling event within a collection (one deployment/visit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingEvent {
    pub id: SamplingEventId,
    pub collection: CollectionId,
    pub created_on: DateTime<Utc>,
}

impl SamplingEvent {
    pub fn new(id: SamplingEventId, collection: CollectionId) -> Self {
        Self {
            id,
            collection,
            created_on: Utc::now(),
        }
    }
}

/// The device-and-context record under which a capture occurred: a device
/// of some category deployed during a sampling event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingEventDevice {
    pub id: SamplingEventDeviceId,
    pub sampling_event: SamplingEventId,
    pub device_category: DeviceCategoryId,
    pub created_on: DateTime<Utc>,
}

impl SamplingEventDevice {
    pub fn new(
        id: SamplingEventDeviceId,
        sampling_event: SamplingEventId,
        device_category: DeviceCategoryId,
    ) -> Self {
        Self {
            id,
            sampling_event,
            device_category,
            created_on: Utc::now(),
        }
    }
}

/// An opaque media/data item that organisms and captures can reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub created_on: DateTime<Utc>,
}

impl Item {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            created_on: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_type_device_membership() {
        let camera = DeviceCategoryId(1);
        let recorder = DeviceCategoryId(2);
        let collection_type =
            CollectionType::new(CollectionTypeId(1), "Forest Survey").with_device_category(camera);

        assert!(collection_type.allows_device_category(camera));
        assert!(!collection_type.allows_device_category(recorder));
    }
}
