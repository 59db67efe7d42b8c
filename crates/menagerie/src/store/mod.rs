//! In-memory entity store with uniqueness and deletion-policy enforcement.
//!
//! The store is the stand-in for the platform's relational persistence
//! layer: insertion-ordered tables per entity kind, sequential id
//! assignment, unique-name constraints, and per-relation deletion rules
//! (protect types referenced by surviving rows; cascade configuration
//! joins with their configuration).
//!
//! The store performs no cross-entity validation of record contents; that
//! is the job of the validation pipelines driven by
//! [`crate::Menagerie`].

mod persistence;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CollectionOrganismConfig;
use crate::error::{MenagerieError, Result};
use crate::ids::{
    CaptureTypeId, CollectionId, CollectionTypeId, DeviceCategoryId, ItemId, OrganismCaptureId,
    OrganismId, OrganismTypeId, SamplingEventDeviceId, SamplingEventId, TermCategoryId, TermId,
};
use crate::platform::{
    Collection, CollectionType, DeviceCategory, Item, SamplingEvent, SamplingEventDevice, Term,
    TermCategory,
};
use crate::records::{Organism, OrganismCapture};
use crate::types::{CaptureType, OrganismType};

/// All entity tables, insertion-ordered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    next_id: u64,

    pub(crate) device_categories: IndexMap<DeviceCategoryId, DeviceCategory>,
    pub(crate) term_categories: IndexMap<TermCategoryId, TermCategory>,
    pub(crate) terms: IndexMap<TermId, Term>,
    pub(crate) items: IndexMap<ItemId, Item>,
    pub(crate) collection_types: IndexMap<CollectionTypeId, CollectionType>,
    pub(crate) collections: IndexMap<CollectionId, Collection>,
    pub(crate) sampling_events: IndexMap<SamplingEventId, SamplingEvent>,
    pub(crate) sampling_event_devices: IndexMap<SamplingEventDeviceId, SamplingEventDevice>,
    pub(crate) organism_types: IndexMap<OrganismTypeId, OrganismType>,
    pub(crate) capture_types: IndexMap<CaptureTypeId, CaptureType>,
    /// One configuration per collection type.
    pub(crate) configs: IndexMap<CollectionTypeId, CollectionOrganismConfig>,
    pub(crate) organisms: IndexMap<OrganismId, Organism>,
    pub(crate) captures: IndexMap<OrganismCaptureId, OrganismCapture>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next sequential id, typed for any entity kind.
    pub fn allocate_id<I: From<u64>>(&mut self) -> I {
        self.next_id += 1;
        I::from(self.next_id)
    }

    // --- Inserts -----------------------------------------------------------

    pub fn insert_device_category(&mut self, category: DeviceCategory) -> Result<DeviceCategoryId> {
        if self
            .device_categories
            .values()
            .any(|existing| existing.name == category.name)
        {
            return Err(MenagerieError::Conflict(format!(
                "device category '{}' already exists",
                category.name
            )));
        }
        let id = category.id;
        debug!(%id, name = %category.name, "insert device category");
        self.device_categories.insert(id, category);
        Ok(id)
    }

    pub fn insert_term_category(&mut self, category: TermCategory) -> Result<TermCategoryId> {
        if self
            .term_categories
            .values()
            .any(|existing| existing.name == category.name)
        {
            return Err(MenagerieError::Conflict(format!(
                "term category '{}' already exists",
                category.name
            )));
        }
        let id = category.id;
        debug!(%id, name = %category.name, "insert term category");
        self.term_categories.insert(id, category);
        Ok(id)
    }

    pub fn insert_term(&mut self, term: Term) -> Result<TermId> {
        self.term_category(term.category)?;
        let id = term.id;
        self.terms.insert(id, term);
        Ok(id)
    }

    pub fn insert_item(&mut self, item: Item) -> ItemId {
        let id = item.id;
        self.items.insert(id, item);
        id
    }

    pub fn insert_collection_type(&mut self, collection_type: CollectionType) -> Result<CollectionTypeId> {
        if self
            .collection_types
            .values()
            .any(|existing| existing.name == collection_type.name)
        {
            return Err(MenagerieError::Conflict(format!(
                "collection type '{}' already exists",
                collection_type.name
            )));
        }
        for category in &collection_type.device_categories {
            self.device_category(*category)?;
        }
        let id = collection_type.id;
        debug!(%id, name = %collection_type.name, "insert collection type");
        self.collection_types.insert(id, collection_type);
        Ok(id)
    }

    pub fn insert_collection(&mut self, collection: Collection) -> Result<CollectionId> {
        self.collection_type(collection.collection_type)?;
        let id = collection.id;
        self.collections.insert(id, collection);
        Ok(id)
    }

    pub fn insert_sampling_event(&mut self, event: SamplingEvent) -> Result<SamplingEventId> {
        self.collection(event.collection)?;
        let id = event.id;
        self.sampling_events.insert(id, event);
        Ok(id)
    }

    pub fn insert_sampling_event_device(
        &mut self,
        device: SamplingEventDevice,
    ) -> Result<SamplingEventDeviceId> {
        self.sampling_event(device.sampling_event)?;
        self.device_category(device.device_category)?;
        let id = device.id;
        self.sampling_event_devices.insert(id, device);
        Ok(id)
    }

    pub fn insert_organism_type(&mut self, organism_type: OrganismType) -> Result<OrganismTypeId> {
        if self
            .organism_types
            .values()
            .any(|existing| existing.name == organism_type.name)
        {
            return Err(MenagerieError::Conflict(format!(
                "organism type '{}' already exists",
                organism_type.name
            )));
        }
        for category in &organism_type.term_categories {
            self.term_category(*category)?;
        }
        let id = organism_type.id;
        debug!(%id, name = %organism_type.name, "insert organism type");
        self.organism_types.insert(id, organism_type);
        Ok(id)
    }

    pub fn insert_capture_type(&mut self, capture_type: CaptureType) -> Result<CaptureTypeId> {
        if self
            .capture_types
            .values()
            .any(|existing| existing.name == capture_type.name)
        {
            return Err(MenagerieError::Conflict(format!(
                "capture type '{}' already exists",
                capture_type.name
            )));
        }
        self.organism_type(capture_type.organism_type)?;
        self.device_category(capture_type.device_category)?;
        for category in &capture_type.term_categories {
            self.term_category(*category)?;
        }
        let id = capture_type.id;
        debug!(%id, name = %capture_type.name, "insert capture type");
        self.capture_types.insert(id, capture_type);
        Ok(id)
    }

    /// Install the organism configuration for a collection type. The
    /// relation is 1:1; a second configuration for the same collection
    /// type is a conflict.
    pub fn insert_config(&mut self, config: CollectionOrganismConfig) -> Result<()> {
        let collection_type = self.collection_type(config.collection_type)?;
        if self.configs.contains_key(&config.collection_type) {
            return Err(MenagerieError::Conflict(format!(
                "collection type '{}' already has an organism configuration",
                collection_type.name
            )));
        }
        debug!(collection_type = %config.collection_type, "insert organism configuration");
        self.configs.insert(config.collection_type, config);
        Ok(())
    }

    /// Insert or replace an organism record. Content validation has
    /// already happened in the pipeline; this only enforces the optional
    /// unique-name constraint.
    pub(crate) fn upsert_organism(&mut self, organism: Organism) -> Result<OrganismId> {
        if let Some(name) = &organism.name {
            let taken = self
                .organisms
                .values()
                .any(|existing| existing.id != organism.id && existing.name.as_deref() == Some(name));
            if taken {
                return Err(MenagerieError::Conflict(format!(
                    "an organism named '{name}' already exists"
                )));
            }
        }
        let id = organism.id;
        debug!(%id, "save organism");
        self.organisms.insert(id, organism);
        Ok(id)
    }

    /// Insert or replace a capture record.
    pub(crate) fn upsert_capture(&mut self, capture: OrganismCapture) -> Result<OrganismCaptureId> {
        let id = capture.id;
        debug!(%id, "save organism capture");
        self.captures.insert(id, capture);
        Ok(id)
    }

    // --- Lookups -----------------------------------------------------------

    pub fn device_category(&self, id: DeviceCategoryId) -> Result<&DeviceCategory> {
        self.device_categories
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("device category", id))
    }

    pub fn term_category(&self, id: TermCategoryId) -> Result<&TermCategory> {
        self.term_categories
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("term category", id))
    }

    pub fn term(&self, id: TermId) -> Result<&Term> {
        self.terms
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("term", id))
    }

    pub fn collection_type(&self, id: CollectionTypeId) -> Result<&CollectionType> {
        self.collection_types
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("collection type", id))
    }

    pub fn collection(&self, id: CollectionId) -> Result<&Collection> {
        self.collections
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("collection", id))
    }

    pub fn sampling_event(&self, id: SamplingEventId) -> Result<&SamplingEvent> {
        self.sampling_events
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("sampling event", id))
    }

    pub fn sampling_event_device(&self, id: SamplingEventDeviceId) -> Result<&SamplingEventDevice> {
        self.sampling_event_devices
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("sampling event device", id))
    }

    pub fn organism_type(&self, id: OrganismTypeId) -> Result<&OrganismType> {
        self.organism_types
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("organism type", id))
    }

    pub fn capture_type(&self, id: CaptureTypeId) -> Result<&CaptureType> {
        self.capture_types
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("capture type", id))
    }

    /// The organism configuration for a collection type, if one exists.
    pub fn config(&self, collection_type: CollectionTypeId) -> Option<&CollectionOrganismConfig> {
        self.configs.get(&collection_type)
    }

    pub(crate) fn config_mut(
        &mut self,
        collection_type: CollectionTypeId,
    ) -> Result<&mut CollectionOrganismConfig> {
        self.configs
            .get_mut(&collection_type)
            .ok_or_else(|| MenagerieError::not_found("organism configuration", collection_type))
    }

    pub fn organism(&self, id: OrganismId) -> Result<&Organism> {
        self.organisms
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("organism", id))
    }

    pub fn capture(&self, id: OrganismCaptureId) -> Result<&OrganismCapture> {
        self.captures
            .get(&id)
            .ok_or_else(|| MenagerieError::not_found("organism capture", id))
    }

    /// All organisms, in insertion order.
    pub fn organisms(&self) -> impl Iterator<Item = &Organism> {
        self.organisms.values()
    }

    /// All captures, in insertion order.
    pub fn captures(&self) -> impl Iterator<Item = &OrganismCapture> {
        self.captures.values()
    }

    /// All registered organism types, in registration order.
    pub fn organism_types(&self) -> impl Iterator<Item = &OrganismType> {
        self.organism_types.values()
    }

    /// All registered capture types, in registration order.
    pub fn capture_types(&self) -> impl Iterator<Item = &CaptureType> {
        self.capture_types.values()
    }

    // --- Deletions ---------------------------------------------------------
    //
    // Each removal encodes its relation's policy explicitly: protected
    // relations refuse to delete while referenced; the configuration's
    // join rows live inside it and are cascaded with it.

    /// Delete an organism type. Protected: fails while organisms, capture
    /// types, or configuration joins still reference it.
    pub fn remove_organism_type(&mut self, id: OrganismTypeId) -> Result<OrganismType> {
        let organism_type = self.organism_type(id)?;
        let name = organism_type.name.clone();

        let referencing_organisms = self
            .organisms
            .values()
            .filter(|organism| organism.organism_type == id)
            .count();
        if referencing_organisms > 0 {
            return Err(MenagerieError::Conflict(format!(
                "organism type '{name}' is referenced by {referencing_organisms} organism(s)"
            )));
        }
        if let Some(capture_type) = self
            .capture_types
            .values()
            .find(|capture_type| capture_type.organism_type == id)
        {
            return Err(MenagerieError::Conflict(format!(
                "organism type '{name}' is referenced by capture type '{}'",
                capture_type.name
            )));
        }
        if self
            .configs
            .values()
            .any(|config| config.allows_organism_type(id))
        {
            return Err(MenagerieError::Conflict(format!(
                "organism type '{name}' is still permitted by a collection-type configuration"
            )));
        }

        debug!(%id, name = %name, "remove organism type");
        self.organism_types
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("organism type", id))
    }

    /// Delete a capture type. Protected: fails while captures or
    /// configuration joins still reference it.
    pub fn remove_capture_type(&mut self, id: CaptureTypeId) -> Result<CaptureType> {
        let capture_type = self.capture_type(id)?;
        let name = capture_type.name.clone();

        let referencing_captures = self
            .captures
            .values()
            .filter(|capture| capture.capture_type == id)
            .count();
        if referencing_captures > 0 {
            return Err(MenagerieError::Conflict(format!(
                "capture type '{name}' is referenced by {referencing_captures} capture(s)"
            )));
        }
        if self
            .configs
            .values()
            .any(|config| config.allows_capture_type(id))
        {
            return Err(MenagerieError::Conflict(format!(
                "capture type '{name}' is still permitted by a collection-type configuration"
            )));
        }

        debug!(%id, name = %name, "remove capture type");
        self.capture_types
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("capture type", id))
    }

    /// Delete a collection type's organism configuration. Cascades: the
    /// join rows are part of the configuration and go with it. The types
    /// themselves are untouched.
    pub fn remove_config(&mut self, collection_type: CollectionTypeId) -> Result<CollectionOrganismConfig> {
        let config = self
            .configs
            .shift_remove(&collection_type)
            .ok_or_else(|| MenagerieError::not_found("organism configuration", collection_type))?;
        debug!(%collection_type, "remove organism configuration (joins cascade)");
        Ok(config)
    }

    /// Delete an organism. Protected: fails while captures reference it.
    pub fn remove_organism(&mut self, id: OrganismId) -> Result<Organism> {
        self.organism(id)?;
        let referencing_captures = self
            .captures
            .values()
            .filter(|capture| capture.organism == id)
            .count();
        if referencing_captures > 0 {
            return Err(MenagerieError::Conflict(format!(
                "organism {id} is referenced by {referencing_captures} capture(s)"
            )));
        }
        debug!(%id, "remove organism");
        self.organisms
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("organism", id))
    }

    /// Delete a capture. Nothing references captures; always allowed.
    pub fn remove_capture(&mut self, id: OrganismCaptureId) -> Result<OrganismCapture> {
        self.captures
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("organism capture", id))
    }

    /// Delete a term. Protected: fails while record labels reference it.
    pub fn remove_term(&mut self, id: TermId) -> Result<Term> {
        self.term(id)?;
        let referenced = self
            .organisms
            .values()
            .any(|organism| organism.labels.contains(&id))
            || self.captures.values().any(|capture| capture.labels.contains(&id));
        if referenced {
            return Err(MenagerieError::Conflict(format!(
                "term {id} is used as a label on existing records"
            )));
        }
        self.terms
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("term", id))
    }

    /// Delete a device category. Protected: fails while collection types,
    /// capture types, or deployed devices reference it.
    pub fn remove_device_category(&mut self, id: DeviceCategoryId) -> Result<DeviceCategory> {
        let category = self.device_category(id)?;
        let name = category.name.clone();

        if self
            .collection_types
            .values()
            .any(|collection_type| collection_type.allows_device_category(id))
        {
            return Err(MenagerieError::Conflict(format!(
                "device category '{name}' is allowed by a collection type"
            )));
        }
        if self
            .capture_types
            .values()
            .any(|capture_type| capture_type.device_category == id)
        {
            return Err(MenagerieError::Conflict(format!(
                "device category '{name}' is declared by a capture type"
            )));
        }
        if self
            .sampling_event_devices
            .values()
            .any(|device| device.device_category == id)
        {
            return Err(MenagerieError::Conflict(format!(
                "device category '{name}' is used by a deployed device"
            )));
        }

        self.device_categories
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("device category", id))
    }

    /// Delete a term category. Protected: fails while terms or type
    /// term-category sets reference it.
    pub fn remove_term_category(&mut self, id: TermCategoryId) -> Result<TermCategory> {
        let category = self.term_category(id)?;
        let name = category.name.clone();

        if self.terms.values().any(|term| term.category == id) {
            return Err(MenagerieError::Conflict(format!(
                "term category '{name}' still contains terms"
            )));
        }
        let allowed_by_type = self
            .organism_types
            .values()
            .any(|organism_type| organism_type.allows_term_category(id))
            || self
                .capture_types
                .values()
                .any(|capture_type| capture_type.allows_term_category(id));
        if allowed_by_type {
            return Err(MenagerieError::Conflict(format!(
                "term category '{name}' is allowed by a registered type"
            )));
        }

        self.term_categories
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("term category", id))
    }

    /// Delete a collection type. Protected while collections reference it;
    /// its organism configuration (if any) cascades.
    pub fn remove_collection_type(&mut self, id: CollectionTypeId) -> Result<CollectionType> {
        self.collection_type(id)?;
        if self
            .collections
            .values()
            .any(|collection| collection.collection_type == id)
        {
            return Err(MenagerieError::Conflict(format!(
                "collection type {id} still has collections"
            )));
        }
        self.configs.shift_remove(&id);
        self.collection_types
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("collection type", id))
    }

    /// Delete a sampling event device. Protected while captures reference
    /// it.
    pub fn remove_sampling_event_device(
        &mut self,
        id: SamplingEventDeviceId,
    ) -> Result<SamplingEventDevice> {
        self.sampling_event_device(id)?;
        if self
            .captures
            .values()
            .any(|capture| capture.sampling_event_device == id)
        {
            return Err(MenagerieError::Conflict(format!(
                "sampling event device {id} is referenced by existing captures"
            )));
        }
        self.sampling_event_devices
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("sampling event device", id))
    }

    /// Delete a sampling event. Protected while devices reference it.
    pub fn remove_sampling_event(&mut self, id: SamplingEventId) -> Result<SamplingEvent> {
        self.sampling_event(id)?;
        if self
            .sampling_event_devices
            .values()
            .any(|device| device.sampling_event == id)
        {
            return Err(MenagerieError::Conflict(format!(
                "sampling event {id} still has deployed devices"
            )));
        }
        self.sampling_events
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("sampling event", id))
    }

    /// Delete an item. Protected while any record references it.
    pub fn remove_item(&mut self, id: ItemId) -> Result<Item> {
        let referenced = self.organisms.values().any(|organism| organism.items.contains(&id))
            || self.captures.values().any(|capture| capture.items.contains(&id));
        if referenced {
            return Err(MenagerieError::Conflict(format!(
                "item {id} is associated with existing records"
            )));
        }
        self.items
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("item", id))
    }

    /// Delete a collection. Protected: fails while organisms or sampling
    /// events reference it.
    pub fn remove_collection(&mut self, id: CollectionId) -> Result<Collection> {
        self.collection(id)?;
        if self
            .organisms
            .values()
            .any(|organism| organism.collection == id)
        {
            return Err(MenagerieError::Conflict(format!(
                "collection {id} still contains organisms"
            )));
        }
        if self
            .sampling_events
            .values()
            .any(|event| event.collection == id)
        {
            return Err(MenagerieError::Conflict(format!(
                "collection {id} still has sampling events"
            )));
        }
        self.collections
            .shift_remove(&id)
            .ok_or_else(|| MenagerieError::not_found("collection", id))
    }
}
