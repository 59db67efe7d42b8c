//! Main Menagerie struct and public API.
//!
//! `Menagerie` owns the store and is the write path: every record goes
//! through the validation pipeline before it is persisted, and every
//! configuration change is checked against its own invariants.

use std::path::Path;

use tracing::debug;

use crate::config::{CollectionOrganismConfig, ConfigCaptureType, ConfigOrganismType};
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
use crate::schema::MetadataSchema;
use crate::store::Store;
use crate::types::{CaptureType, OrganismType};
use crate::validation::{FieldErrors, validate_capture, validate_organism};

/// The organism domain model over one store.
#[derive(Debug, Clone, Default)]
pub struct Menagerie {
    store: Store,
}

impl Menagerie {
    /// Create a menagerie over an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing store.
    pub fn with_store(store: Store) -> Self {
        Self { store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Hand out a fresh typed id for building an entity.
    pub fn allocate_id<I: From<u64>>(&mut self) -> I {
        self.store.allocate_id()
    }

    // --- Platform entities -------------------------------------------------

    /// Register a device category, e.g. "Camera".
    pub fn add_device_category(&mut self, name: &str) -> Result<DeviceCategoryId> {
        let id = self.store.allocate_id();
        self.store
            .insert_device_category(DeviceCategory::new(id, name))
    }

    /// Register a term category, e.g. "Life Stage".
    pub fn add_term_category(&mut self, name: &str) -> Result<TermCategoryId> {
        let id = self.store.allocate_id();
        self.store.insert_term_category(TermCategory::new(id, name))
    }

    /// Register a term within a category.
    pub fn add_term(&mut self, category: TermCategoryId, value: &str) -> Result<TermId> {
        let id = self.store.allocate_id();
        self.store.insert_term(Term::new(id, category, value))
    }

    /// Register an opaque associated item.
    pub fn add_item(&mut self) -> ItemId {
        let id = self.store.allocate_id();
        self.store.insert_item(Item::new(id))
    }

    /// Register a collection type with its allowed device categories.
    pub fn add_collection_type(
        &mut self,
        name: &str,
        device_categories: impl IntoIterator<Item = DeviceCategoryId>,
    ) -> Result<CollectionTypeId> {
        let id = self.store.allocate_id();
        let mut collection_type = CollectionType::new(id, name);
        for category in device_categories {
            collection_type = collection_type.with_device_category(category);
        }
        self.store.insert_collection_type(collection_type)
    }

    /// Register a collection of a given type.
    pub fn add_collection(&mut self, name: &str, collection_type: CollectionTypeId) -> Result<CollectionId> {
        let id = self.store.allocate_id();
        self.store
            .insert_collection(Collection::new(id, name, collection_type))
    }

    /// Register a sampling event within a collection.
    pub fn add_sampling_event(&mut self, collection: CollectionId) -> Result<SamplingEventId> {
        let id = self.store.allocate_id();
        self.store
            .insert_sampling_event(SamplingEvent::new(id, collection))
    }

    /// Register a device deployment within a sampling event.
    pub fn add_sampling_event_device(
        &mut self,
        sampling_event: SamplingEventId,
        device_category: DeviceCategoryId,
    ) -> Result<SamplingEventDeviceId> {
        let id = self.store.allocate_id();
        self.store
            .insert_sampling_event_device(SamplingEventDevice::new(
                id,
                sampling_event,
                device_category,
            ))
    }

    // --- Type registry -----------------------------------------------------

    /// Register an organism type built with [`OrganismType::new`] and its
    /// `with_*` methods (allocate the id through [`Self::allocate_id`]).
    pub fn register_organism_type(&mut self, organism_type: OrganismType) -> Result<OrganismTypeId> {
        self.store.insert_organism_type(organism_type)
    }

    /// Register a capture type.
    pub fn register_capture_type(&mut self, capture_type: CaptureType) -> Result<CaptureTypeId> {
        self.store.insert_capture_type(capture_type)
    }

    // --- Collection configuration ------------------------------------------

    /// Install the organism configuration for a collection type.
    pub fn configure_organisms(
        &mut self,
        collection_type: CollectionTypeId,
        use_organisms: bool,
    ) -> Result<()> {
        self.store
            .insert_config(CollectionOrganismConfig::new(collection_type, use_organisms))
    }

    /// Flip the organisms-enabled toggle on an existing configuration.
    pub fn set_use_organisms(&mut self, collection_type: CollectionTypeId, use_organisms: bool) -> Result<()> {
        let config = self.store.config_mut(collection_type)?;
        config.use_organisms = use_organisms;
        debug!(%collection_type, use_organisms, "organism toggle updated");
        Ok(())
    }

    /// Permit an organism type in a collection type, with an overlay schema
    /// for collection-type-specific additional metadata.
    ///
    /// Fails with a conflict if the pair is already joined.
    pub fn allow_organism_type(
        &mut self,
        collection_type: CollectionTypeId,
        organism_type: OrganismTypeId,
        metadata_schema: MetadataSchema,
    ) -> Result<()> {
        let organism_type_ref = self.store.organism_type(organism_type)?;
        let type_name = organism_type_ref.name.clone();
        let config = self.store.config_mut(collection_type)?;
        if config.allows_organism_type(organism_type) {
            return Err(MenagerieError::Conflict(format!(
                "organism type '{type_name}' is already permitted in this collection type"
            )));
        }
        config.organism_types.insert(
            organism_type,
            ConfigOrganismType::new(collection_type, organism_type, metadata_schema),
        );
        debug!(%collection_type, %organism_type, "organism type permitted");
        Ok(())
    }

    /// Permit a capture type in a collection type, with an overlay schema.
    ///
    /// Two invariants are checked before the join is created: the
    /// configuration must already permit the capture type's organism type,
    /// and the collection type must allow the capture type's device
    /// category.
    pub fn allow_capture_type(
        &mut self,
        collection_type: CollectionTypeId,
        capture_type: CaptureTypeId,
        metadata_schema: MetadataSchema,
    ) -> Result<()> {
        let capture_type_ref = self.store.capture_type(capture_type)?;
        let capture_type_name = capture_type_ref.name.clone();
        let device_category = capture_type_ref.device_category;
        let organism_type = self.store.organism_type(capture_type_ref.organism_type)?;
        let collection_type_ref = self.store.collection_type(collection_type)?;
        let config = self
            .store
            .config(collection_type)
            .ok_or_else(|| MenagerieError::not_found("organism configuration", collection_type))?;

        let mut errors = FieldErrors::new();
        if let Err(message) =
            config.resolve_organism_type(organism_type, &collection_type_ref.name)
        {
            errors.push("capture_type", message);
        }
        if !collection_type_ref.allows_device_category(device_category) {
            let category_name = self
                .store
                .device_category(device_category)
                .map(|category| category.name.clone())
                .unwrap_or_else(|_| device_category.to_string());
            errors.push(
                "capture_type",
                format!(
                    "devices of category '{category_name}' are not allowed in collections of type '{}'",
                    collection_type_ref.name
                ),
            );
        }
        errors.into_result()?;

        let config = self.store.config_mut(collection_type)?;
        if config.allows_capture_type(capture_type) {
            return Err(MenagerieError::Conflict(format!(
                "capture type '{capture_type_name}' is already permitted in this collection type"
            )));
        }
        config.capture_types.insert(
            capture_type,
            ConfigCaptureType::new(collection_type, capture_type, metadata_schema),
        );
        debug!(%collection_type, %capture_type, "capture type permitted");
        Ok(())
    }

    /// Withdraw an organism type from a collection type. The join row is
    /// deleted; the type itself is untouched.
    pub fn disallow_organism_type(
        &mut self,
        collection_type: CollectionTypeId,
        organism_type: OrganismTypeId,
    ) -> Result<()> {
        let config = self.store.config_mut(collection_type)?;
        config
            .organism_types
            .shift_remove(&organism_type)
            .ok_or_else(|| MenagerieError::not_found("organism type join", organism_type))?;
        Ok(())
    }

    /// Withdraw a capture type from a collection type.
    pub fn disallow_capture_type(
        &mut self,
        collection_type: CollectionTypeId,
        capture_type: CaptureTypeId,
    ) -> Result<()> {
        let config = self.store.config_mut(collection_type)?;
        config
            .capture_types
            .shift_remove(&capture_type)
            .ok_or_else(|| MenagerieError::not_found("capture type join", capture_type))?;
        Ok(())
    }

    /// Delete a collection type's configuration; its joins cascade.
    pub fn remove_configuration(&mut self, collection_type: CollectionTypeId) -> Result<()> {
        self.store.remove_config(collection_type).map(|_| ())
    }

    // --- Records -----------------------------------------------------------

    /// Validate an organism without saving it.
    pub fn validate_organism(&self, organism: &Organism) -> Result<()> {
        validate_organism(&self.store, organism)?;
        Ok(())
    }

    /// Validate and save an organism. Validation runs on every save.
    pub fn save_organism(&mut self, organism: Organism) -> Result<OrganismId> {
        validate_organism(&self.store, &organism)?;
        self.store.upsert_organism(organism)
    }

    /// Validate a capture without saving it.
    pub fn validate_capture(&self, capture: &OrganismCapture) -> Result<()> {
        validate_capture(&self.store, capture)?;
        Ok(())
    }

    /// Validate and save a capture. Validation runs on every save.
    pub fn save_capture(&mut self, capture: OrganismCapture) -> Result<OrganismCaptureId> {
        validate_capture(&self.store, &capture)?;
        self.store.upsert_capture(capture)
    }

    /// Delete an organism (protected while captures reference it).
    pub fn remove_organism(&mut self, id: OrganismId) -> Result<()> {
        self.store.remove_organism(id).map(|_| ())
    }

    /// Delete a capture.
    pub fn remove_capture(&mut self, id: OrganismCaptureId) -> Result<()> {
        self.store.remove_capture(id).map(|_| ())
    }

    /// Delete an organism type (protected while referenced).
    pub fn remove_organism_type(&mut self, id: OrganismTypeId) -> Result<()> {
        self.store.remove_organism_type(id).map(|_| ())
    }

    /// Delete a capture type (protected while referenced).
    pub fn remove_capture_type(&mut self, id: CaptureTypeId) -> Result<()> {
        self.store.remove_capture_type(id).map(|_| ())
    }

    // --- Persistence -------------------------------------------------------

    /// Save the whole store to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.store.save(path)
    }

    /// Load a menagerie from a JSON file written by [`Self::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_store(Store::load(path)?))
    }
}
