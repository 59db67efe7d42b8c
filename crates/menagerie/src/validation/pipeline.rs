//! Ordered validation pipelines for organism and capture records.

use tracing::debug;

use crate::config::CollectionOrganismConfig;
use crate::ids::{CollectionTypeId, TermId};
use crate::platform::CollectionType;
use crate::records::{Organism, OrganismCapture};
use crate::store::Store;
use crate::types::CaptureType;

use super::FieldErrors;

/// Validate an organism record against the store's configuration.
///
/// Pipeline, in order:
/// 1. the owning collection's type must have an enabled organism
///    configuration;
/// 2. the declared organism type must be permitted by that configuration;
/// 3. identification info must satisfy the base type's schema;
/// 4. additional metadata must satisfy the collection-type overlay;
/// 5. every label's term category must be allowed by the organism type.
///
/// All failures accumulate; the record is valid iff the result is `Ok`.
/// Validation only reads the store, so re-validating an unchanged record
/// is idempotent.
pub fn validate_organism(store: &Store, organism: &Organism) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let context = resolve_collection_context(store, organism.collection, &mut errors);

    let organism_type = store.organism_types.get(&organism.organism_type);
    if organism_type.is_none() {
        errors.push(
            "organism_type",
            format!("organism type {} does not exist", organism.organism_type),
        );
    }

    // Membership + overlay need both the type and an enabled config.
    let join = match (organism_type, &context) {
        (Some(organism_type), Some((collection_type, config))) => {
            match config.resolve_organism_type(organism_type, &collection_type.name) {
                Ok(join) => Some(join),
                Err(message) => {
                    errors.push("organism_type", message);
                    None
                }
            }
        }
        _ => None,
    };

    if let Some(organism_type) = organism_type {
        if let Err(messages) = organism_type.validate_identification_info(&organism.identification_info)
        {
            for message in messages {
                errors.push("identification_info", message);
            }
        }
    }

    if let Some(join) = join {
        if let Err(messages) = join.validate_additional_metadata(&organism.additional_metadata) {
            for message in messages {
                errors.push("additional_metadata", message);
            }
        }
    }

    if let Some(organism_type) = organism_type {
        validate_labels(store, &organism.labels, &mut errors, |term, category| {
            organism_type.validate_term(term, category)
        });
    }

    debug!(
        organism = %organism.id,
        failures = errors.message_count(),
        "organism validation finished"
    );
    errors.into_result()
}

/// Validate a capture record against the store's configuration.
///
/// The collection context is derived through the capture's sampling-event
/// device: device → sampling event → collection → collection type.
///
/// Pipeline, in order:
/// 1. the derived collection type must have an enabled organism
///    configuration;
/// 2. the declared capture type must be permitted by that configuration;
/// 3. the capture type's organism type must match the linked organism's;
/// 4. the capture type's device category must match the device that
///    produced the capture;
/// 5. additional metadata must satisfy the collection-type overlay;
/// 6. every label's term category must be allowed by the capture type.
pub fn validate_capture(store: &Store, capture: &OrganismCapture) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let device = store.sampling_event_devices.get(&capture.sampling_event_device);
    let context = match device {
        Some(device) => {
            let event = store.sampling_events.get(&device.sampling_event);
            match event {
                Some(event) => resolve_collection_context(store, event.collection, &mut errors),
                None => {
                    errors.push(
                        "sampling_event_device",
                        format!("sampling event {} does not exist", device.sampling_event),
                    );
                    None
                }
            }
        }
        None => {
            errors.push(
                "sampling_event_device",
                format!(
                    "sampling event device {} does not exist",
                    capture.sampling_event_device
                ),
            );
            None
        }
    };

    let capture_type = store.capture_types.get(&capture.capture_type);
    if capture_type.is_none() {
        errors.push(
            "capture_type",
            format!("capture type {} does not exist", capture.capture_type),
        );
    }

    let organism = store.organisms.get(&capture.organism);
    if organism.is_none() {
        errors.push(
            "organism",
            format!("organism {} does not exist", capture.organism),
        );
    }

    let join = match (capture_type, &context) {
        (Some(capture_type), Some((collection_type, config))) => {
            match config.resolve_capture_type(capture_type, &collection_type.name) {
                Ok(join) => Some(join),
                Err(message) => {
                    errors.push("capture_type", message);
                    None
                }
            }
        }
        _ => None,
    };

    if let (Some(capture_type), Some(organism)) = (capture_type, organism) {
        if capture_type.organism_type != organism.organism_type {
            errors.push(
                "organism",
                organism_mismatch_message(store, capture_type, organism),
            );
        }
    }

    if let (Some(capture_type), Some(device)) = (capture_type, device) {
        if capture_type.device_category != device.device_category {
            errors.push(
                "sampling_event_device",
                device_mismatch_message(store, capture_type, device.device_category),
            );
        }
    }

    if let Some(join) = join {
        if let Err(messages) = join.validate_additional_metadata(&capture.additional_metadata) {
            for message in messages {
                errors.push("additional_metadata", message);
            }
        }
    }

    if let Some(capture_type) = capture_type {
        validate_labels(store, &capture.labels, &mut errors, |term, category| {
            capture_type.validate_term(term, category)
        });
    }

    debug!(
        capture = %capture.id,
        failures = errors.message_count(),
        "capture validation finished"
    );
    errors.into_result()
}

/// Walk collection → collection type → enabled configuration, recording a
/// `"collection"` failure at the first broken link. Returns the collection
/// type and configuration when the whole chain holds.
fn resolve_collection_context<'a>(
    store: &'a Store,
    collection: crate::ids::CollectionId,
    errors: &mut FieldErrors,
) -> Option<(&'a CollectionType, &'a CollectionOrganismConfig)> {
    let Some(collection) = store.collections.get(&collection) else {
        errors.push("collection", format!("collection {collection} does not exist"));
        return None;
    };
    let Some(collection_type) = store.collection_types.get(&collection.collection_type) else {
        errors.push(
            "collection",
            format!("collection type {} does not exist", collection.collection_type),
        );
        return None;
    };
    match enabled_config(store, collection_type.id) {
        Some(config) => Some((collection_type, config)),
        None => {
            errors.push("collection", "this collection does not allow organisms");
            None
        }
    }
}

/// The collection type's configuration, but only when organisms are
/// enabled. A present-but-disabled configuration counts as absent.
fn enabled_config(store: &Store, collection_type: CollectionTypeId) -> Option<&CollectionOrganismConfig> {
    store
        .configs
        .get(&collection_type)
        .filter(|config| config.use_organisms)
}

fn validate_labels<'a>(
    store: &'a Store,
    labels: &std::collections::BTreeSet<TermId>,
    errors: &mut FieldErrors,
    check: impl Fn(&'a crate::platform::Term, &'a crate::platform::TermCategory) -> Result<(), String>,
) {
    for term_id in labels {
        let Some(term) = store.terms.get(term_id) else {
            errors.push("labels", format!("term {term_id} does not exist"));
            continue;
        };
        let Some(category) = store.term_categories.get(&term.category) else {
            errors.push(
                "labels",
                format!("term category {} does not exist", term.category),
            );
            continue;
        };
        if let Err(message) = check(term, category) {
            errors.push("labels", message);
        }
    }
}

fn organism_mismatch_message(store: &Store, capture_type: &CaptureType, organism: &Organism) -> String {
    let expected = type_name(store, capture_type.organism_type);
    let actual = type_name(store, organism.organism_type);
    format!(
        "capture type '{}' captures organisms of type '{expected}', but organism {} is of type '{actual}'",
        capture_type.name, organism.id
    )
}

fn device_mismatch_message(
    store: &Store,
    capture_type: &CaptureType,
    actual: crate::ids::DeviceCategoryId,
) -> String {
    let expected = device_category_name(store, capture_type.device_category);
    let actual = device_category_name(store, actual);
    format!(
        "capture type '{}' requires a device of category '{expected}', but the capture was made with a '{actual}' device",
        capture_type.name
    )
}

fn type_name(store: &Store, id: crate::ids::OrganismTypeId) -> String {
    store
        .organism_types
        .get(&id)
        .map(|organism_type| organism_type.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn device_category_name(store: &Store, id: crate::ids::DeviceCategoryId) -> String {
    store
        .device_categories
        .get(&id)
        .map(|category| category.name.clone())
        .unwrap_or_else(|| id.to_string())
}
