//! Organism-capture records: observations of an organism via a device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fmt;

use crate::ids::{CaptureTypeId, ItemId, OrganismCaptureId, OrganismId, SamplingEventDeviceId, TermId};

/// A concrete observation of an organism, produced by a device deployed
/// during a sampling event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganismCapture {
    pub id: OrganismCaptureId,
    /// The captured organism.
    pub organism: OrganismId,
    /// Declared capture type.
    pub capture_type: CaptureTypeId,
    /// The device-and-context record that produced this capture.
    pub sampling_event_device: SamplingEventDeviceId,
    /// Additional metadata, validated against the collection-type overlay.
    pub additional_metadata: Value,
    /// Controlled-vocabulary labels describing the capture.
    pub labels: BTreeSet<TermId>,
    /// Items associated with this capture.
    pub items: BTreeSet<ItemId>,
    pub created_on: DateTime<Utc>,
}

impl OrganismCapture {
    /// Create a capture with an empty metadata document and no labels.
    pub fn new(
        id: OrganismCaptureId,
        organism: OrganismId,
        capture_type: CaptureTypeId,
        sampling_event_device: SamplingEventDeviceId,
    ) -> Self {
        Self {
            id,
            organism,
            capture_type,
            sampling_event_device,
            additional_metadata: json!({}),
            labels: BTreeSet::new(),
            items: BTreeSet::new(),
            created_on: Utc::now(),
        }
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

impl fmt::Display for OrganismCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capture {}", self.id)
    }
}
