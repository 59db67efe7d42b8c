//! Capture types: reference entities describing a way of observing an
//! organism with a device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ids::{CaptureTypeId, DeviceCategoryId, OrganismTypeId, TermCategoryId};
use crate::platform::{Term, TermCategory};

/// A kind of organism capture, e.g. "Camera Trap Photo".
///
/// A capture type is pinned to exactly one organism type (what is being
/// captured) and one device category (what produces the capture). Both are
/// cross-checked against concrete records at validation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureType {
    pub id: CaptureTypeId,
    /// Unique type name.
    pub name: String,
    pub description: String,
    /// The organism type captures of this type observe.
    pub organism_type: OrganismTypeId,
    /// The device category captures of this type are produced by.
    pub device_category: DeviceCategoryId,
    /// Term categories valid for describing captures of this type.
    pub term_categories: BTreeSet<TermCategoryId>,
    pub created_on: DateTime<Utc>,
}

impl CaptureType {
    pub fn new(
        id: CaptureTypeId,
        name: impl Into<String>,
        organism_type: OrganismTypeId,
        device_category: DeviceCategoryId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            organism_type,
            device_category,
            term_categories: BTreeSet::new(),
            created_on: Utc::now(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Permit a term category for labels on captures of this type.
    pub fn with_term_category(mut self, category: TermCategoryId) -> Self {
        self.term_categories.insert(category);
        self
    }

    /// True when terms of the given category may label captures of this
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
                "terms of category '{}' are not allowed for captures of type '{}' (term: '{}')",
                category.name, self.name, term.value
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TermId;

    #[test]
    fn test_term_category_membership() {
        let capture_type = CaptureType::new(
            CaptureTypeId(1),
            "Camera Trap Photo",
            OrganismTypeId(1),
            DeviceCategoryId(1),
        )
        .with_term_category(TermCategoryId(3));

        let behavior = TermCategory::new(TermCategoryId(3), "Behavior");
        let habitat = TermCategory::new(TermCategoryId(4), "Habitat");
        let foraging = Term::new(TermId(1), behavior.id, "Foraging");
        let riparian = Term::new(TermId(2), habitat.id, "Riparian");

        assert!(capture_type.allows_term_category(behavior.id));
        assert!(capture_type.validate_term(&foraging, &behavior).is_ok());
        let message = capture_type.validate_term(&riparian, &habitat).unwrap_err();
        assert!(message.contains("'Camera Trap Photo'"));
    }
}
