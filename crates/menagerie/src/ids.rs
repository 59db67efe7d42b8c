//! Typed identifiers for every entity in the store.
//!
//! Ids are plain sequential integers assigned by the store at insertion.
//! Wrapping them in per-entity newtypes keeps cross-entity references from
//! being mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Define a u64 id newtype with serde and Display support.
macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

id_type!(
    /// Identifier of a [`crate::platform::CollectionType`].
    CollectionTypeId
);
id_type!(
    /// Identifier of a [`crate::platform::Collection`].
    CollectionId
);
id_type!(
    /// Identifier of a [`crate::platform::SamplingEvent`].
    SamplingEventId
);
id_type!(
    /// Identifier of a [`crate::platform::SamplingEventDevice`].
    SamplingEventDeviceId
);
id_type!(
    /// Identifier of a [`crate::platform::DeviceCategory`].
    DeviceCategoryId
);
id_type!(
    /// Identifier of a [`crate::platform::TermCategory`].
    TermCategoryId
);
id_type!(
    /// Identifier of a [`crate::platform::Term`].
    TermId
);
id_type!(
    /// Identifier of a [`crate::platform::Item`].
    ItemId
);
id_type!(
    /// Identifier of an [`crate::types::OrganismType`].
    OrganismTypeId
);
id_type!(
    /// Identifier of a [`crate::types::CaptureType`].
    CaptureTypeId
);
id_type!(
    /// Identifier of an [`crate::records::Organism`].
    OrganismId
);
id_type!(
    /// Identifier of an [`crate::records::OrganismCapture`].
    OrganismCaptureId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_raw_integer() {
        assert_eq!(OrganismTypeId(7).to_string(), "7");
        assert_eq!(CollectionId::from(42).to_string(), "42");
    }

    #[test]
    fn test_serde_transparent() {
        let id = CaptureTypeId(3);
        assert_eq!(serde_json::to_string(&id).unwrap(), "3");
        let back: CaptureTypeId = serde_json::from_str("3").unwrap();
        assert_eq!(back, id);
    }
}
