//! Per-collection-type organism configuration.
//!
//! A [`CollectionOrganismConfig`] decides whether a collection type uses
//! organisms at all, and which organism/capture types are permitted within
//! it. Each permitted type is held as a join row carrying an additional
//! JSON-Schema overlay for collection-type-specific metadata.

mod joins;
mod organism_config;

pub use joins::{ConfigCaptureType, ConfigOrganismType};
pub use organism_config::CollectionOrganismConfig;
