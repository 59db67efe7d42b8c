//! Menagerie: organism and organism-capture domain model for
//! biodiversity data collections.
//!
//! The model covers two record kinds, organisms (specimens/individuals)
//! and organism captures (observations of organisms via devices),
//! together with per-collection-type configuration that determines which
//! organism types, capture types, and metadata schemas are legal in a
//! given collection. The core is the validation-rule graph enforced
//! before a record is saved:
//!
//! - the collection's type must have organism support enabled;
//! - the record's declared type must be permitted by that collection
//!   type's configuration;
//! - JSON metadata must satisfy both the base type's schema and the
//!   collection-type overlay;
//! - captures must use a device of the capture type's declared category,
//!   on an organism of a matching type.
//!
//! # Example
//!
//! ```
//! use menagerie::{Menagerie, MetadataSchema, Organism, OrganismType};
//!
//! let mut zoo = Menagerie::new();
//! let camera = zoo.add_device_category("Camera")?;
//! let forest = zoo.add_collection_type("Forest Survey", [camera])?;
//! let collection = zoo.add_collection("Spring survey", forest)?;
//!
//! let bird_id = zoo.allocate_id();
//! zoo.register_organism_type(OrganismType::new(bird_id, "Bird"))?;
//! zoo.configure_organisms(forest, true)?;
//! zoo.allow_organism_type(forest, bird_id, MetadataSchema::simple())?;
//!
//! let id = zoo.allocate_id();
//! let organism = Organism::new(id, collection, bird_id).with_name("Hawk #7");
//! zoo.save_organism(organism)?;
//! # Ok::<(), menagerie::MenagerieError>(())
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod platform;
pub mod records;
pub mod schema;
pub mod store;
pub mod types;
pub mod validation;

mod menagerie;

pub use crate::menagerie::Menagerie;
pub use config::{CollectionOrganismConfig, ConfigCaptureType, ConfigOrganismType};
pub use error::{MenagerieError, Result};
pub use records::{Organism, OrganismCapture};
pub use schema::{MetadataSchema, SchemaViolation};
pub use store::Store;
pub use types::{CaptureType, OrganismType};
pub use validation::FieldErrors;
