//! JSON-Schema documents for type-level metadata validation.
//!
//! Organism types carry a schema for identification info, and every
//! collection-type join carries an overlay schema for additional metadata.
//! This module wraps those documents and the `jsonschema` crate behind a
//! small pass/fail-with-reasons interface.

mod document;

pub use document::{MetadataSchema, SchemaViolation};
