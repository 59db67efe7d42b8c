//! Cross-entity validation run before a record is saved.
//!
//! Validation is an explicit, ordered pipeline (not a lifecycle hook):
//! each check runs in a fixed order, all failures accumulate into a
//! [`FieldErrors`] keyed by the originating input field, and the caller
//! gets the whole set back at once.

mod field_errors;
mod pipeline;

pub use field_errors::FieldErrors;
pub use pipeline::{validate_capture, validate_organism};
