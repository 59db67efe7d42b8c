//! The type registry: reference entities describing kinds of organisms and
//! kinds of organism captures.

mod capture_type;
mod organism_type;

pub use capture_type::CaptureType;
pub use organism_type::OrganismType;
