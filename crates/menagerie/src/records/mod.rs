//! Concrete organism and capture records.

mod capture;
mod organism;

pub use capture::OrganismCapture;
pub use organism::Organism;
