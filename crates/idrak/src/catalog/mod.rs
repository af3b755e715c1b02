//! Facility Catalog
//!
//! Static seed data (floors, rooms, incidents, sensors, drills) and the lookup
//! helpers the shell uses to resolve ids into records.

mod facility;
mod loader;

pub use facility::*;
pub use loader::*;
