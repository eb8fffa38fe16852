// Pokemon Zones Schema - Shared type definitions
// This crate contains the static data definitions shared by the encounter
// engine and anything that reads or writes its persisted state.

// Re-export the main types
pub use pokemon_types::*;
pub use species_data::*;
pub use zone_data::*;

pub mod pokemon_types;
pub mod species_data;
pub mod zone_data;
