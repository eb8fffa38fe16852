use crate::SpeciesId;
use serde::{Deserialize, Serialize};

/// Contiguous slice of the species catalogue explored as one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// 1-based ordinal.
    pub id: u32,
    pub name: String,
    pub start_id: SpeciesId,
    pub end_id: SpeciesId,
    pub min_level: u8,
    pub max_level: u8,
    /// Highest roster level needed before the zone can be opened.
    pub required_level: u8,
}

impl Zone {
    pub fn contains(&self, species_id: SpeciesId) -> bool {
        (self.start_id..=self.end_id).contains(&species_id)
    }

    pub fn species_count(&self) -> u32 {
        self.end_id.saturating_sub(self.start_id) + 1
    }

    /// 0-based position of the zone in the catalogue.
    pub fn index(&self) -> u32 {
        self.id.saturating_sub(1)
    }
}
