use crate::PokemonType;
use serde::{Deserialize, Serialize};

/// National Pokédex number, as used by the remote provider.
pub type SpeciesId = u32;

/// Base stat block of a species. Any field may be missing when the provider
/// returned a partial payload; consumers substitute their own floor values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    #[serde(default)]
    pub hp: Option<u16>,
    #[serde(default)]
    pub attack: Option<u16>,
    #[serde(default)]
    pub defense: Option<u16>,
    #[serde(default)]
    pub sp_attack: Option<u16>,
    #[serde(default)]
    pub sp_defense: Option<u16>,
    #[serde(default)]
    pub speed: Option<u16>,
}

impl BaseStats {
    /// A complete stat block, mostly for tests and static catalogues.
    pub fn new(hp: u16, attack: u16, defense: u16, sp_attack: u16, sp_defense: u16, speed: u16) -> Self {
        Self {
            hp: Some(hp),
            attack: Some(attack),
            defense: Some(defense),
            sp_attack: Some(sp_attack),
            sp_defense: Some(sp_defense),
            speed: Some(speed),
        }
    }

    pub fn is_complete(&self) -> bool {
        [
            self.hp,
            self.attack,
            self.defense,
            self.sp_attack,
            self.sp_defense,
            self.speed,
        ]
        .iter()
        .all(Option::is_some)
    }
}

/// Entry of the provider's species list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesSummary {
    pub id: SpeciesId,
    pub name: String,
    pub sprite: String,
}

/// A species as known inside one zone: the list entry plus whatever metadata
/// has been hydrated so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    pub sprite: String,
    pub types: Vec<PokemonType>,
    pub base_stats: Option<BaseStats>,
    /// True when the species has no pre-evolution.
    pub is_base: bool,
    pub evolves_to: Option<SpeciesId>,
}

impl Species {
    pub fn from_summary(summary: SpeciesSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            sprite: summary.sprite,
            types: Vec::new(),
            base_stats: None,
            is_base: false,
            evolves_to: None,
        }
    }

    pub fn summary(&self) -> SpeciesSummary {
        SpeciesSummary {
            id: self.id,
            name: self.name.clone(),
            sprite: self.sprite.clone(),
        }
    }
}
