use crate::encounter::{EncounterId, WildEncounter};
use crate::errors::ActionResult;
use crate::pokemon::{InstanceId, RosterEntry};
use crate::rng::GameRng;
use crate::roster::Roster;
use schema::{BaseStats, PokemonType, Species, SpeciesId};

/// A builder for creating test roster entries with common defaults.
///
/// # Example
/// ```ignore
/// let entry = TestEntryBuilder::new("p1", 25, "pikachu", 25)
///     .with_types(vec![PokemonType::Electric])
///     .with_base_stats(BaseStats::new(35, 55, 40, 50, 50, 90))
///     .build();
/// ```
pub struct TestEntryBuilder {
    id: String,
    species_id: SpeciesId,
    name: String,
    level: u8,
    types: Vec<PokemonType>,
    base_stats: Option<BaseStats>,
    in_team: bool,
    fainted_until: Option<u64>,
    xp: u32,
}

impl TestEntryBuilder {
    /// Creates a new builder for a team member with no metadata.
    pub fn new(id: &str, species_id: SpeciesId, name: &str, level: u8) -> Self {
        Self {
            id: id.to_string(),
            species_id,
            name: name.to_string(),
            level,
            types: Vec::new(),
            base_stats: None,
            in_team: true,
            fainted_until: None,
            xp: 0,
        }
    }

    pub fn with_types(mut self, types: Vec<PokemonType>) -> Self {
        self.types = types;
        self
    }

    pub fn with_base_stats(mut self, base_stats: BaseStats) -> Self {
        self.base_stats = Some(base_stats);
        self
    }

    pub fn in_team(mut self, in_team: bool) -> Self {
        self.in_team = in_team;
        self
    }

    pub fn fainted_until(mut self, until: u64) -> Self {
        self.fainted_until = Some(until);
        self
    }

    pub fn with_xp(mut self, xp: u32) -> Self {
        self.xp = xp;
        self
    }

    pub fn build(self) -> RosterEntry {
        let mut entry = RosterEntry::new(
            InstanceId(self.id),
            self.species_id,
            self.name,
            String::new(),
            self.level,
        );
        entry.attach_metadata(self.types, self.base_stats);
        entry.in_team = self.in_team;
        entry.fainted_until = self.fainted_until;
        entry.xp = self.xp;
        entry
    }
}

pub fn pikachu(id: &str, level: u8) -> RosterEntry {
    TestEntryBuilder::new(id, 25, "pikachu", level)
        .with_types(vec![PokemonType::Electric])
        .with_base_stats(BaseStats::new(35, 55, 40, 50, 50, 90))
        .build()
}

pub fn bulbasaur() -> Species {
    Species {
        id: 1,
        name: "bulbasaur".to_string(),
        sprite: String::new(),
        types: vec![PokemonType::Grass, PokemonType::Poison],
        base_stats: Some(BaseStats::new(45, 49, 49, 65, 65, 45)),
        is_base: true,
        evolves_to: Some(2),
    }
}

pub fn squirtle() -> Species {
    Species {
        id: 7,
        name: "squirtle".to_string(),
        sprite: String::new(),
        types: vec![PokemonType::Water],
        base_stats: Some(BaseStats::new(44, 48, 65, 50, 64, 43)),
        is_base: true,
        evolves_to: Some(8),
    }
}

/// A freshly spawned wild encounter with no battle.
pub fn test_encounter(species: Species, wild_level: u8) -> WildEncounter {
    WildEncounter {
        id: EncounterId(1),
        species,
        wild_level,
        spawned_at: 0,
        battle: None,
    }
}

pub fn roster_of(entries: Vec<RosterEntry>) -> Roster {
    Roster::from_entries(entries)
}

/// Creates a `GameRng` with a generous buffer of mid-range values.
/// Useful for tests where the specific RNG outcome is not important, preventing panics from exhaustion.
pub fn predictable_rng() -> GameRng {
    GameRng::new_for_test(vec![0.5; 100])
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: ActionResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
