use crate::battle::state::Battle;
use crate::config::ZoneConfig;
use crate::pokemon::{derive_stats, DerivedStats};
use crate::provider::SpeciesMetadata;
use crate::rng::GameRng;
use crate::species::spawn_pool;
use schema::{Species, SpeciesId, Zone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one spawn. Asynchronous results carry it so that they can be
/// matched against whatever encounter is active when they arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncounterId(pub u64);

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WildEncounter {
    pub id: EncounterId,
    pub species: Species,
    pub wild_level: u8,
    pub spawned_at: u64,
    pub battle: Option<Battle>,
}

impl WildEncounter {
    /// Stats of the wild at its rolled level. Uses floor values until the
    /// species' base stats are known.
    pub fn combat_stats(&self) -> DerivedStats {
        derive_stats(self.species.base_stats.as_ref(), self.wild_level)
    }

    /// A battle was started and has not ended yet.
    pub fn has_unresolved_battle(&self) -> bool {
        self.battle.as_ref().is_some_and(|b| !b.is_ended())
    }

    pub fn needs_hydration(&self) -> bool {
        self.species.types.is_empty() || self.species.base_stats.is_none()
    }
}

/// Holds the single active wild encounter of an open zone.
#[derive(Debug, Clone)]
pub struct WildSpawner {
    zone: Zone,
    pool: Vec<Species>,
    active: Option<WildEncounter>,
    last_species: Option<SpeciesId>,
    next_id: u64,
    retry_attempts: u32,
}

impl WildSpawner {
    /// `species` may hold more than the zone; only eligible spawns are kept.
    pub fn new(zone: Zone, species: &[Species], config: &ZoneConfig) -> Self {
        let pool: Vec<Species> = spawn_pool(&zone, species, config)
            .into_iter()
            .cloned()
            .collect();
        tracing::debug!("{} spawn pool has {} species", zone.name, pool.len());
        Self {
            zone,
            pool,
            active: None,
            last_species: None,
            next_id: 0,
            retry_attempts: config.spawn_retry_attempts,
        }
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn pool(&self) -> &[Species] {
        &self.pool
    }

    pub fn active(&self) -> Option<&WildEncounter> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut WildEncounter> {
        self.active.as_mut()
    }

    /// Spawn unless the current encounter is still being fought.
    pub fn spawn(&mut self, rng: &mut GameRng, now: u64) -> Option<&WildEncounter> {
        if self.active.as_ref().is_some_and(WildEncounter::has_unresolved_battle) {
            tracing::debug!("Keeping encounter with a running battle");
            return self.active.as_ref();
        }
        self.force_spawn(rng, now)
    }

    /// Replace the current encounter outright, whatever its battle state.
    /// With an empty pool nothing changes.
    pub fn force_spawn(&mut self, rng: &mut GameRng, now: u64) -> Option<&WildEncounter> {
        if self.pool.is_empty() {
            tracing::debug!("{} has nothing to spawn", self.zone.name);
            return self.active.as_ref();
        }

        let species = self.pool[self.pick_index(rng)].clone();
        let wild_level = rng.next_in_range(self.zone.min_level, self.zone.max_level, "wild level");
        self.next_id += 1;
        self.last_species = Some(species.id);

        tracing::info!(
            "A wild {} (Lv {}) appeared in {}",
            species.name,
            wild_level,
            self.zone.name
        );
        Some(&*self.active.insert(WildEncounter {
            id: EncounterId(self.next_id),
            species,
            wild_level,
            spawned_at: now,
            battle: None,
        }))
    }

    // Re-roll a repeat of the previous species a bounded number of times.
    fn pick_index(&self, rng: &mut GameRng) -> usize {
        let mut index = rng.next_index(self.pool.len(), "spawn pick");
        if self.pool.len() < 2 {
            return index;
        }
        let mut attempts = 0;
        while Some(self.pool[index].id) == self.last_species && attempts < self.retry_attempts {
            index = rng.next_index(self.pool.len(), "spawn re-pick");
            attempts += 1;
        }
        index
    }

    pub fn clear(&mut self) -> Option<WildEncounter> {
        self.active.take()
    }

    /// Attach metadata fetched for encounter `id`. Returns false, leaving
    /// everything untouched, when that encounter is no longer active.
    pub fn attach_metadata(&mut self, id: EncounterId, metadata: SpeciesMetadata) -> bool {
        match self.active.as_mut() {
            Some(encounter) if encounter.id == id => {
                encounter.species.types = metadata.types;
                encounter.species.base_stats = metadata.base_stats;
                true
            }
            _ => false,
        }
    }
}
