use crate::errors::{ProviderError, ProviderResult};
use crate::provider::{PokedexProvider, SpeciesDetails};
use async_trait::async_trait;
use schema::{BaseStats, PokemonType, SpeciesId, SpeciesSummary};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct MemorySpecies {
    pub summary: SpeciesSummary,
    pub types: Vec<PokemonType>,
    pub base_stats: BaseStats,
    pub is_base: bool,
    pub evolves_to: Option<SpeciesSummary>,
}

/// Provider backed by a fixed catalogue, for tests and offline play.
/// Supports per-species failure and latency injection, counts every
/// lookup it serves and records how many were ever in flight at once.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    species: BTreeMap<SpeciesId, MemorySpecies>,
    failing: Mutex<HashSet<SpeciesId>>,
    fail_all: AtomicBool,
    latency: Mutex<HashMap<SpeciesId, Duration>>,
    default_latency: Mutex<Option<Duration>>,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

type CatalogRow = (
    SpeciesId,
    &'static str,
    &'static [PokemonType],
    [u16; 6],
    bool,
    Option<(SpeciesId, &'static str)>,
);

const KANTO_SAMPLE: &[CatalogRow] = {
    use PokemonType::*;
    &[
        (1, "bulbasaur", &[Grass, Poison], [45, 49, 49, 65, 65, 45], true, Some((2, "ivysaur"))),
        (2, "ivysaur", &[Grass, Poison], [60, 62, 63, 80, 80, 60], false, Some((3, "venusaur"))),
        (3, "venusaur", &[Grass, Poison], [80, 82, 83, 100, 100, 80], false, None),
        (4, "charmander", &[Fire], [39, 52, 43, 60, 50, 65], true, Some((5, "charmeleon"))),
        (5, "charmeleon", &[Fire], [58, 64, 58, 80, 65, 80], false, Some((6, "charizard"))),
        (6, "charizard", &[Fire, Flying], [78, 84, 78, 109, 85, 100], false, None),
        (7, "squirtle", &[Water], [44, 48, 65, 50, 64, 43], true, Some((8, "wartortle"))),
        (8, "wartortle", &[Water], [59, 63, 80, 65, 80, 58], false, Some((9, "blastoise"))),
        (9, "blastoise", &[Water], [79, 83, 100, 85, 105, 78], false, None),
        (10, "caterpie", &[Bug], [45, 30, 35, 20, 20, 45], true, Some((11, "metapod"))),
        (11, "metapod", &[Bug], [50, 20, 55, 25, 25, 30], false, Some((12, "butterfree"))),
        (12, "butterfree", &[Bug, Flying], [60, 45, 50, 90, 80, 70], false, None),
        (13, "weedle", &[Bug, Poison], [40, 35, 30, 20, 20, 50], true, Some((14, "kakuna"))),
        (14, "kakuna", &[Bug, Poison], [45, 25, 50, 25, 25, 35], false, Some((15, "beedrill"))),
        (15, "beedrill", &[Bug, Poison], [65, 90, 40, 45, 80, 75], false, None),
        (16, "pidgey", &[Normal, Flying], [40, 45, 40, 35, 35, 56], true, Some((17, "pidgeotto"))),
        (17, "pidgeotto", &[Normal, Flying], [63, 60, 55, 50, 50, 71], false, Some((18, "pidgeot"))),
        (18, "pidgeot", &[Normal, Flying], [83, 80, 75, 70, 70, 101], false, None),
        (19, "rattata", &[Normal], [30, 56, 35, 25, 35, 72], true, Some((20, "raticate"))),
        (20, "raticate", &[Normal], [55, 81, 60, 50, 70, 97], false, None),
        (21, "spearow", &[Normal, Flying], [40, 60, 30, 31, 31, 70], true, Some((22, "fearow"))),
        (22, "fearow", &[Normal, Flying], [65, 90, 65, 61, 61, 100], false, None),
        (23, "ekans", &[Poison], [35, 60, 44, 40, 54, 55], true, Some((24, "arbok"))),
        (24, "arbok", &[Poison], [60, 95, 69, 65, 79, 80], false, None),
        (25, "pikachu", &[Electric], [35, 55, 40, 50, 50, 90], false, Some((26, "raichu"))),
        (26, "raichu", &[Electric], [60, 90, 55, 90, 80, 110], false, None),
        (27, "sandshrew", &[Ground], [50, 75, 85, 20, 30, 40], true, Some((28, "sandslash"))),
        (28, "sandslash", &[Ground], [75, 100, 110, 45, 55, 65], false, None),
        (29, "nidoran-f", &[Poison], [55, 47, 52, 40, 40, 41], true, Some((30, "nidorina"))),
        (30, "nidorina", &[Poison], [70, 62, 67, 55, 55, 56], false, Some((31, "nidoqueen"))),
    ]
};

impl MemoryProvider {
    pub fn new(species: Vec<MemorySpecies>) -> Self {
        Self {
            species: species.into_iter().map(|s| (s.summary.id, s)).collect(),
            ..Self::default()
        }
    }

    /// The first thirty Kanto species with their real types and stats.
    pub fn kanto_sample(sprite_url: &str) -> Self {
        let sprite = |id: SpeciesId| format!("{}/{}.png", sprite_url.trim_end_matches('/'), id);
        let species = KANTO_SAMPLE
            .iter()
            .map(|&(id, name, types, [hp, atk, def, spa, spd, spe], is_base, next)| MemorySpecies {
                summary: SpeciesSummary {
                    id,
                    name: name.to_string(),
                    sprite: sprite(id),
                },
                types: types.to_vec(),
                base_stats: BaseStats::new(hp, atk, def, spa, spd, spe),
                is_base,
                evolves_to: next.map(|(next_id, next_name)| SpeciesSummary {
                    id: next_id,
                    name: next_name.to_string(),
                    sprite: sprite(next_id),
                }),
            })
            .collect();
        Self::new(species)
    }

    /// Make every lookup for `id` fail until cleared.
    pub fn fail_species(&self, id: SpeciesId) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(id);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
        self.fail_all.store(false, Ordering::SeqCst);
    }

    /// Simulate the provider being unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.fail_all.store(offline, Ordering::SeqCst);
    }

    /// Delay every lookup for `id` by `delay`.
    pub fn set_latency(&self, id: SpeciesId, delay: Duration) {
        if let Ok(mut latency) = self.latency.lock() {
            latency.insert(id, delay);
        }
    }

    /// Delay lookups for every species without a latency of its own.
    pub fn set_default_latency(&self, delay: Duration) {
        if let Ok(mut latency) = self.default_latency.lock() {
            *latency = Some(delay);
        }
    }

    /// Number of lookups served so far, failed ones included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Highest number of species lookups that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn lookup(&self, id: SpeciesId) -> ProviderResult<&MemorySpecies> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let result = self.serve(id).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn serve(&self, id: SpeciesId) -> ProviderResult<&MemorySpecies> {
        let delay = self
            .latency
            .lock()
            .ok()
            .and_then(|l| l.get(&id).copied())
            .or_else(|| self.default_latency.lock().ok().and_then(|d| *d));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self.fail_all.load(Ordering::SeqCst)
            || self.failing.lock().map(|f| f.contains(&id)).unwrap_or(false);
        if failing {
            return Err(ProviderError::Status {
                url: format!("memory://species/{}", id),
                status: 503,
            });
        }

        self.species.get(&id).ok_or(ProviderError::UnknownSpecies(id))
    }
}

#[async_trait]
impl PokedexProvider for MemoryProvider {
    async fn list_species(&self, limit: u32) -> ProviderResult<Vec<SpeciesSummary>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(ProviderError::Status {
                url: "memory://species".to_string(),
                status: 503,
            });
        }
        Ok(self
            .species
            .values()
            .take(limit as usize)
            .map(|s| s.summary.clone())
            .collect())
    }

    async fn species_details(&self, id: SpeciesId) -> ProviderResult<SpeciesDetails> {
        let species = self.lookup(id).await?;
        Ok(SpeciesDetails {
            types: species.types.clone(),
            base_stats: species.base_stats,
        })
    }

    async fn is_base_form(&self, id: SpeciesId) -> ProviderResult<bool> {
        Ok(self.lookup(id).await?.is_base)
    }

    async fn evolution_target(&self, id: SpeciesId) -> ProviderResult<Option<SpeciesSummary>> {
        Ok(self.lookup(id).await?.evolves_to.clone())
    }
}
