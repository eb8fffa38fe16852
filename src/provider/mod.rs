//! The external Pokédex collaborator and everything layered on top of it:
//! caching, bounded-concurrency fetching and degrade-to-default lookups.

pub mod cache;
pub mod memory;
pub mod metadata;
pub mod pipeline;
pub mod pokeapi;

use crate::errors::ProviderResult;
use async_trait::async_trait;
use schema::{BaseStats, PokemonType, SpeciesId, SpeciesSummary};

pub use cache::{Cache, CacheStats, InMemoryCache};
pub use memory::MemoryProvider;
pub use metadata::{MetadataService, SpeciesMetadata};
pub use pipeline::map_with_concurrency;
pub use pokeapi::PokeApiProvider;

#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesDetails {
    pub types: Vec<PokemonType>,
    pub base_stats: BaseStats,
}

/// Read-only lookups against a Pokédex data source. Every lookup except
/// `evolution_target` returns immutable data and may be cached forever.
#[async_trait]
pub trait PokedexProvider: Send + Sync {
    /// The first `limit` species, ordered by id.
    async fn list_species(&self, limit: u32) -> ProviderResult<Vec<SpeciesSummary>>;

    /// Types and base stats of `id`, delivered by a single request.
    async fn species_details(&self, id: SpeciesId) -> ProviderResult<SpeciesDetails>;

    /// True when the species has no pre-evolution.
    async fn is_base_form(&self, id: SpeciesId) -> ProviderResult<bool>;

    /// The next stage of `id`, if it has one.
    async fn evolution_target(&self, id: SpeciesId) -> ProviderResult<Option<SpeciesSummary>>;
}
