use crate::config::PokedexConfig;
use crate::provider::cache::{get_or_fetch, Cache, CacheStats, InMemoryCache};
use crate::provider::{map_with_concurrency, PokedexProvider, SpeciesDetails};
use schema::{BaseStats, PokemonType, Species, SpeciesId, SpeciesSummary, Zone};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Types and stats of one species as attached to an encounter or a roster
/// entry. Either part may be empty when the provider could not deliver it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesMetadata {
    pub types: Vec<PokemonType>,
    pub base_stats: Option<BaseStats>,
}

/// Cached lookups against a [`PokedexProvider`] that never fail.
///
/// A provider error is logged and replaced by a default (no types, no base
/// stats, not a base form) so play carries on. Failed lookups are not
/// cached and will be retried on the next request. However many callers
/// share the service, at most `concurrency` provider requests are in flight.
#[derive(Clone)]
pub struct MetadataService {
    provider: Arc<dyn PokedexProvider>,
    details: Arc<dyn Cache<SpeciesId, SpeciesDetails>>,
    base_forms: Arc<dyn Cache<SpeciesId, bool>>,
    permits: Arc<Semaphore>,
    concurrency: usize,
}

impl MetadataService {
    pub fn new(provider: Arc<dyn PokedexProvider>, config: &PokedexConfig) -> Self {
        Self::with_caches(
            provider,
            Arc::new(InMemoryCache::<SpeciesId, SpeciesDetails>::new(config.cache_max_size)),
            Arc::new(InMemoryCache::<SpeciesId, bool>::new(config.cache_max_size)),
            config.concurrency,
        )
    }

    pub fn with_caches(
        provider: Arc<dyn PokedexProvider>,
        details: Arc<dyn Cache<SpeciesId, SpeciesDetails>>,
        base_forms: Arc<dyn Cache<SpeciesId, bool>>,
        concurrency: usize,
    ) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            provider,
            details,
            base_forms,
            permits: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    /// Run one provider request once a slot is free.
    async fn limited<T>(&self, request: impl Future<Output = T>) -> T {
        // The semaphore is never closed, so acquiring only waits.
        let _permit = self.permits.acquire().await.ok();
        request.await
    }

    pub async fn list_species(&self, limit: u32) -> Vec<SpeciesSummary> {
        match self.limited(self.provider.list_species(limit)).await {
            Ok(species) => species,
            Err(e) => {
                tracing::warn!("Failed to list species, no zones available: {}", e);
                Vec::new()
            }
        }
    }

    async fn details(&self, id: SpeciesId) -> Option<SpeciesDetails> {
        let fetched = get_or_fetch(self.details.as_ref(), id, || {
            self.limited(self.provider.species_details(id))
        })
        .await;
        match fetched {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::warn!("Metadata lookup for species {} degraded: {}", id, e);
                None
            }
        }
    }

    pub async fn is_base_form(&self, id: SpeciesId) -> bool {
        get_or_fetch(self.base_forms.as_ref(), id, || {
            self.limited(self.provider.is_base_form(id))
        })
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Base form lookup for species {} degraded: {}", id, e);
            false
        })
    }

    pub async fn species_metadata(&self, id: SpeciesId) -> SpeciesMetadata {
        match self.details(id).await {
            Some(details) => SpeciesMetadata {
                types: details.types,
                base_stats: Some(details.base_stats),
            },
            None => SpeciesMetadata::default(),
        }
    }

    /// Next evolution stage, or `None` when there is none or the lookup
    /// failed. Evolution chains are not cached.
    pub async fn evolution_target(&self, id: SpeciesId) -> Option<SpeciesSummary> {
        match self.limited(self.provider.evolution_target(id)).await {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Evolution lookup for species {} failed: {}", id, e);
                None
            }
        }
    }

    // One request at a time, so a pipeline worker never holds more than
    // one slot.
    async fn hydrate_species(&self, summary: SpeciesSummary) -> Species {
        let id = summary.id;
        let metadata = self.species_metadata(id).await;
        let is_base = self.is_base_form(id).await;
        Species {
            types: metadata.types,
            base_stats: metadata.base_stats,
            is_base,
            ..Species::from_summary(summary)
        }
    }

    /// Fetch types, stats and base-form flags for every species of `zone`,
    /// keeping catalogue order.
    pub async fn hydrate_zone(&self, zone: &Zone, universe: &[SpeciesSummary]) -> Vec<Species> {
        let summaries: Vec<SpeciesSummary> = universe
            .iter()
            .filter(|s| zone.contains(s.id))
            .cloned()
            .collect();
        tracing::debug!(
            "Hydrating {} species for {} with concurrency {}",
            summaries.len(),
            zone.name,
            self.concurrency
        );

        let service = self.clone();
        let results = map_with_concurrency(summaries.clone(), self.concurrency, move |_, summary| {
            let service = service.clone();
            async move { Ok::<Species, Infallible>(service.hydrate_species(summary).await) }
        })
        .await;

        results
            .into_iter()
            .zip(summaries)
            .map(|(result, summary)| match result {
                Ok(species) => species,
                Err(e) => {
                    tracing::warn!("Hydration of {} lost: {}", summary.name, e);
                    Species::from_summary(summary)
                }
            })
            .collect()
    }

    /// Combined statistics of the lookup caches.
    pub fn cache_stats(&self) -> CacheStats {
        [self.details.stats(), self.base_forms.stats()]
            .into_iter()
            .fold(CacheStats::default(), |acc, s| CacheStats {
                hits: acc.hits + s.hits,
                misses: acc.misses + s.misses,
                inserts: acc.inserts + s.inserts,
                evictions: acc.evictions + s.evictions,
            })
    }
}
