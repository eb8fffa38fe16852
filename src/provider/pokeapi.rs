use crate::config::PokedexConfig;
use crate::errors::{ProviderError, ProviderResult};
use crate::progression::find_first;
use crate::provider::{PokedexProvider, SpeciesDetails};
use async_trait::async_trait;
use schema::{BaseStats, PokemonType, SpeciesId, SpeciesSummary};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ResourceList {
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    r#type: NamedResource,
}

#[derive(Debug, Deserialize)]
struct StatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct PokemonPayload {
    #[serde(default)]
    types: Vec<TypeSlot>,
    #[serde(default)]
    stats: Vec<StatSlot>,
}

#[derive(Debug, Deserialize)]
struct ApiResource {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SpeciesPayload {
    name: String,
    evolves_from_species: Option<NamedResource>,
    evolution_chain: Option<ApiResource>,
}

#[derive(Debug, Deserialize)]
struct ChainLink {
    species: NamedResource,
    #[serde(default)]
    evolves_to: Vec<ChainLink>,
}

#[derive(Debug, Deserialize)]
struct EvolutionChain {
    chain: ChainLink,
}

/// [`PokedexProvider`] backed by the public PokéAPI over HTTP.
#[derive(Debug, Clone)]
pub struct PokeApiProvider {
    client: reqwest::Client,
    api_url: String,
    sprite_url: String,
}

impl PokeApiProvider {
    pub fn new(config: &PokedexConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            sprite_url: config.sprite_url.trim_end_matches('/').to_string(),
        }
    }

    fn sprite_for(&self, id: SpeciesId) -> String {
        format!("{}/{}.png", self.sprite_url, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<T> {
        tracing::debug!("Fetching from URL: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Failed to make HTTP request to {}: {}", url, e);
            ProviderError::from(e)
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::error!("API request to {} failed with status: {}", url, status);
            return Err(ProviderError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse JSON response from {}: {}", url, e);
            ProviderError::Malformed(format!("{}: {}", url, e))
        })
    }

    async fn pokemon(&self, id: SpeciesId) -> ProviderResult<PokemonPayload> {
        self.get_json(&format!("{}/pokemon/{}", self.api_url, id)).await
    }

    async fn species(&self, id: SpeciesId) -> ProviderResult<SpeciesPayload> {
        self.get_json(&format!("{}/pokemon-species/{}", self.api_url, id))
            .await
    }
}

/// Trailing numeric segment of a resource url such as `.../pokemon/25/`.
fn id_from_url(url: &str) -> Option<SpeciesId> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

fn parse_types(payload: &PokemonPayload) -> Vec<PokemonType> {
    payload
        .types
        .iter()
        .filter_map(|slot| match PokemonType::from_str(&slot.r#type.name) {
            Ok(t) => Some(t),
            Err(_) => {
                tracing::debug!("Ignoring unknown type: {}", slot.r#type.name);
                None
            }
        })
        .collect()
}

fn parse_base_stats(payload: &PokemonPayload) -> BaseStats {
    let mut stats = BaseStats::default();
    for slot in &payload.stats {
        let value = Some(slot.base_stat);
        match slot.stat.name.as_str() {
            "hp" => stats.hp = value,
            "attack" => stats.attack = value,
            "defense" => stats.defense = value,
            "special-attack" => stats.sp_attack = value,
            "special-defense" => stats.sp_defense = value,
            "speed" => stats.speed = value,
            _ => {}
        }
    }
    stats
}

/// The stage right after `name` in the chain, following the first branch.
fn next_stage<'a>(chain: &'a EvolutionChain, name: &str) -> Option<&'a NamedResource> {
    let node = find_first(
        &chain.chain,
        |link: &'a ChainLink| link.evolves_to.as_slice(),
        |link| link.species.name == name,
    )?;
    node.evolves_to.first().map(|next| &next.species)
}

#[async_trait]
impl PokedexProvider for PokeApiProvider {
    async fn list_species(&self, limit: u32) -> ProviderResult<Vec<SpeciesSummary>> {
        let url = format!("{}/pokemon?limit={}", self.api_url, limit);
        let list: ResourceList = self.get_json(&url).await?;

        let mut species: Vec<SpeciesSummary> = list
            .results
            .into_iter()
            .filter_map(|resource| {
                let id = id_from_url(&resource.url)?;
                Some(SpeciesSummary {
                    id,
                    sprite: self.sprite_for(id),
                    name: resource.name,
                })
            })
            .collect();
        species.sort_by_key(|s| s.id);
        tracing::debug!("Listed {} species", species.len());
        Ok(species)
    }

    async fn species_details(&self, id: SpeciesId) -> ProviderResult<SpeciesDetails> {
        let payload = self.pokemon(id).await?;
        Ok(SpeciesDetails {
            types: parse_types(&payload),
            base_stats: parse_base_stats(&payload),
        })
    }

    async fn is_base_form(&self, id: SpeciesId) -> ProviderResult<bool> {
        Ok(self.species(id).await?.evolves_from_species.is_none())
    }

    async fn evolution_target(&self, id: SpeciesId) -> ProviderResult<Option<SpeciesSummary>> {
        let species = self.species(id).await?;
        let Some(chain_ref) = species.evolution_chain else {
            return Ok(None);
        };
        let chain: EvolutionChain = self.get_json(&chain_ref.url).await?;

        let Some(next) = next_stage(&chain, &species.name) else {
            return Ok(None);
        };
        let next_id = id_from_url(&next.url)
            .ok_or_else(|| ProviderError::Malformed(format!("species url {}", next.url)))?;
        Ok(Some(SpeciesSummary {
            id: next_id,
            name: next.name.clone(),
            sprite: self.sprite_for(next_id),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("https://pokeapi.co/api/v2/pokemon/25/", Some(25))]
    #[case("https://pokeapi.co/api/v2/pokemon-species/133", Some(133))]
    #[case("https://pokeapi.co/api/v2/pokemon/", None)]
    fn test_id_from_url(#[case] url: &str, #[case] expected: Option<SpeciesId>) {
        assert_eq!(id_from_url(url), expected);
    }

    #[test]
    fn test_pokemon_payload_parsing() {
        let payload: PokemonPayload = serde_json::from_str(
            r#"{
                "types": [
                    {"slot": 1, "type": {"name": "grass", "url": "https://pokeapi.co/api/v2/type/12/"}},
                    {"slot": 2, "type": {"name": "poison", "url": "https://pokeapi.co/api/v2/type/4/"}}
                ],
                "stats": [
                    {"base_stat": 45, "effort": 0, "stat": {"name": "hp", "url": ""}},
                    {"base_stat": 49, "effort": 0, "stat": {"name": "attack", "url": ""}},
                    {"base_stat": 65, "effort": 1, "stat": {"name": "special-attack", "url": ""}},
                    {"base_stat": 45, "effort": 0, "stat": {"name": "speed", "url": ""}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(parse_types(&payload), vec![PokemonType::Grass, PokemonType::Poison]);
        let stats = parse_base_stats(&payload);
        assert_eq!(stats.hp, Some(45));
        assert_eq!(stats.sp_attack, Some(65));
        assert_eq!(stats.defense, None);
        assert!(!stats.is_complete());
    }

    #[test]
    fn test_next_stage_follows_first_branch() {
        let chain: EvolutionChain = serde_json::from_str(
            r#"{
                "chain": {
                    "species": {"name": "eevee", "url": "https://pokeapi.co/api/v2/pokemon-species/133/"},
                    "evolves_to": [
                        {"species": {"name": "vaporeon", "url": "https://pokeapi.co/api/v2/pokemon-species/134/"}, "evolves_to": []},
                        {"species": {"name": "jolteon", "url": "https://pokeapi.co/api/v2/pokemon-species/135/"}, "evolves_to": []}
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(next_stage(&chain, "eevee").map(|s| s.name.as_str()), Some("vaporeon"));
        assert!(next_stage(&chain, "jolteon").is_none());
        assert!(next_stage(&chain, "pikachu").is_none());
    }
}
