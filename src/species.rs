use crate::config::ZoneConfig;
use schema::{PokemonType, Species, SpeciesSummary, Zone};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// Partition the ordered species list into contiguous zones of
/// `zone_size` entries. The last zone may be shorter.
pub fn build_zones(species: &[SpeciesSummary], config: &ZoneConfig) -> Vec<Zone> {
    if config.zone_size == 0 {
        return Vec::new();
    }

    species
        .chunks(config.zone_size)
        .enumerate()
        .filter_map(|(index, slice)| {
            let first = slice.first()?;
            let last = slice.last()?;
            let (min_level, max_level) = zone_level_range(index as u32, config);
            let id = index as u32 + 1;
            Some(Zone {
                id,
                name: format!("Zone {}", id),
                start_id: first.id,
                end_id: last.id,
                min_level,
                max_level,
                required_level: required_level(id, config),
            })
        })
        .collect()
}

/// Wild level range of the zone at 0-based `index`: zone 0 spawns 1-3,
/// zone 1 spawns 4-6, and so on, capped at level 100.
pub fn zone_level_range(index: u32, config: &ZoneConfig) -> (u8, u8) {
    let step = config.levels_per_zone.max(1) as u32;
    let min = (index * step + 1).min(100) as u8;
    let max = ((index + 1) * step).min(100) as u8;
    (min, max.max(min))
}

/// Highest roster level needed to open zone `zone_id` (1-based).
pub fn required_level(zone_id: u32, config: &ZoneConfig) -> u8 {
    let level = zone_id.saturating_sub(1) * config.unlock_level_step as u32;
    level.min(100) as u8
}

/// Zone 1 is always open; later zones open once the strongest roster entry
/// reaches their required level.
pub fn is_zone_unlocked(zone: &Zone, roster_max_level: u8) -> bool {
    zone.id <= 1 || roster_max_level >= zone.required_level
}

/// Whether the zone only spawns (and allows direct capture of) base forms.
pub fn is_early_zone(zone: &Zone, config: &ZoneConfig) -> bool {
    zone.index() < config.early_zones
}

/// Species of `zone` eligible to spawn.
pub fn spawn_pool<'a>(zone: &Zone, species: &'a [Species], config: &ZoneConfig) -> Vec<&'a Species> {
    let early = is_early_zone(zone, config);
    species
        .iter()
        .filter(|s| zone.contains(s.id))
        .filter(|s| !early || s.is_base)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneTheme {
    Forest,
    Rock,
    Water,
    Volcanic,
    Storm,
    Tundra,
    Spooky,
    Sky,
    Mystic,
    Industrial,
    Mountain,
    Plain,
}

impl ZoneTheme {
    const FALLBACK_CYCLE: [ZoneTheme; 12] = [
        ZoneTheme::Forest,
        ZoneTheme::Rock,
        ZoneTheme::Water,
        ZoneTheme::Volcanic,
        ZoneTheme::Storm,
        ZoneTheme::Tundra,
        ZoneTheme::Spooky,
        ZoneTheme::Sky,
        ZoneTheme::Mystic,
        ZoneTheme::Industrial,
        ZoneTheme::Mountain,
        ZoneTheme::Plain,
    ];

    /// Theme of a type, if it has one. Fighting and poison have none.
    pub fn for_type(pokemon_type: PokemonType) -> Option<Self> {
        use PokemonType::*;
        let theme = match pokemon_type {
            Grass | Bug => ZoneTheme::Forest,
            Rock | Ground => ZoneTheme::Rock,
            Water => ZoneTheme::Water,
            Fire => ZoneTheme::Volcanic,
            Electric => ZoneTheme::Storm,
            Ice => ZoneTheme::Tundra,
            Ghost | Dark => ZoneTheme::Spooky,
            Flying => ZoneTheme::Sky,
            Fairy | Psychic => ZoneTheme::Mystic,
            Steel => ZoneTheme::Industrial,
            Dragon => ZoneTheme::Mountain,
            Normal => ZoneTheme::Plain,
            Fighting | Poison => return None,
        };
        Some(theme)
    }

    /// Theme used before the zone's types are known.
    pub fn fallback(zone_id: u32) -> Self {
        let index = zone_id.saturating_sub(1) as usize % Self::FALLBACK_CYCLE.len();
        Self::FALLBACK_CYCLE[index]
    }

    /// Theme of the most common type among the zone's species. Ties go to the
    /// type seen first. Falls back to the zone-id cycle when nothing is typed
    /// or the dominant type has no theme of its own.
    pub fn detect(zone: &Zone, species: &[Species]) -> Self {
        let mut counts: Vec<(PokemonType, usize)> = Vec::new();
        for pokemon_type in species
            .iter()
            .filter(|s| zone.contains(s.id))
            .flat_map(|s| s.types.iter().copied())
        {
            match counts.iter_mut().find(|(t, _)| *t == pokemon_type) {
                Some((_, count)) => *count += 1,
                None => counts.push((pokemon_type, 1)),
            }
        }

        let mut dominant: Option<(PokemonType, usize)> = None;
        for (pokemon_type, count) in counts {
            match dominant {
                Some((_, best)) if count <= best => {}
                _ => dominant = Some((pokemon_type, count)),
            }
        }

        dominant
            .and_then(|(pokemon_type, _)| Self::for_type(pokemon_type))
            .unwrap_or_else(|| Self::fallback(zone.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn summaries(count: u32) -> Vec<SpeciesSummary> {
        (1..=count)
            .map(|id| SpeciesSummary {
                id,
                name: format!("species-{}", id),
                sprite: format!("{}.png", id),
            })
            .collect()
    }

    fn typed(id: u32, types: Vec<PokemonType>, is_base: bool) -> Species {
        Species {
            id,
            name: format!("species-{}", id),
            sprite: String::new(),
            types,
            base_stats: None,
            is_base,
            evolves_to: None,
        }
    }

    #[test]
    fn test_build_zones_partitions_species() {
        let zones = build_zones(&summaries(151), &ZoneConfig::default());

        assert_eq!(zones.len(), 11);
        assert_eq!(zones[0].start_id, 1);
        assert_eq!(zones[0].end_id, 15);
        assert_eq!(zones[1].start_id, 16);
        assert_eq!(zones[10].start_id, 151);
        assert_eq!(zones[10].end_id, 151);
        assert_eq!(zones[10].species_count(), 1);
        assert_eq!(zones[2].name, "Zone 3");
    }

    #[rstest]
    #[case(0, (1, 3))]
    #[case(1, (4, 6))]
    #[case(2, (7, 9))]
    #[case(10, (31, 33))]
    fn test_zone_level_range(#[case] index: u32, #[case] expected: (u8, u8)) {
        assert_eq!(zone_level_range(index, &ZoneConfig::default()), expected);
    }

    #[rstest]
    #[case(1, 0, true)]
    #[case(2, 4, false)]
    #[case(2, 5, true)]
    #[case(4, 14, false)]
    #[case(4, 15, true)]
    fn test_zone_unlock_rule(#[case] zone_id: u32, #[case] max_level: u8, #[case] unlocked: bool) {
        let zones = build_zones(&summaries(151), &ZoneConfig::default());
        let zone = &zones[zone_id as usize - 1];
        assert_eq!(is_zone_unlocked(zone, max_level), unlocked);
    }

    #[test]
    fn test_early_zone_pool_is_base_forms_only() {
        let config = ZoneConfig::default();
        let zones = build_zones(&summaries(60), &config);
        let species = vec![
            typed(1, vec![], true),
            typed(2, vec![], false),
            typed(3, vec![], false),
            typed(46, vec![], true),
            typed(47, vec![], false),
        ];

        let early: Vec<u32> = spawn_pool(&zones[0], &species, &config).iter().map(|s| s.id).collect();
        assert_eq!(early, vec![1]);

        // Zone 4 (index 3) is past the early threshold.
        let late: Vec<u32> = spawn_pool(&zones[3], &species, &config).iter().map(|s| s.id).collect();
        assert_eq!(late, vec![46, 47]);
    }

    #[test]
    fn test_theme_follows_dominant_type() {
        let zones = build_zones(&summaries(30), &ZoneConfig::default());
        let species = vec![
            typed(1, vec![PokemonType::Grass, PokemonType::Poison], true),
            typed(2, vec![PokemonType::Grass, PokemonType::Poison], false),
            typed(4, vec![PokemonType::Fire], true),
            typed(10, vec![PokemonType::Bug], true),
            typed(16, vec![PokemonType::Normal, PokemonType::Flying], true),
            typed(17, vec![PokemonType::Water], true),
            typed(18, vec![PokemonType::Water], true),
        ];

        assert_eq!(ZoneTheme::detect(&zones[0], &species), ZoneTheme::Forest);
        assert_eq!(ZoneTheme::detect(&zones[1], &species), ZoneTheme::Water);
    }

    #[test]
    fn test_theme_falls_back_to_zone_cycle() {
        let zones = build_zones(&summaries(200), &ZoneConfig::default());
        let untyped = vec![typed(1, vec![], true)];

        assert_eq!(ZoneTheme::detect(&zones[0], &untyped), ZoneTheme::Forest);
        assert_eq!(ZoneTheme::fallback(3), ZoneTheme::Water);
        assert_eq!(ZoneTheme::fallback(13), ZoneTheme::Forest);
        assert_eq!(ZoneTheme::Industrial.to_string(), "industrial");
    }
}
