use crate::config::ProgressionConfig;
use schema::{BaseStats, PokemonType, SpeciesId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Baseline used for a missing HP base stat.
pub const FALLBACK_HP_BASE: u16 = 10;
/// Baseline used for any other missing base stat.
pub const FALLBACK_STAT_BASE: u16 = 5;

/// Unique id of one captured instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        InstanceId(value.to_string())
    }
}

/// Opaque identity of the trainer that owns a roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainerId(pub String);

impl fmt::Display for TrainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrainerId {
    fn from(value: &str) -> Self {
        TrainerId(value.to_string())
    }
}

/// Level-scaled battle statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

/// Calculate battle stats from base stats and level.
/// HP = floor(2 * Base * Level / 100) + Level + 10
/// Other Stat = floor(2 * Base * Level / 100) + 5
/// Missing base stats fall back to `FALLBACK_HP_BASE` / `FALLBACK_STAT_BASE`.
pub fn derive_stats(base_stats: Option<&BaseStats>, level: u8) -> DerivedStats {
    let base = base_stats.copied().unwrap_or_default();
    let level = level as u32;

    let scaled = |value: Option<u16>, fallback: u16| -> u32 {
        2 * value.unwrap_or(fallback) as u32 * level / 100
    };
    let other = |value: Option<u16>| -> u16 {
        (scaled(value, FALLBACK_STAT_BASE) + 5).min(u16::MAX as u32) as u16
    };

    DerivedStats {
        hp: (scaled(base.hp, FALLBACK_HP_BASE) + level + 10).min(u16::MAX as u32) as u16,
        attack: other(base.attack),
        defense: other(base.defense),
        sp_attack: other(base.sp_attack),
        sp_defense: other(base.sp_defense),
        speed: other(base.speed),
    }
}

/// XP needed to advance from `level` to the next one.
pub fn level_threshold(level: u8, config: &ProgressionConfig) -> u32 {
    (level as u32 * config.xp_per_level).max(config.min_level_threshold)
}

/// Milliseconds since the Unix epoch, the timestamp unit used throughout.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn default_in_team() -> bool {
    true
}

/// One captured instance owned by a trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: InstanceId,
    pub original_species_id: SpeciesId,
    pub current_species_id: SpeciesId,
    pub name: String,
    pub sprite: String,
    pub level: u8,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub types: Vec<PokemonType>,
    #[serde(default)]
    pub base_stats: Option<BaseStats>,
    #[serde(default)]
    pub derived_stats: Option<DerivedStats>,
    #[serde(default = "default_in_team")]
    pub in_team: bool,
    #[serde(default)]
    pub fainted_until: Option<u64>,
}

impl RosterEntry {
    pub fn new(
        id: InstanceId,
        species_id: SpeciesId,
        name: impl Into<String>,
        sprite: impl Into<String>,
        level: u8,
    ) -> Self {
        RosterEntry {
            id,
            original_species_id: species_id,
            current_species_id: species_id,
            name: name.into(),
            sprite: sprite.into(),
            level: level.max(1),
            xp: 0,
            types: Vec::new(),
            base_stats: None,
            derived_stats: None,
            in_team: false,
            fainted_until: None,
        }
    }

    /// Attach provider metadata and refresh the cached derived stats.
    pub fn attach_metadata(&mut self, types: Vec<PokemonType>, base_stats: Option<BaseStats>) {
        self.types = types;
        self.base_stats = base_stats;
        self.refresh_derived_stats();
    }

    pub fn refresh_derived_stats(&mut self) {
        self.derived_stats = Some(derive_stats(self.base_stats.as_ref(), self.level));
    }

    /// Stats for the current level, whether or not the cache is populated.
    pub fn battle_stats(&self) -> DerivedStats {
        derive_stats(self.base_stats.as_ref(), self.level)
    }

    pub fn needs_hydration(&self) -> bool {
        self.types.is_empty() || self.base_stats.is_none()
    }

    pub fn is_fainted(&self, now: u64) -> bool {
        self.fainted_until.is_some_and(|until| until > now)
    }

    /// Team member that is not waiting to revive.
    pub fn can_battle(&self, now: u64) -> bool {
        self.in_team && !self.is_fainted(now)
    }

    pub fn faint(&mut self, now: u64, revive_ms: u64) -> u64 {
        let until = now + revive_ms;
        self.fainted_until = Some(until);
        until
    }
}
