use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub pokedex: PokedexConfig,
    pub zones: ZoneConfig,
    pub capture: CaptureConfig,
    pub battle: BattleConfig,
    pub progression: ProgressionConfig,
    pub timing: TimingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PokedexConfig {
    pub api_url: String,
    pub sprite_url: String,
    pub species_limit: u32,
    /// Simultaneous in-flight provider requests while hydrating a zone.
    pub concurrency: usize,
    pub cache_max_size: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ZoneConfig {
    pub zone_size: usize,
    /// Zones with a 0-based index below this only spawn base forms.
    pub early_zones: u32,
    pub levels_per_zone: u8,
    pub unlock_level_step: u8,
    pub spawn_retry_attempts: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    pub base_form_chance: f64,
    pub evolved_chance: f64,
    pub max_roster_bonus: f64,
    pub max_wild_level_bonus: f64,
    pub hp_bonus_weight: f64,
    pub min_chance: f64,
    pub max_chance: f64,
    pub flee_base: f64,
    pub flee_per_level: f64,
    pub flee_max: f64,
    pub cooldown_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BattleMode {
    /// Turns are triggered by the player; a faint pauses for a manual switch.
    #[default]
    Manual,
    /// Turns run on a fixed tick; a faint is followed by an automatic switch.
    Continuous,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BattleConfig {
    pub mode: BattleMode,
    pub revive_ms: u64,
    pub auto_turn_interval_ms: u64,
    pub substitute_delay_ms: u64,
    pub victory_xp_per_level: u32,
    pub victory_xp_min: u32,
    pub winner_share: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProgressionConfig {
    pub xp_per_capture: u32,
    pub team_capacity: usize,
    pub evolve_level: u8,
    pub min_level_threshold: u32,
    pub xp_per_level: u32,
    pub max_level: u8,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub capture_respawn_ms: u64,
    pub direct_capture_respawn_ms: u64,
    pub flee_respawn_ms: u64,
    pub victory_clear_ms: u64,
    pub victory_respawn_ms: u64,
}

impl Default for PokedexConfig {
    fn default() -> Self {
        Self {
            api_url: "https://pokeapi.co/api/v2".to_string(),
            sprite_url: "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon"
                .to_string(),
            species_limit: 151,
            concurrency: 6,
            cache_max_size: 2048,
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            zone_size: 15,
            early_zones: 3,
            levels_per_zone: 3,
            unlock_level_step: 5,
            spawn_retry_attempts: 6,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            base_form_chance: 0.35,
            evolved_chance: 0.15,
            max_roster_bonus: 0.15,
            max_wild_level_bonus: 0.12,
            hp_bonus_weight: 0.9,
            min_chance: 0.01,
            max_chance: 0.98,
            flee_base: 0.25,
            flee_per_level: 0.02,
            flee_max: 0.6,
            cooldown_ms: 3_000,
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            mode: BattleMode::Manual,
            revive_ms: 10_000,
            auto_turn_interval_ms: 1_200,
            substitute_delay_ms: 600,
            victory_xp_per_level: 15,
            victory_xp_min: 10,
            winner_share: 0.7,
        }
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_capture: 40,
            team_capacity: 6,
            evolve_level: 16,
            min_level_threshold: 20,
            xp_per_level: 60,
            max_level: 100,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            capture_respawn_ms: 500,
            direct_capture_respawn_ms: 400,
            flee_respawn_ms: 600,
            victory_clear_ms: 400,
            victory_respawn_ms: 1_000,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| {
            tracing::error!("Failed to parse game config: {}", e);
            ConfigError::from(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the capture and progression formulas cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let capture = &self.capture;
        if !(0.0..=1.0).contains(&capture.min_chance) || !(0.0..=1.0).contains(&capture.max_chance) {
            return Err(ConfigError::Invalid(format!(
                "capture chances must lie in [0, 1], got min {} max {}",
                capture.min_chance, capture.max_chance
            )));
        }
        if capture.min_chance > capture.max_chance {
            return Err(ConfigError::Invalid(format!(
                "capture min_chance {} exceeds max_chance {}",
                capture.min_chance, capture.max_chance
            )));
        }
        if self.progression.max_level == 0 {
            return Err(ConfigError::Invalid("progression max_level must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!("Loaded game config from {}", path.display());
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_shipped_config_matches_defaults() {
        let shipped = include_str!("../config/game.toml");
        let config = GameConfig::from_toml_str(shipped).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [battle]
            mode = "continuous"

            [zones]
            zone_size = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.battle.mode, BattleMode::Continuous);
        assert_eq!(config.battle.revive_ms, 10_000);
        assert_eq!(config.zones.zone_size, 10);
        assert_eq!(config.zones.early_zones, 3);
        assert_eq!(config.capture, CaptureConfig::default());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = GameConfig::from_toml_str("[battle]\nmode = \"turbo\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[rstest]
    #[case("[capture]\nmin_chance = 0.9\nmax_chance = 0.5\n")]
    #[case("[capture]\nmax_chance = 1.5\n")]
    #[case("[progression]\nmax_level = 0\n")]
    fn test_unusable_values_are_rejected(#[case] source: &str) {
        let result = GameConfig::from_toml_str(source);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let result = GameConfig::load("/nonexistent/game.toml");
        match result {
            Err(ConfigError::Read { path, .. }) => assert!(path.contains("game.toml")),
            other => panic!("Expected read error, got {:?}", other),
        }
    }
}
