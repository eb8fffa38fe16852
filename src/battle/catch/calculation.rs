use crate::config::CaptureConfig;
use crate::rng::GameRng;

/// What the trainer is throwing at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureKind {
    /// Picked from the zone's species list; no wild level or HP component.
    Direct,
    /// The active wild encounter. `hp_depleted` is the fraction of its HP
    /// lost in battle, 0 when it was never fought.
    Wild { wild_level: u8, hp_depleted: f64 },
}

/// Capture probability:
/// clamp(base + min(0.15, teamMax / 100) + min(0.12, wildLevel / 100) + depleted * 0.9, 0.01, 0.98)
/// `base` is 0.35 for a base form and 0.15 for an evolved species. The wild
/// level and HP terms apply to wild captures only.
pub fn capture_probability(
    is_base: bool,
    team_max_level: u8,
    kind: CaptureKind,
    config: &CaptureConfig,
) -> f64 {
    let base = if is_base {
        config.base_form_chance
    } else {
        config.evolved_chance
    };
    let level_bonus = (team_max_level as f64 / 100.0).min(config.max_roster_bonus);

    let wild_bonus = match kind {
        CaptureKind::Direct => 0.0,
        CaptureKind::Wild {
            wild_level,
            hp_depleted,
        } => {
            // Higher-level wilds are slightly easier to catch.
            let level_term = (wild_level as f64 / 100.0).min(config.max_wild_level_bonus);
            let hp_term = hp_depleted.clamp(0.0, 1.0) * config.hp_bonus_weight;
            level_term + hp_term
        }
    };

    // Unlike `clamp`, never panics on an inverted range.
    (base + level_bonus + wild_bonus)
        .max(config.min_chance)
        .min(config.max_chance)
}

/// Chance that a wild escapes after resisting a capture.
pub fn flee_chance(wild_level: u8, config: &CaptureConfig) -> f64 {
    (config.flee_base + wild_level as f64 * config.flee_per_level).min(config.flee_max)
}

pub fn roll_capture_success(probability: f64, rng: &mut GameRng) -> bool {
    rng.roll(probability, "capture roll")
}

pub fn roll_flee(chance: f64, rng: &mut GameRng) -> bool {
    rng.roll(chance, "flee roll")
}

/// Descriptive capture odds for display purposes.
pub fn get_capture_chance_description(probability: f64) -> &'static str {
    match probability {
        p if p >= 0.9 => "Excellent",
        p if p >= 0.6 => "Very Good",
        p if p >= 0.4 => "Good",
        p if p >= 0.25 => "Fair",
        p if p >= 0.1 => "Poor",
        _ => "Very Poor",
    }
}
