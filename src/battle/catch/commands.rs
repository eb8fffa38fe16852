use crate::battle::catch::{
    capture_probability, flee_chance, roll_capture_success, roll_flee, CaptureKind,
};
use crate::config::CaptureConfig;
use crate::encounter::WildEncounter;
use crate::pokemon::{InstanceId, RosterEntry};
use crate::rng::GameRng;
use schema::Species;

/// Resolution of one capture throw.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureAttempt {
    pub probability: f64,
    pub success: bool,
    /// The wild escaped after resisting. Never set on success or for
    /// direct captures.
    pub fled: bool,
    pub message: String,
}

/// Throw at the active wild. One draw decides the capture; on failure a
/// second draw may let the wild flee.
pub fn resolve_wild_capture(
    encounter: &WildEncounter,
    team_max_level: u8,
    config: &CaptureConfig,
    rng: &mut GameRng,
) -> CaptureAttempt {
    let hp_depleted = encounter
        .battle
        .as_ref()
        .map(|b| b.wild.hp_depleted())
        .unwrap_or(0.0);
    let kind = CaptureKind::Wild {
        wild_level: encounter.wild_level,
        hp_depleted,
    };
    let probability = capture_probability(encounter.species.is_base, team_max_level, kind, config);

    if roll_capture_success(probability, rng) {
        tracing::info!(
            "Captured wild {} (Lv {}) at {:.2}",
            encounter.species.name,
            encounter.wild_level,
            probability
        );
        return CaptureAttempt {
            probability,
            success: true,
            fled: false,
            message: format!(
                "Captured {} (Lv {})!",
                encounter.species.name, encounter.wild_level
            ),
        };
    }

    let fled = roll_flee(flee_chance(encounter.wild_level, config), rng);
    let message = if fled {
        format!("The wild {} got away!", encounter.species.name)
    } else {
        "The capture failed.".to_string()
    };
    tracing::debug!(
        "Capture of {} failed at {:.2}, fled: {}",
        encounter.species.name,
        probability,
        fled
    );
    CaptureAttempt {
        probability,
        success: false,
        fled,
        message,
    }
}

/// Throw at a species picked from the zone list.
pub fn resolve_direct_capture(
    species: &Species,
    team_max_level: u8,
    config: &CaptureConfig,
    rng: &mut GameRng,
) -> CaptureAttempt {
    let probability = capture_probability(species.is_base, team_max_level, CaptureKind::Direct, config);
    let success = roll_capture_success(probability, rng);
    let message = if success {
        format!("Captured {}!", species.name)
    } else {
        "The capture failed.".to_string()
    };
    CaptureAttempt {
        probability,
        success,
        fled: false,
        message,
    }
}

/// The roster entry created by a successful capture, carrying over whatever
/// metadata the species already has.
pub fn new_captured_entry(id: InstanceId, species: &Species, level: u8) -> RosterEntry {
    let mut entry = RosterEntry::new(id, species.id, &species.name, &species.sprite, level);
    entry.attach_metadata(species.types.clone(), species.base_stats);
    entry
}
