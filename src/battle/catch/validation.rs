use crate::config::ZoneConfig;
use crate::errors::{ActionError, ActionResult};
use crate::species::is_early_zone;
use schema::{Species, SpeciesId, Zone};
use std::collections::HashMap;

/// Per-species lockout started by a successful capture, so a freshly spawned
/// replacement of the same species cannot be thrown at right away.
#[derive(Debug, Clone, Default)]
pub struct CaptureCooldowns {
    until: HashMap<SpeciesId, u64>,
}

impl CaptureCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, species_id: SpeciesId, now: u64, cooldown_ms: u64) {
        self.until.insert(species_id, now + cooldown_ms);
    }

    pub fn remaining_ms(&self, species_id: SpeciesId, now: u64) -> Option<u64> {
        self.until
            .get(&species_id)
            .filter(|&&until| until > now)
            .map(|&until| until - now)
    }

    pub fn check(&self, species_id: SpeciesId, now: u64) -> ActionResult<()> {
        match self.remaining_ms(species_id, now) {
            Some(remaining_ms) => Err(ActionError::CaptureOnCooldown {
                species_id,
                remaining_ms,
            }),
            None => Ok(()),
        }
    }

    /// Forget cooldowns that have run out.
    pub fn prune(&mut self, now: u64) {
        self.until.retain(|_, until| *until > now);
    }
}

/// A direct capture must target a species of the open zone, and early zones
/// only allow base forms.
pub fn can_attempt_direct_capture(
    zone: &Zone,
    species: &Species,
    config: &ZoneConfig,
) -> ActionResult<()> {
    if !zone.contains(species.id) {
        return Err(ActionError::CaptureNotAllowed(species.id));
    }
    if is_early_zone(zone, config) && !species.is_base {
        return Err(ActionError::CaptureNotAllowed(species.id));
    }
    Ok(())
}
