use crate::battle::catch::{
    can_attempt_direct_capture, new_captured_entry, resolve_direct_capture, resolve_wild_capture,
    CaptureAttempt, CaptureCooldowns,
};
use crate::battle::engine::{self, TurnOutcome, TurnReport};
use crate::battle::state::Battle;
use crate::config::{BattleMode, GameConfig};
use crate::encounter::spawner::{EncounterId, WildEncounter, WildSpawner};
use crate::errors::{ActionError, ActionResult};
use crate::pokemon::{InstanceId, RosterEntry, TrainerId};
use crate::progression::{
    apply_evolution, award_capture_xp, check_evolution_level, release, set_level,
    toggle_team_membership,
};
use crate::provider::{MetadataService, SpeciesMetadata};
use crate::rng::GameRng;
use crate::roster::{Roster, RosterStore};
use crate::species::{build_zones, is_zone_unlocked, ZoneTheme};
use schema::{Species, SpeciesId, SpeciesSummary, Zone};
use std::sync::Arc;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionKind {
    ClearEncounter,
    ForceSpawn,
    AutoSubstitute,
}

/// A delayed state change. `encounter` names the encounter that caused it,
/// so it can be cancelled when that encounter goes away first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduledTransition {
    due_at: u64,
    kind: TransitionKind,
    zone_id: u32,
    encounter: Option<EncounterId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HydrationTarget {
    Encounter(EncounterId),
    RosterEntry {
        id: InstanceId,
        species_id: SpeciesId,
    },
}

#[derive(Debug)]
struct HydrationResult {
    target: HydrationTarget,
    metadata: SpeciesMetadata,
}

/// Something that happened on its own during [`ZoneSession::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Spawned {
        encounter: EncounterId,
        species: String,
        level: u8,
    },
    Cleared(EncounterId),
    Substituted {
        id: InstanceId,
        name: String,
    },
    Defeated(EncounterId),
    Turn(TurnReport),
}

/// One trainer's play session: the roster, the open zone with its active
/// encounter, capture cooldowns and the delayed transitions between
/// encounters.
///
/// Time is passed in explicitly as milliseconds. Scheduled transitions run
/// from [`tick`](Self::tick); hydration results are applied on the next
/// call to `tick`, [`apply_hydrations`](Self::apply_hydrations) or
/// [`wait_for_hydration`](Self::wait_for_hydration), and only if their
/// target still exists.
pub struct ZoneSession {
    trainer: TrainerId,
    config: GameConfig,
    roster: Roster,
    store: Arc<dyn RosterStore>,
    metadata: MetadataService,
    universe: Vec<SpeciesSummary>,
    zones: Vec<Zone>,
    zone_species: Vec<Species>,
    spawner: Option<WildSpawner>,
    cooldowns: CaptureCooldowns,
    pending: Vec<ScheduledTransition>,
    hydrations: JoinSet<HydrationResult>,
    rng: GameRng,
    last_auto_turn: u64,
}

impl ZoneSession {
    /// Load the trainer's roster and build the zone list. A failing store or
    /// provider leaves the session empty but usable.
    pub async fn start(
        trainer: TrainerId,
        config: GameConfig,
        store: Arc<dyn RosterStore>,
        metadata: MetadataService,
        rng: GameRng,
    ) -> Self {
        let entries = store.load_roster(&trainer).unwrap_or_else(|e| {
            tracing::warn!("Failed to load roster for {}: {}", trainer, e);
            Vec::new()
        });
        let universe = metadata.list_species(config.pokedex.species_limit).await;
        let zones = build_zones(&universe, &config.zones);
        tracing::info!(
            "Session for {}: {} roster entries, {} zones",
            trainer,
            entries.len(),
            zones.len()
        );

        let mut session = Self {
            trainer,
            config,
            roster: Roster::from_entries(entries),
            store,
            metadata,
            universe,
            zones,
            zone_species: Vec::new(),
            spawner: None,
            cooldowns: CaptureCooldowns::new(),
            pending: Vec::new(),
            hydrations: JoinSet::new(),
            rng,
            last_auto_turn: 0,
        };

        let stale: Vec<(InstanceId, SpeciesId)> = session
            .roster
            .entries()
            .iter()
            .filter(|e| e.needs_hydration())
            .map(|e| (e.id.clone(), e.current_species_id))
            .collect();
        for (id, species_id) in stale {
            session.request_hydration(HydrationTarget::RosterEntry { id, species_id }, species_id);
        }
        session
    }

    pub fn trainer(&self) -> &TrainerId {
        &self.trainer
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn is_zone_unlocked(&self, zone: &Zone) -> bool {
        is_zone_unlocked(zone, self.roster.max_level())
    }

    pub fn current_zone(&self) -> Option<&Zone> {
        self.spawner.as_ref().map(WildSpawner::zone)
    }

    /// Hydrated species of the open zone, in catalogue order.
    pub fn zone_species(&self) -> &[Species] {
        &self.zone_species
    }

    pub fn theme(&self) -> Option<ZoneTheme> {
        self.current_zone()
            .map(|zone| ZoneTheme::detect(zone, &self.zone_species))
    }

    pub fn encounter(&self) -> Option<&WildEncounter> {
        self.spawner.as_ref().and_then(WildSpawner::active)
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.encounter().and_then(|e| e.battle.as_ref())
    }

    /// When the earliest scheduled transition is due.
    pub fn next_transition_at(&self) -> Option<u64> {
        self.pending.iter().map(|t| t.due_at).min()
    }

    pub fn hydrations_in_flight(&self) -> usize {
        self.hydrations.len()
    }

    /// Open `zone_id`, discarding the current encounter, its battle and
    /// every scheduled transition, then hydrate the zone and spawn.
    pub async fn open_zone(&mut self, zone_id: u32, now: u64) -> ActionResult<()> {
        let zone = self
            .zones
            .iter()
            .find(|z| z.id == zone_id)
            .cloned()
            .ok_or(ActionError::UnknownZone(zone_id))?;
        if !self.is_zone_unlocked(&zone) {
            return Err(ActionError::ZoneLocked {
                zone_id,
                required_level: zone.required_level,
            });
        }

        if let Some(previous) = self.spawner.take() {
            tracing::debug!("Leaving {}", previous.zone().name);
        }
        self.pending.clear();
        self.zone_species.clear();

        self.zone_species = self.metadata.hydrate_zone(&zone, &self.universe).await;
        tracing::info!("Opened {} ({} species)", zone.name, self.zone_species.len());
        self.spawner = Some(WildSpawner::new(zone, &self.zone_species, &self.config.zones));
        self.spawn_now(now, false);
        Ok(())
    }

    /// Start fighting the active encounter.
    pub fn fight(&mut self, now: u64) -> ActionResult<&Battle> {
        let spawner = self.spawner.as_mut().ok_or(ActionError::NoZoneOpen)?;
        let encounter = spawner.active_mut().ok_or(ActionError::NoActiveEncounter)?;
        if encounter.battle.is_none() {
            self.last_auto_turn = now;
        }
        engine::start_battle(encounter, &self.roster, now)
    }

    /// Send out a specific team member, e.g. after a faint in manual mode.
    pub fn select_battler(&mut self, id: &InstanceId, now: u64) -> ActionResult<()> {
        let spawner = self.spawner.as_mut().ok_or(ActionError::NoZoneOpen)?;
        let encounter = spawner.active_mut().ok_or(ActionError::NoActiveEncounter)?;
        engine::select_battler(encounter, &self.roster, id, now)
    }

    /// Resolve one battle turn. Rejected while a transition caused by this
    /// encounter is still pending.
    pub fn attack(&mut self, now: u64) -> ActionResult<TurnReport> {
        let encounter_id = self.encounter().ok_or(ActionError::NoActiveEncounter)?.id;
        if self.has_pending_for(encounter_id) {
            return Err(ActionError::TransitionPending);
        }

        let spawner = self.spawner.as_mut().ok_or(ActionError::NoZoneOpen)?;
        let encounter = spawner.active_mut().ok_or(ActionError::NoActiveEncounter)?;
        let report = engine::resolve_turn(encounter, &mut self.roster, &self.config, now)?;
        if report.outcome == TurnOutcome::Continue {
            return Ok(report);
        }

        match &report.outcome {
            TurnOutcome::Continue => {}
            TurnOutcome::Victory(_) => {
                let timing = &self.config.timing;
                let (clear_at, respawn_at) = (now + timing.victory_clear_ms, now + timing.victory_respawn_ms);
                self.schedule(TransitionKind::ClearEncounter, clear_at, Some(encounter_id));
                self.schedule(TransitionKind::ForceSpawn, respawn_at, Some(encounter_id));
            }
            TurnOutcome::PlayerFainted { .. } => {
                if self.config.battle.mode == BattleMode::Continuous {
                    let due_at = now + self.config.battle.substitute_delay_ms;
                    self.schedule(TransitionKind::AutoSubstitute, due_at, Some(encounter_id));
                }
            }
            TurnOutcome::Defeat => self.handle_defeat(encounter_id, now),
        }
        self.persist();
        Ok(report)
    }

    /// Throw at the active wild encounter.
    pub fn attempt_capture(&mut self, now: u64) -> ActionResult<CaptureAttempt> {
        let spawner = self.spawner.as_ref().ok_or(ActionError::NoZoneOpen)?;
        let encounter = spawner.active().ok_or(ActionError::NoActiveEncounter)?;
        self.cooldowns.check(encounter.species.id, now)?;

        let attempt = resolve_wild_capture(
            encounter,
            self.roster.max_team_level(),
            &self.config.capture,
            &mut self.rng,
        );
        let (encounter_id, species, level) =
            (encounter.id, encounter.species.clone(), encounter.wild_level);

        if attempt.success {
            self.add_captured(&species, level, now);
            self.finish_encounter(encounter_id, now + self.config.timing.capture_respawn_ms);
            self.persist();
        } else if attempt.fled {
            self.finish_encounter(encounter_id, now + self.config.timing.flee_respawn_ms);
        }
        Ok(attempt)
    }

    /// Throw at a species picked from the open zone's list. The new entry
    /// starts at level 1 and a fresh encounter is spawned shortly after.
    pub fn attempt_direct_capture(&mut self, species_id: SpeciesId, now: u64) -> ActionResult<CaptureAttempt> {
        let zone = self.current_zone().ok_or(ActionError::NoZoneOpen)?;
        let species = self
            .zone_species
            .iter()
            .find(|s| s.id == species_id)
            .ok_or(ActionError::CaptureNotAllowed(species_id))?;
        can_attempt_direct_capture(zone, species, &self.config.zones)?;
        self.cooldowns.check(species_id, now)?;

        let species = species.clone();
        let attempt = resolve_direct_capture(
            &species,
            self.roster.max_team_level(),
            &self.config.capture,
            &mut self.rng,
        );
        if attempt.success {
            self.add_captured(&species, 1, now);
            let due_at = now + self.config.timing.direct_capture_respawn_ms;
            let active = self.encounter().map(|e| e.id);
            self.schedule(TransitionKind::ForceSpawn, due_at, active);
            self.persist();
        }
        Ok(attempt)
    }

    pub fn toggle_team(&mut self, id: &InstanceId) -> ActionResult<bool> {
        let in_team = toggle_team_membership(&mut self.roster, id, &self.config.progression)?;
        self.persist();
        Ok(in_team)
    }

    pub fn set_level(&mut self, id: &InstanceId, level: u16) -> ActionResult<()> {
        set_level(&mut self.roster, id, level, &self.config.progression)?;
        self.persist();
        Ok(())
    }

    pub fn release(&mut self, id: &InstanceId) -> ActionResult<RosterEntry> {
        let released = release(&mut self.roster, id)?;
        tracing::info!("Released {} ({})", released.name, released.id);
        self.persist();
        Ok(released)
    }

    /// Evolve `id` into the next stage of its evolution chain.
    pub async fn evolve(&mut self, id: &InstanceId) -> ActionResult<SpeciesSummary> {
        let entry = self
            .roster
            .find(id)
            .ok_or_else(|| ActionError::UnknownEntry(id.clone()))?;
        check_evolution_level(entry, &self.config.progression)?;
        let species_id = entry.current_species_id;

        let target = self
            .metadata
            .evolution_target(species_id)
            .await
            .ok_or(ActionError::NoEvolution(species_id))?;

        // The entry may have been released while the lookup was in flight.
        let entry = self
            .roster
            .find_mut(id)
            .ok_or_else(|| ActionError::UnknownEntry(id.clone()))?;
        apply_evolution(entry, &target);
        self.request_hydration(
            HydrationTarget::RosterEntry {
                id: id.clone(),
                species_id: target.id,
            },
            target.id,
        );
        self.persist();
        Ok(target)
    }

    /// Run every transition due at `now`, oldest first, then in continuous
    /// mode resolve a turn once the auto-turn interval has passed.
    pub fn tick(&mut self, now: u64) -> Vec<SessionEvent> {
        self.apply_hydrations();
        self.cooldowns.prune(now);

        let mut events = Vec::new();
        self.pending.sort_by_key(|t| t.due_at);
        while self.pending.first().is_some_and(|t| t.due_at <= now) {
            let transition = self.pending.remove(0);
            events.extend(self.run_transition(transition));
        }

        if self.auto_turn_due(now) {
            self.last_auto_turn = now;
            match self.attack(now) {
                Ok(report) => events.push(SessionEvent::Turn(report)),
                Err(e) => tracing::debug!("Auto turn skipped: {}", e),
            }
        }
        events
    }

    /// Apply hydration results that have already arrived.
    pub fn apply_hydrations(&mut self) {
        while let Some(joined) = self.hydrations.try_join_next() {
            match joined {
                Ok(result) => self.apply_hydration(result),
                Err(e) => tracing::warn!("Hydration task failed: {}", e),
            }
        }
    }

    /// Wait for every outstanding hydration and apply the results.
    pub async fn wait_for_hydration(&mut self) {
        while let Some(joined) = self.hydrations.join_next().await {
            match joined {
                Ok(result) => self.apply_hydration(result),
                Err(e) => tracing::warn!("Hydration task failed: {}", e),
            }
        }
    }

    fn auto_turn_due(&self, now: u64) -> bool {
        self.config.battle.mode == BattleMode::Continuous
            && self.battle().is_some_and(|b| !b.is_ended())
            && now.saturating_sub(self.last_auto_turn) >= self.config.battle.auto_turn_interval_ms
    }

    // A pending respawn alone does not hold up turns.
    fn has_pending_for(&self, encounter_id: EncounterId) -> bool {
        self.pending
            .iter()
            .any(|t| t.encounter == Some(encounter_id) && t.kind != TransitionKind::ForceSpawn)
    }

    fn schedule(&mut self, kind: TransitionKind, due_at: u64, encounter: Option<EncounterId>) {
        let Some(zone_id) = self.current_zone().map(|z| z.id) else {
            return;
        };
        tracing::debug!("Scheduled {:?} at {}", kind, due_at);
        self.pending.push(ScheduledTransition {
            due_at,
            kind,
            zone_id,
            encounter,
        });
    }

    fn run_transition(&mut self, transition: ScheduledTransition) -> Option<SessionEvent> {
        if self.current_zone().map(|z| z.id) != Some(transition.zone_id) {
            tracing::debug!("Dropping {:?} for a zone no longer open", transition.kind);
            return None;
        }
        let active_id = self.encounter().map(|e| e.id);

        match transition.kind {
            TransitionKind::ClearEncounter => {
                let target = transition.encounter?;
                if active_id != Some(target) {
                    return None;
                }
                if let Some(spawner) = self.spawner.as_mut() {
                    spawner.clear();
                }
                Some(SessionEvent::Cleared(target))
            }
            TransitionKind::ForceSpawn => {
                let battling = self
                    .encounter()
                    .is_some_and(|e| Some(e.id) == transition.encounter && e.has_unresolved_battle());
                if battling {
                    tracing::debug!("Keeping encounter whose battle started after the respawn was queued");
                    return None;
                }
                self.spawn_now(transition.due_at, true)
            }
            TransitionKind::AutoSubstitute => {
                let target = transition.encounter?;
                if active_id != Some(target) {
                    return None;
                }
                let encounter = self.spawner.as_mut()?.active_mut()?;
                match engine::auto_substitute(encounter, &self.roster, transition.due_at) {
                    Ok(Some(id)) => {
                        let name = self.roster.find(&id).map(|e| e.name.clone()).unwrap_or_default();
                        Some(SessionEvent::Substituted { id, name })
                    }
                    Ok(None) => {
                        self.handle_defeat(target, transition.due_at);
                        self.persist();
                        Some(SessionEvent::Defeated(target))
                    }
                    Err(e) => {
                        tracing::debug!("Auto substitution skipped: {}", e);
                        None
                    }
                }
            }
        }
    }

    fn spawn_now(&mut self, now: u64, force: bool) -> Option<SessionEvent> {
        let spawner = self.spawner.as_mut()?;
        let encounter = if force {
            spawner.force_spawn(&mut self.rng, now)?
        } else {
            spawner.spawn(&mut self.rng, now)?
        };
        let event = SessionEvent::Spawned {
            encounter: encounter.id,
            species: encounter.species.name.clone(),
            level: encounter.wild_level,
        };
        if encounter.needs_hydration() {
            let (id, species_id) = (encounter.id, encounter.species.id);
            self.request_hydration(HydrationTarget::Encounter(id), species_id);
        }
        Some(event)
    }

    // The defeated wild stays out of reach: clear it now, respawn later.
    fn handle_defeat(&mut self, encounter_id: EncounterId, now: u64) {
        tracing::info!("Defeat; encounter {} cleared", encounter_id);
        self.finish_encounter(encounter_id, now + self.config.timing.flee_respawn_ms);
    }

    /// Clear the encounter, drop whatever it had scheduled and queue the
    /// next spawn.
    fn finish_encounter(&mut self, encounter_id: EncounterId, respawn_at: u64) {
        if let Some(spawner) = self.spawner.as_mut() {
            if spawner.active().map(|e| e.id) == Some(encounter_id) {
                spawner.clear();
            }
        }
        self.pending.retain(|t| t.encounter != Some(encounter_id));
        self.schedule(TransitionKind::ForceSpawn, respawn_at, None);
    }

    /// Add a caught `species` at `level`, joining the team when it has room,
    /// then pay capture XP to the team.
    fn add_captured(&mut self, species: &Species, level: u8, now: u64) -> InstanceId {
        let id = self.roster.next_instance_id(now);
        let mut entry = new_captured_entry(id.clone(), species, level);
        entry.in_team = self.roster.team_count() < self.config.progression.team_capacity;
        let needs_hydration = entry.needs_hydration();
        self.roster.add(entry);

        let level_ups = award_capture_xp(
            &mut self.roster,
            self.config.progression.xp_per_capture,
            &self.config.progression,
        );
        tracing::debug!("Capture XP raised {} team levels", level_ups.len());
        self.cooldowns
            .start(species.id, now, self.config.capture.cooldown_ms);

        if needs_hydration {
            self.request_hydration(
                HydrationTarget::RosterEntry {
                    id: id.clone(),
                    species_id: species.id,
                },
                species.id,
            );
        }
        id
    }

    fn request_hydration(&mut self, target: HydrationTarget, species_id: SpeciesId) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime; metadata for species {} not fetched", species_id);
            return;
        };
        let metadata = self.metadata.clone();
        self.hydrations.spawn_on(
            async move {
                HydrationResult {
                    target,
                    metadata: metadata.species_metadata(species_id).await,
                }
            },
            &handle,
        );
    }

    fn apply_hydration(&mut self, result: HydrationResult) {
        match result.target {
            HydrationTarget::Encounter(id) => {
                let applied = self
                    .spawner
                    .as_mut()
                    .is_some_and(|s| s.attach_metadata(id, result.metadata));
                if !applied {
                    tracing::debug!("Dropping stale hydration for encounter {}", id);
                }
            }
            HydrationTarget::RosterEntry { id, species_id } => {
                match self
                    .roster
                    .find_mut(&id)
                    .filter(|e| e.current_species_id == species_id)
                {
                    Some(entry) => {
                        entry.attach_metadata(result.metadata.types, result.metadata.base_stats);
                        self.persist();
                    }
                    None => tracing::debug!("Dropping stale hydration for roster entry {}", id),
                }
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save_roster(&self.trainer, self.roster.entries()) {
            tracing::warn!("Failed to save roster for {}: {}", self.trainer, e);
        }
    }
}
