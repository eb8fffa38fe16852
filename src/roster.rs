use crate::errors::{StoreError, StoreResult};
use crate::pokemon::{InstanceId, RosterEntry, TrainerId};
use schema::SpeciesId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterSort {
    #[default]
    Captured,
    Level,
    Name,
    Pokedex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// One trainer's captured instances, kept in capture order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    next_seq: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<RosterEntry>) -> Self {
        Self {
            entries,
            next_seq: 0,
        }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, entry: RosterEntry) {
        self.entries.push(entry);
    }

    pub fn find(&self, id: &InstanceId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn find_mut(&mut self, id: &InstanceId) -> Option<&mut RosterEntry> {
        self.entries.iter_mut().find(|e| &e.id == id)
    }

    pub fn remove(&mut self, id: &InstanceId) -> Option<RosterEntry> {
        let index = self.entries.iter().position(|e| &e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RosterEntry> {
        self.entries.iter_mut()
    }

    pub fn team_members(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter().filter(|e| e.in_team)
    }

    pub fn team_count(&self) -> usize {
        self.team_members().count()
    }

    /// First team member, in capture order, that is able to battle at `now`.
    pub fn first_battle_ready(&self, now: u64) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.can_battle(now))
    }

    /// Team members able to battle at `now`.
    pub fn selectable_battlers(&self, now: u64) -> Vec<&RosterEntry> {
        self.entries.iter().filter(|e| e.can_battle(now)).collect()
    }

    /// Highest level in the whole roster; 0 when empty. Gates zone unlocks.
    pub fn max_level(&self) -> u8 {
        self.entries.iter().map(|e| e.level).max().unwrap_or(0)
    }

    /// Highest level among team members; 0 without a team. Feeds the
    /// capture level bonus.
    pub fn max_team_level(&self) -> u8 {
        self.team_members().map(|e| e.level).max().unwrap_or(0)
    }

    /// Owned entries that were captured as `species_id`.
    pub fn count_of_species(&self, species_id: SpeciesId) -> usize {
        self.entries
            .iter()
            .filter(|e| e.original_species_id == species_id)
            .count()
    }

    /// A sorted view of the roster. Ties keep capture order.
    pub fn sorted(&self, sort: RosterSort, order: SortOrder) -> Vec<&RosterEntry> {
        let mut view: Vec<(usize, &RosterEntry)> = self.entries.iter().enumerate().collect();
        view.sort_by(|(ia, a), (ib, b)| {
            let ordering = match sort {
                RosterSort::Captured => ia.cmp(ib),
                RosterSort::Level => a.level.cmp(&b.level),
                RosterSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                RosterSort::Pokedex => a.original_species_id.cmp(&b.original_species_id),
            };
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        view.into_iter().map(|(_, entry)| entry).collect()
    }

    /// A fresh instance id of the form `{now}-{seq}`, unique within the roster.
    pub fn next_instance_id(&mut self, now: u64) -> InstanceId {
        loop {
            self.next_seq += 1;
            let candidate = InstanceId(format!("{}-{}", now, self.next_seq));
            if self.find(&candidate).is_none() {
                return candidate;
            }
        }
    }
}

/// Key-value persistence of roster collections, keyed by trainer.
pub trait RosterStore: Send + Sync {
    fn load_roster(&self, trainer: &TrainerId) -> StoreResult<Vec<RosterEntry>>;
    fn save_roster(&self, trainer: &TrainerId, entries: &[RosterEntry]) -> StoreResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryRosterStore {
    rosters: Mutex<HashMap<TrainerId, Vec<RosterEntry>>>,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RosterStore for MemoryRosterStore {
    fn load_roster(&self, trainer: &TrainerId) -> StoreResult<Vec<RosterEntry>> {
        let rosters = self.rosters.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(rosters.get(trainer).cloned().unwrap_or_default())
    }

    fn save_roster(&self, trainer: &TrainerId, entries: &[RosterEntry]) -> StoreResult<()> {
        let mut rosters = self.rosters.lock().map_err(|_| StoreError::LockPoisoned)?;
        rosters.insert(trainer.clone(), entries.to_vec());
        Ok(())
    }
}

/// Stores each trainer's roster as `roster_{trainer}.json` under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileRosterStore {
    dir: PathBuf,
}

impl JsonFileRosterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// One file per trainer. The id is hex-encoded so distinct ids never
    /// share a file name.
    fn path_for(&self, trainer: &TrainerId) -> PathBuf {
        self.dir
            .join(format!("roster_{}.json", hex::encode(trainer.0.as_bytes())))
    }
}

impl RosterStore for JsonFileRosterStore {
    fn load_roster(&self, trainer: &TrainerId) -> StoreResult<Vec<RosterEntry>> {
        let path = self.path_for(trainer);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&path)?;
        let entries = serde_json::from_str(&contents)?;
        Ok(entries)
    }

    fn save_roster(&self, trainer: &TrainerId, entries: &[RosterEntry]) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(self.path_for(trainer), contents)?;
        tracing::debug!("Saved {} roster entries for {}", entries.len(), trainer);
        Ok(())
    }
}
