use crate::pokemon::InstanceId;
use schema::SpeciesId;
use thiserror::Error;

/// Top-level error for anything that can stop the game from starting.
/// Once a session is running, nothing below is fatal.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Failures talking to the external Pokédex provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed provider payload: {0}")]
    Malformed(String),

    #[error("species {0} not known to the provider")]
    UnknownSpecies(SpeciesId),
}

/// A user action that was rejected. The state it targeted is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("team already has {capacity} members")]
    TeamFull { capacity: usize },

    #[error("no roster entry with id {0}")]
    UnknownEntry(InstanceId),

    #[error("{0} is not on the team")]
    NotInTeam(InstanceId),

    #[error("{id} is fainted until {until}")]
    BattlerFainted { id: InstanceId, until: u64 },

    #[error("no team member is able to battle")]
    NoEligibleBattler,

    #[error("there is no wild encounter right now")]
    NoActiveEncounter,

    #[error("the encounter has no battle")]
    NoActiveBattle,

    #[error("the battle is not accepting turns")]
    BattleNotInProgress,

    #[error("the battle has already ended")]
    BattleEnded,

    #[error("a scheduled transition for this encounter is still pending")]
    TransitionPending,

    #[error("no zone with id {0}")]
    UnknownZone(u32),

    #[error("no zone is open")]
    NoZoneOpen,

    #[error("zone {zone_id} requires level {required_level}")]
    ZoneLocked { zone_id: u32, required_level: u8 },

    #[error("capture of species {species_id} is on cooldown for {remaining_ms}ms")]
    CaptureOnCooldown { species_id: SpeciesId, remaining_ms: u64 },

    #[error("species {0} cannot be captured here")]
    CaptureNotAllowed(SpeciesId),

    #[error("level {level} is outside 1-{max}")]
    InvalidLevel { level: u16, max: u8 },

    #[error("evolution requires level {required}, entry is level {actual}")]
    LevelTooLow { required: u8, actual: u8 },

    #[error("species {0} has no further evolution")]
    NoEvolution(SpeciesId),
}

/// Roster persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("roster store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Error marker stored in a result slot of `map_with_concurrency`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("worker failed: {0}")]
    Worker(String),

    #[error("worker aborted before producing a result")]
    Aborted,
}

/// Type alias for Results using ProviderError
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Type alias for Results using ActionError
pub type ActionResult<T> = Result<T, ActionError>;

/// Type alias for Results using StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for Results using GameError
pub type GameResult<T> = Result<T, GameError>;
