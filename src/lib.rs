//! Pokemon Zones Encounter Engine
//!
//! Wild encounters, turn-based battles, captures and a persistent roster with
//! XP and evolution, played across level-gated zones of the Pokédex. Species
//! data comes from an external Pokédex provider and is fetched lazily through
//! a cache and a bounded-concurrency pipeline.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod encounter;
pub mod errors;
pub mod pokemon;
pub mod progression;
pub mod provider;
pub mod rng;
pub mod roster;
pub mod species;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{BaseStats, PokemonType, Species, SpeciesId, SpeciesSummary, Zone};

// --- From this crate's modules (`src/`) ---

// Battle engine functions and state.
pub use battle::engine::{resolve_turn, start_battle, TurnOutcome, TurnReport};
pub use battle::state::{Battle, BattleEvent, BattleOutcome, BattlePhase};

// Capture resolution.
pub use battle::catch::{capture_probability, CaptureAttempt, CaptureKind};

// Session and encounters.
pub use encounter::{EncounterId, SessionEvent, WildEncounter, WildSpawner, ZoneSession};

// Roster and its persistence.
pub use pokemon::{derive_stats, DerivedStats, InstanceId, RosterEntry, TrainerId};
pub use roster::{JsonFileRosterStore, MemoryRosterStore, Roster, RosterSort, RosterStore, SortOrder};

// Pokédex access.
pub use provider::{MemoryProvider, MetadataService, PokeApiProvider, PokedexProvider};

pub use config::{BattleMode, GameConfig};
pub use rng::GameRng;

// Crate-specific error and result types.
pub use errors::{
    ActionError, ActionResult, ConfigError, GameError, GameResult, PipelineError, ProviderError,
    ProviderResult, StoreError, StoreResult,
};
