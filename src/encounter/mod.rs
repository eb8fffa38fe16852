pub mod session;
pub mod spawner;

pub use session::{SessionEvent, ZoneSession};
pub use spawner::{EncounterId, WildEncounter, WildSpawner};
