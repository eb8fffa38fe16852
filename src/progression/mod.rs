pub mod evolution;
pub mod experience;
pub mod team;

pub use evolution::{apply_evolution, check_evolution_level, find_first};
pub use experience::{
    apply_xp, award_battle_xp, award_capture_xp, battle_xp_total, BattleXpAward, LevelUp,
};
pub use team::{release, set_level, toggle_team_membership};
