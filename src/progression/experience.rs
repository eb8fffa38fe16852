use crate::config::{BattleConfig, ProgressionConfig};
use crate::pokemon::{level_threshold, InstanceId, RosterEntry};
use crate::roster::Roster;
use serde::{Deserialize, Serialize};

/// An entry crossing one or more level thresholds in a single grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub entry_id: InstanceId,
    pub from_level: u8,
    pub to_level: u8,
}

/// How a victory's XP was split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BattleXpAward {
    pub total: u32,
    pub winner_share: u32,
    /// Amount each other team member received.
    pub member_share: u32,
    pub level_ups: Vec<LevelUp>,
}

/// Add `delta` XP and level up while the threshold `max(20, level * 60)` is
/// met. Several levels may be gained at once. At `max_level` the surplus is
/// clamped so that `xp` stays below the threshold.
pub fn apply_xp(entry: &mut RosterEntry, delta: u32, config: &ProgressionConfig) -> Option<LevelUp> {
    let from_level = entry.level;
    entry.xp = entry.xp.saturating_add(delta);

    while entry.level < config.max_level {
        let threshold = level_threshold(entry.level, config);
        if entry.xp < threshold {
            break;
        }
        entry.xp -= threshold;
        entry.level += 1;
    }

    if entry.level >= config.max_level {
        let cap = level_threshold(entry.level, config).saturating_sub(1);
        entry.xp = entry.xp.min(cap);
    }

    if entry.level == from_level {
        return None;
    }

    entry.refresh_derived_stats();
    tracing::info!(
        "{} grew from level {} to {}",
        entry.name,
        from_level,
        entry.level
    );
    Some(LevelUp {
        entry_id: entry.id.clone(),
        from_level,
        to_level: entry.level,
    })
}

/// Give `amount` XP to every team member. Benched entries get nothing.
pub fn award_capture_xp(roster: &mut Roster, amount: u32, config: &ProgressionConfig) -> Vec<LevelUp> {
    roster
        .iter_mut()
        .filter(|e| e.in_team)
        .filter_map(|e| apply_xp(e, amount, config))
        .collect()
}

/// XP granted for defeating a wild of `wild_level`.
pub fn battle_xp_total(wild_level: u8, config: &BattleConfig) -> u32 {
    (wild_level as u32 * config.victory_xp_per_level).max(config.victory_xp_min)
}

/// The winner takes `winner_share` of `total` rounded up; the rest is split
/// evenly, rounded down, across the other team members.
pub fn award_battle_xp(
    roster: &mut Roster,
    winner_id: &InstanceId,
    total: u32,
    battle_config: &BattleConfig,
    config: &ProgressionConfig,
) -> BattleXpAward {
    // Rounded before the ceiling so that 0.7 * 30 does not become 22.
    let scaled = (total as f64 * battle_config.winner_share * 1e6).round() / 1e6;
    let winner_share = (scaled.ceil() as u32).min(total);
    let remainder = total - winner_share;

    let others = roster
        .team_members()
        .filter(|e| &e.id != winner_id)
        .count() as u32;
    let member_share = if others > 0 { remainder / others } else { 0 };

    let mut level_ups = Vec::new();
    for entry in roster.iter_mut() {
        let delta = if &entry.id == winner_id {
            winner_share
        } else if entry.in_team {
            member_share
        } else {
            continue;
        };
        if let Some(level_up) = apply_xp(entry, delta, config) {
            level_ups.push(level_up);
        }
    }

    tracing::debug!(
        "Battle XP {}: winner {} gets {}, {} others get {} each",
        total,
        winner_id,
        winner_share,
        others,
        member_share
    );

    BattleXpAward {
        total,
        winner_share,
        member_share,
        level_ups,
    }
}
