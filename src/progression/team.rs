use crate::config::ProgressionConfig;
use crate::errors::{ActionError, ActionResult};
use crate::pokemon::{InstanceId, RosterEntry};
use crate::roster::Roster;

/// Flip team membership of `id` and return the new membership.
/// Joining a full team is rejected and leaves the roster untouched.
pub fn toggle_team_membership(
    roster: &mut Roster,
    id: &InstanceId,
    config: &ProgressionConfig,
) -> ActionResult<bool> {
    let team_count = roster.team_count();
    let entry = roster
        .find_mut(id)
        .ok_or_else(|| ActionError::UnknownEntry(id.clone()))?;

    if !entry.in_team && team_count >= config.team_capacity {
        return Err(ActionError::TeamFull {
            capacity: config.team_capacity,
        });
    }

    entry.in_team = !entry.in_team;
    Ok(entry.in_team)
}

/// Set the level directly. Must lie in `1..=max_level`; XP restarts at 0.
pub fn set_level(
    roster: &mut Roster,
    id: &InstanceId,
    level: u16,
    config: &ProgressionConfig,
) -> ActionResult<()> {
    if level < 1 || level > config.max_level as u16 {
        return Err(ActionError::InvalidLevel {
            level,
            max: config.max_level,
        });
    }
    let entry = roster
        .find_mut(id)
        .ok_or_else(|| ActionError::UnknownEntry(id.clone()))?;

    entry.level = level as u8;
    entry.xp = 0;
    entry.refresh_derived_stats();
    Ok(())
}

pub fn release(roster: &mut Roster, id: &InstanceId) -> ActionResult<RosterEntry> {
    roster
        .remove(id)
        .ok_or_else(|| ActionError::UnknownEntry(id.clone()))
}
