use crate::config::ProgressionConfig;
use crate::errors::{ActionError, ActionResult};
use crate::pokemon::RosterEntry;
use schema::SpeciesSummary;

/// Pre-order depth-first search over any tree, returning the first node
/// matching `predicate`. Runs on an explicit stack so deep trees cannot
/// overflow the call stack.
pub fn find_first<'a, T, C, P>(root: &'a T, children: C, predicate: P) -> Option<&'a T>
where
    C: Fn(&'a T) -> &'a [T],
    P: Fn(&T) -> bool,
{
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if predicate(node) {
            return Some(node);
        }
        // Reversed so the first child is visited next.
        stack.extend(children(node).iter().rev());
    }
    None
}

/// Callers gate manual evolution on this; `apply_evolution` does not check it.
pub fn check_evolution_level(entry: &RosterEntry, config: &ProgressionConfig) -> ActionResult<()> {
    if entry.level < config.evolve_level {
        return Err(ActionError::LevelTooLow {
            required: config.evolve_level,
            actual: entry.level,
        });
    }
    Ok(())
}

/// Rewrite the entry in place as `target`. Level, XP and team membership
/// carry over; cached species metadata is dropped until re-hydrated.
pub fn apply_evolution(entry: &mut RosterEntry, target: &SpeciesSummary) {
    tracing::info!("{} evolved into {}", entry.name, target.name);
    entry.current_species_id = target.id;
    entry.name = target.name.clone();
    entry.sprite = target.sprite.clone();
    entry.types.clear();
    entry.base_stats = None;
    entry.derived_stats = None;
}
