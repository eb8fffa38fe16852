use crate::battle::calculators::{calculate_damage, turn_order, Combatant};
use crate::battle::state::{Battle, BattleEvent, BattleOutcome, BattlePhase, EventBus, Side};
use crate::config::GameConfig;
use crate::encounter::WildEncounter;
use crate::errors::{ActionError, ActionResult};
use crate::pokemon::InstanceId;
use crate::progression::{award_battle_xp, battle_xp_total, BattleXpAward};
use crate::roster::Roster;
use schema::PokemonType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Both sides are still standing.
    Continue,
    /// The active battler fainted; the battle waits for a substitute.
    PlayerFainted {
        fainted: InstanceId,
        revives_at: u64,
    },
    Victory(BattleXpAward),
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    pub events: Vec<BattleEvent>,
}

/// Start fighting the encounter. The first battle-ready team member is sent
/// out. Calling this on a battle that is still running returns it unchanged.
pub fn start_battle<'a>(
    encounter: &'a mut WildEncounter,
    roster: &Roster,
    now: u64,
) -> ActionResult<&'a Battle> {
    if let Some(battle) = &encounter.battle {
        if battle.is_ended() {
            return Err(ActionError::BattleEnded);
        }
        tracing::debug!("Battle against {} already running", encounter.species.name);
        return encounter.battle.as_ref().ok_or(ActionError::NoActiveBattle);
    }

    let first = roster
        .first_battle_ready(now)
        .ok_or(ActionError::NoEligibleBattler)?;

    let wild_max_hp = encounter.combat_stats().hp;
    let mut battle = Battle::new(encounter.species.name.clone(), wild_max_hp);
    battle.log.push(BattleEvent::BattleStarted {
        wild: encounter.species.name.clone(),
        wild_level: encounter.wild_level,
    });
    send_out(&mut battle, first.id.clone(), &first.name, first.battle_stats().hp);

    tracing::info!(
        "Battle started: {} vs wild {} (Lv {})",
        first.name,
        encounter.species.name,
        encounter.wild_level
    );
    Ok(encounter.battle.insert(battle))
}

/// Put `id` in as the active battler with full HP. Only battle-ready team
/// members may be chosen; a battle waiting for a replacement resumes.
pub fn select_battler(
    encounter: &mut WildEncounter,
    roster: &Roster,
    id: &InstanceId,
    now: u64,
) -> ActionResult<()> {
    let battle = encounter.battle.as_mut().ok_or(ActionError::NoActiveBattle)?;
    if battle.is_ended() {
        return Err(ActionError::BattleEnded);
    }

    let entry = roster
        .find(id)
        .ok_or_else(|| ActionError::UnknownEntry(id.clone()))?;
    if !entry.in_team {
        return Err(ActionError::NotInTeam(id.clone()));
    }
    if let Some(until) = entry.fainted_until.filter(|_| entry.is_fainted(now)) {
        return Err(ActionError::BattlerFainted {
            id: id.clone(),
            until,
        });
    }

    send_out(battle, entry.id.clone(), &entry.name, entry.battle_stats().hp);
    Ok(())
}

/// Continuous-mode replacement after a faint: send out the first
/// battle-ready team member. Returns `None` and ends the battle in defeat
/// when nobody is left.
pub fn auto_substitute(
    encounter: &mut WildEncounter,
    roster: &Roster,
    now: u64,
) -> ActionResult<Option<InstanceId>> {
    let battle = encounter.battle.as_mut().ok_or(ActionError::NoActiveBattle)?;
    if battle.phase != BattlePhase::AwaitingReplacement {
        return Err(ActionError::BattleNotInProgress);
    }

    match roster.first_battle_ready(now) {
        Some(entry) => {
            send_out(battle, entry.id.clone(), &entry.name, entry.battle_stats().hp);
            Ok(Some(entry.id.clone()))
        }
        None => {
            end_battle(battle, BattleOutcome::Defeat);
            Ok(None)
        }
    }
}

/// Resolve one turn: both sides attack once in speed order, and a side at 0
/// HP does not attack. A wild at 0 HP is a victory and pays out battle XP.
/// A player battler at 0 HP faints for `revive_ms`; the battle then waits
/// for a substitute, or ends in defeat when none is available.
pub fn resolve_turn(
    encounter: &mut WildEncounter,
    roster: &mut Roster,
    config: &GameConfig,
    now: u64,
) -> ActionResult<TurnReport> {
    let wild_stats = encounter.combat_stats();
    let wild_level = encounter.wild_level;
    let wild_types: Vec<PokemonType> = encounter.species.types.clone();

    let battle = encounter.battle.as_mut().ok_or(ActionError::NoActiveBattle)?;
    match battle.phase {
        BattlePhase::Ended(_) => return Err(ActionError::BattleEnded),
        BattlePhase::AwaitingReplacement => return Err(ActionError::BattleNotInProgress),
        BattlePhase::InProgress => {}
    }

    let player_id = battle
        .player
        .entry_id
        .clone()
        .ok_or(ActionError::NoEligibleBattler)?;
    let player_entry = roster
        .find(&player_id)
        .ok_or_else(|| ActionError::UnknownEntry(player_id.clone()))?;
    let player_types = player_entry.types.clone();
    let player = Combatant {
        name: &player_entry.name,
        level: player_entry.level,
        types: &player_types,
        stats: player_entry.battle_stats(),
    };
    let wild_name = battle.wild.name.clone();
    let wild = Combatant {
        name: &wild_name,
        level: wild_level,
        types: &wild_types,
        stats: wild_stats,
    };

    let mut bus = EventBus::new();
    battle.turn_number += 1;
    bus.push(BattleEvent::TurnStarted {
        turn_number: battle.turn_number,
    });

    for side in turn_order(player.stats.speed, wild.stats.speed) {
        let (attacker, defender) = match side {
            Side::Player => (&player, &wild),
            Side::Wild => (&wild, &player),
        };
        let (attacker_hp, defender_hp) = match side {
            Side::Player => (battle.player.current_hp, &mut battle.wild.current_hp),
            Side::Wild => (battle.wild.current_hp, &mut battle.player.current_hp),
        };
        if attacker_hp == 0 {
            continue;
        }

        let result = calculate_damage(attacker, defender);
        *defender_hp = defender_hp.saturating_sub(result.damage);
        tracing::debug!(
            "{} hits {} for {} (x{})",
            attacker.name,
            defender.name,
            result.damage,
            result.multiplier
        );
        bus.push(BattleEvent::Attacked {
            attacker: side,
            attacker_name: attacker.name.to_string(),
            damage: result.damage,
            remaining_hp: *defender_hp,
            effectiveness_pct: (result.multiplier * 100.0).round() as u16,
        });

        if *defender_hp == 0 {
            let fainted_side = match side {
                Side::Player => Side::Wild,
                Side::Wild => Side::Player,
            };
            bus.push(BattleEvent::Fainted {
                side: fainted_side,
                name: defender.name.to_string(),
            });
            break;
        }
    }
    bus.push(BattleEvent::TurnEnded);
    let player_name = player.name.to_string();

    let outcome = if battle.wild.current_hp == 0 {
        end_battle_into(&mut bus, battle, BattleOutcome::Victory);
        let total = battle_xp_total(wild_level, &config.battle);
        let award = award_battle_xp(roster, &player_id, total, &config.battle, &config.progression);
        bus.push(BattleEvent::XpAwarded {
            name: player_name,
            amount: award.winner_share,
        });
        for level_up in &award.level_ups {
            if let Some(entry) = roster.find(&level_up.entry_id) {
                bus.push(BattleEvent::LevelUp {
                    name: entry.name.clone(),
                    level: level_up.to_level,
                });
            }
        }
        tracing::info!("Victory against wild {}", wild_name);
        TurnOutcome::Victory(award)
    } else if battle.player.current_hp == 0 {
        let revives_at = match roster.find_mut(&player_id) {
            Some(entry) => entry.faint(now, config.battle.revive_ms),
            None => now + config.battle.revive_ms,
        };
        if roster.first_battle_ready(now).is_some() {
            battle.phase = BattlePhase::AwaitingReplacement;
            bus.push(BattleEvent::ReplacementNeeded);
            TurnOutcome::PlayerFainted {
                fainted: player_id,
                revives_at,
            }
        } else {
            end_battle_into(&mut bus, battle, BattleOutcome::Defeat);
            tracing::info!("Defeated by wild {}", wild_name);
            TurnOutcome::Defeat
        }
    } else {
        TurnOutcome::Continue
    };

    let events = bus.into_events();
    battle.log.extend(events.iter().cloned());
    Ok(TurnReport { outcome, events })
}

fn send_out(battle: &mut Battle, id: InstanceId, name: &str, max_hp: u16) {
    battle.player.entry_id = Some(id);
    battle.player.name = name.to_string();
    battle.player.max_hp = max_hp;
    battle.player.current_hp = max_hp;
    battle.phase = BattlePhase::InProgress;
    battle.log.push(BattleEvent::BattlerSelected {
        name: name.to_string(),
        max_hp,
    });
}

fn end_battle(battle: &mut Battle, outcome: BattleOutcome) {
    battle.phase = BattlePhase::Ended(outcome);
    battle.log.push(BattleEvent::BattleEnded { outcome });
}

fn end_battle_into(bus: &mut EventBus, battle: &mut Battle, outcome: BattleOutcome) {
    battle.phase = BattlePhase::Ended(outcome);
    bus.push(BattleEvent::BattleEnded { outcome });
}
