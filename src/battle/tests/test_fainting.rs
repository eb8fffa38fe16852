use crate::battle::engine::{auto_substitute, resolve_turn, select_battler, start_battle, TurnOutcome};
use crate::battle::state::{BattleEvent, BattleOutcome, BattlePhase, Side};
use crate::battle::tests::common::{
    assert_ok, pikachu, roster_of, squirtle, test_encounter, TestEntryBuilder,
};
use crate::config::GameConfig;
use crate::encounter::WildEncounter;
use crate::errors::ActionError;
use crate::pokemon::InstanceId;
use crate::roster::Roster;
use pretty_assertions::assert_eq;

const NOW: u64 = 1_000;

/// Two level 1 pikachu against a level 10 squirtle, which outspeeds them.
fn weakened_battle() -> (WildEncounter, Roster) {
    let roster = roster_of(vec![pikachu("p1", 1), pikachu("p2", 1)]);
    let mut encounter = test_encounter(squirtle(), 10);
    assert_ok(start_battle(&mut encounter, &roster, NOW));
    if let Some(battle) = encounter.battle.as_mut() {
        battle.player.current_hp = 1;
    }
    (encounter, roster)
}

#[test]
fn test_faint_waits_for_replacement() {
    let (mut encounter, mut roster) = weakened_battle();
    let config = GameConfig::default();

    let report = assert_ok(resolve_turn(&mut encounter, &mut roster, &config, NOW));

    assert_eq!(
        report.outcome,
        TurnOutcome::PlayerFainted {
            fainted: InstanceId::from("p1"),
            revives_at: NOW + 10_000
        }
    );
    assert_eq!(
        report.events,
        vec![
            BattleEvent::TurnStarted { turn_number: 1 },
            BattleEvent::Attacked {
                attacker: Side::Wild,
                attacker_name: "squirtle".to_string(),
                damage: 1,
                remaining_hp: 0,
                effectiveness_pct: 100
            },
            BattleEvent::Fainted {
                side: Side::Player,
                name: "pikachu".to_string()
            },
            BattleEvent::TurnEnded,
            BattleEvent::ReplacementNeeded,
        ]
    );
    let battle = encounter.battle.as_ref().unwrap();
    assert_eq!(battle.phase, BattlePhase::AwaitingReplacement);
    // The wild keeps its HP.
    assert_eq!(battle.wild.current_hp, battle.wild.max_hp);

    let fainted = roster.find(&InstanceId::from("p1")).unwrap();
    assert_eq!(fainted.fainted_until, Some(NOW + 10_000));
    assert!(!fainted.can_battle(NOW + 9_999));
    assert!(fainted.can_battle(NOW + 10_000));

    assert_eq!(
        resolve_turn(&mut encounter, &mut roster, &config, NOW).err(),
        Some(ActionError::BattleNotInProgress)
    );
}

#[test]
fn test_fainted_member_cannot_be_selected() {
    let (mut encounter, mut roster) = weakened_battle();
    assert_ok(resolve_turn(
        &mut encounter,
        &mut roster,
        &GameConfig::default(),
        NOW,
    ));

    assert_eq!(
        select_battler(&mut encounter, &roster, &InstanceId::from("p1"), NOW + 1),
        Err(ActionError::BattlerFainted {
            id: InstanceId::from("p1"),
            until: NOW + 10_000
        })
    );

    assert_ok(select_battler(
        &mut encounter,
        &roster,
        &InstanceId::from("p2"),
        NOW + 1,
    ));
    let battle = encounter.battle.as_ref().unwrap();
    assert_eq!(battle.phase, BattlePhase::InProgress);
    assert_eq!(battle.player.entry_id, Some(InstanceId::from("p2")));
    assert_eq!(battle.player.current_hp, 11);
}

#[test]
fn test_select_battler_validation() {
    let benched = TestEntryBuilder::new("bench", 25, "pikachu", 5)
        .in_team(false)
        .build();
    let roster = roster_of(vec![pikachu("p1", 5), benched]);
    let mut encounter = test_encounter(squirtle(), 10);

    assert_eq!(
        select_battler(&mut encounter, &roster, &InstanceId::from("p1"), NOW),
        Err(ActionError::NoActiveBattle)
    );

    assert_ok(start_battle(&mut encounter, &roster, NOW));
    assert_eq!(
        select_battler(&mut encounter, &roster, &InstanceId::from("bench"), NOW),
        Err(ActionError::NotInTeam(InstanceId::from("bench")))
    );
    assert_eq!(
        select_battler(&mut encounter, &roster, &InstanceId::from("ghost"), NOW),
        Err(ActionError::UnknownEntry(InstanceId::from("ghost")))
    );
}

#[test]
fn test_start_battle_skips_fainted_members() {
    let fainted = TestEntryBuilder::new("p1", 25, "pikachu", 30)
        .fainted_until(NOW + 5_000)
        .build();
    let roster = roster_of(vec![fainted, pikachu("p2", 3)]);
    let mut encounter = test_encounter(squirtle(), 10);

    let battle = assert_ok(start_battle(&mut encounter, &roster, NOW));
    assert_eq!(battle.player.entry_id, Some(InstanceId::from("p2")));
}

#[test]
fn test_last_member_fainting_is_defeat() {
    let mut roster = roster_of(vec![pikachu("p1", 1)]);
    let mut encounter = test_encounter(squirtle(), 10);
    assert_ok(start_battle(&mut encounter, &roster, NOW));
    if let Some(battle) = encounter.battle.as_mut() {
        battle.player.current_hp = 1;
    }

    let report = assert_ok(resolve_turn(
        &mut encounter,
        &mut roster,
        &GameConfig::default(),
        NOW,
    ));

    assert_eq!(report.outcome, TurnOutcome::Defeat);
    assert_eq!(
        report.events.last(),
        Some(&BattleEvent::BattleEnded {
            outcome: BattleOutcome::Defeat
        })
    );
    assert!(!report.events.contains(&BattleEvent::ReplacementNeeded));
    let battle = encounter.battle.as_ref().unwrap();
    assert_eq!(battle.outcome(), Some(BattleOutcome::Defeat));
    assert_eq!(
        roster.find(&InstanceId::from("p1")).and_then(|e| e.fainted_until),
        Some(NOW + 10_000)
    );
}

#[test]
fn test_auto_substitute_sends_out_next_ready_member() {
    let (mut encounter, mut roster) = weakened_battle();

    assert_eq!(
        auto_substitute(&mut encounter, &roster, NOW),
        Err(ActionError::BattleNotInProgress)
    );

    assert_ok(resolve_turn(
        &mut encounter,
        &mut roster,
        &GameConfig::default(),
        NOW,
    ));
    let substitute = assert_ok(auto_substitute(&mut encounter, &roster, NOW + 600));

    assert_eq!(substitute, Some(InstanceId::from("p2")));
    let battle = encounter.battle.as_ref().unwrap();
    assert_eq!(battle.phase, BattlePhase::InProgress);
    assert_eq!(
        battle.log.last(),
        Some(&BattleEvent::BattlerSelected {
            name: "pikachu".to_string(),
            max_hp: 11
        })
    );
}

#[test]
fn test_auto_substitute_without_anyone_left_ends_battle() {
    let (mut encounter, mut roster) = weakened_battle();
    assert_ok(resolve_turn(
        &mut encounter,
        &mut roster,
        &GameConfig::default(),
        NOW,
    ));
    // The remaining member faints elsewhere before the substitution is due.
    if let Some(entry) = roster.find_mut(&InstanceId::from("p2")) {
        entry.faint(NOW, 10_000);
    }

    let substitute = assert_ok(auto_substitute(&mut encounter, &roster, NOW + 600));

    assert_eq!(substitute, None);
    let battle = encounter.battle.as_ref().unwrap();
    assert_eq!(battle.phase, BattlePhase::Ended(BattleOutcome::Defeat));
    assert_eq!(
        battle.log.last(),
        Some(&BattleEvent::BattleEnded {
            outcome: BattleOutcome::Defeat
        })
    );
}
