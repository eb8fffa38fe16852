use crate::battle::engine::{resolve_turn, start_battle, TurnOutcome};
use crate::battle::state::{BattleEvent, BattleOutcome, BattlePhase, Side};
use crate::battle::tests::common::{
    assert_ok, bulbasaur, pikachu, roster_of, squirtle, test_encounter, TestEntryBuilder,
};
use crate::config::GameConfig;
use crate::errors::ActionError;
use crate::pokemon::InstanceId;
use crate::progression::LevelUp;
use pretty_assertions::assert_eq;
use schema::{BaseStats, PokemonType};

#[test]
fn test_start_battle_sends_out_first_ready_member() {
    let benched = TestEntryBuilder::new("bench", 25, "pikachu", 40)
        .in_team(false)
        .build();
    let roster = roster_of(vec![benched, pikachu("p1", 25)]);
    let mut encounter = test_encounter(squirtle(), 10);

    let battle = assert_ok(start_battle(&mut encounter, &roster, 0));

    assert_eq!(battle.player.entry_id, Some(InstanceId::from("p1")));
    assert_eq!(battle.player.max_hp, 52);
    assert_eq!(battle.player.current_hp, 52);
    assert_eq!(battle.wild.max_hp, 28);
    assert_eq!(battle.phase, BattlePhase::InProgress);
    assert_eq!(
        battle.log,
        vec![
            BattleEvent::BattleStarted {
                wild: "squirtle".to_string(),
                wild_level: 10
            },
            BattleEvent::BattlerSelected {
                name: "pikachu".to_string(),
                max_hp: 52
            },
        ]
    );
}

#[test]
fn test_start_battle_is_idempotent_while_running() {
    let roster = roster_of(vec![pikachu("p1", 25)]);
    let mut encounter = test_encounter(squirtle(), 10);

    assert_ok(start_battle(&mut encounter, &roster, 0));
    if let Some(battle) = encounter.battle.as_mut() {
        battle.wild.current_hp = 5;
    }
    let again = assert_ok(start_battle(&mut encounter, &roster, 10));
    assert_eq!(again.wild.current_hp, 5);
    assert_eq!(again.log.len(), 2);
}

#[test]
fn test_start_battle_without_eligible_member() {
    let fainted = TestEntryBuilder::new("p1", 25, "pikachu", 25)
        .fainted_until(5_000)
        .build();
    let roster = roster_of(vec![fainted]);
    let mut encounter = test_encounter(squirtle(), 10);

    assert_eq!(
        start_battle(&mut encounter, &roster, 1_000).err(),
        Some(ActionError::NoEligibleBattler)
    );
    assert!(encounter.battle.is_none());
}

#[test]
fn test_turn_order_and_damage_events() {
    let mut roster = roster_of(vec![pikachu("p1", 25)]);
    let mut encounter = test_encounter(squirtle(), 10);
    let config = GameConfig::default();
    assert_ok(start_battle(&mut encounter, &roster, 0));

    let report = assert_ok(resolve_turn(&mut encounter, &mut roster, &config, 0));

    assert_eq!(report.outcome, TurnOutcome::Continue);
    assert_eq!(
        report.events,
        vec![
            BattleEvent::TurnStarted { turn_number: 1 },
            BattleEvent::Attacked {
                attacker: Side::Player,
                attacker_name: "pikachu".to_string(),
                damage: 1,
                remaining_hp: 27,
                effectiveness_pct: 200
            },
            BattleEvent::Attacked {
                attacker: Side::Wild,
                attacker_name: "squirtle".to_string(),
                damage: 1,
                remaining_hp: 51,
                effectiveness_pct: 100
            },
            BattleEvent::TurnEnded,
        ]
    );
    // The turn's events are appended to the battle log.
    assert_eq!(encounter.battle.map(|b| b.log.len()), Some(6));
}

#[test]
fn test_faster_wild_attacks_first() {
    let mut roster = roster_of(vec![pikachu("p1", 1)]);
    let mut encounter = test_encounter(squirtle(), 10);
    assert_ok(start_battle(&mut encounter, &roster, 0));

    let report = assert_ok(resolve_turn(
        &mut encounter,
        &mut roster,
        &GameConfig::default(),
        0,
    ));

    let attackers: Vec<Side> = report
        .events
        .iter()
        .filter_map(|e| match e {
            BattleEvent::Attacked { attacker, .. } => Some(*attacker),
            _ => None,
        })
        .collect();
    assert_eq!(attackers, vec![Side::Wild, Side::Player]);
}

#[test]
fn test_dual_type_weakness_compounds() {
    let attacker = TestEntryBuilder::new("p1", 87, "dewgong", 30)
        .with_types(vec![PokemonType::Water, PokemonType::Ice])
        .with_base_stats(BaseStats::new(90, 70, 80, 70, 95, 70))
        .build();
    let mut roster = roster_of(vec![attacker]);
    let mut wild = bulbasaur();
    wild.types = vec![PokemonType::Grass, PokemonType::Flying];
    let mut encounter = test_encounter(wild, 3);
    assert_ok(start_battle(&mut encounter, &roster, 0));

    let report = assert_ok(resolve_turn(
        &mut encounter,
        &mut roster,
        &GameConfig::default(),
        0,
    ));

    // water x grass (0.5) * water x flying (1) * ice x grass (2) * ice x flying (2)
    assert!(report.events.contains(&BattleEvent::Attacked {
        attacker: Side::Player,
        attacker_name: "dewgong".to_string(),
        damage: 5,
        remaining_hp: 10,
        effectiveness_pct: 200
    }));
}

#[test]
fn test_victory_pays_out_battle_xp() {
    let teammate = TestEntryBuilder::new("p2", 10, "caterpie", 1)
        .with_types(vec![PokemonType::Bug])
        .with_xp(20)
        .build();
    let mut roster = roster_of(vec![pikachu("p1", 25), teammate]);
    let mut encounter = test_encounter(squirtle(), 10);
    let config = GameConfig::default();
    assert_ok(start_battle(&mut encounter, &roster, 0));
    if let Some(battle) = encounter.battle.as_mut() {
        battle.wild.current_hp = 1;
    }

    let report = assert_ok(resolve_turn(&mut encounter, &mut roster, &config, 0));

    let award = match report.outcome {
        TurnOutcome::Victory(award) => award,
        other => panic!("Expected victory, got {:?}", other),
    };
    assert_eq!(award.total, 150);
    assert_eq!(award.winner_share, 105);
    assert_eq!(award.member_share, 45);
    assert_eq!(
        award.level_ups,
        vec![LevelUp {
            entry_id: InstanceId::from("p2"),
            from_level: 1,
            to_level: 2
        }]
    );

    assert_eq!(
        report.events[2..].to_vec(),
        vec![
            BattleEvent::Fainted {
                side: Side::Wild,
                name: "squirtle".to_string()
            },
            BattleEvent::TurnEnded,
            BattleEvent::BattleEnded {
                outcome: BattleOutcome::Victory
            },
            BattleEvent::XpAwarded {
                name: "pikachu".to_string(),
                amount: 105
            },
            BattleEvent::LevelUp {
                name: "caterpie".to_string(),
                level: 2
            },
        ]
    );

    let winner = roster.find(&InstanceId::from("p1")).unwrap();
    assert_eq!(winner.xp, 105);
    let teammate = roster.find(&InstanceId::from("p2")).unwrap();
    assert_eq!((teammate.level, teammate.xp), (2, 5));

    assert_eq!(
        resolve_turn(&mut encounter, &mut roster, &config, 0).err(),
        Some(ActionError::BattleEnded)
    );
}

#[test]
fn test_resolve_turn_without_battle() {
    let mut roster = roster_of(vec![pikachu("p1", 25)]);
    let mut encounter = test_encounter(squirtle(), 10);

    assert_eq!(
        resolve_turn(&mut encounter, &mut roster, &GameConfig::default(), 0).err(),
        Some(ActionError::NoActiveBattle)
    );
}

#[test]
fn test_narrative_skips_silent_events() {
    let mut roster = roster_of(vec![pikachu("p1", 25)]);
    let mut encounter = test_encounter(squirtle(), 10);
    assert_ok(start_battle(&mut encounter, &roster, 0));
    assert_ok(resolve_turn(
        &mut encounter,
        &mut roster,
        &GameConfig::default(),
        0,
    ));

    let narrative = encounter.battle.map(|b| b.narrative()).unwrap_or_default();
    assert_eq!(
        narrative,
        vec![
            "A wild squirtle (Lv 10) wants to fight!",
            "Go, pikachu! (52 HP)",
            "=== Turn 1 ===",
            "Your pikachu dealt 1 damage. It's super effective!",
            "The wild squirtle dealt 1 damage.",
        ]
    );
}
