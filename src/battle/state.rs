use crate::pokemon::InstanceId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Wild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    InProgress,
    /// The active battler fainted and a substitute is available.
    AwaitingReplacement,
    Ended(BattleOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSide {
    pub entry_id: Option<InstanceId>,
    pub name: String,
    pub current_hp: u16,
    pub max_hp: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildSide {
    pub name: String,
    pub current_hp: u16,
    pub max_hp: u16,
}

impl WildSide {
    /// Fraction of the wild's HP already lost, in `[0, 1]`.
    pub fn hp_depleted(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        let lost = self.max_hp.saturating_sub(self.current_hp) as f64;
        (lost / self.max_hp as f64).clamp(0.0, 1.0)
    }
}

/// A fight against the active wild encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battle {
    pub player: PlayerSide,
    pub wild: WildSide,
    pub log: Vec<BattleEvent>,
    pub phase: BattlePhase,
    pub turn_number: u32,
}

impl Battle {
    pub fn new(wild_name: impl Into<String>, wild_max_hp: u16) -> Self {
        Self {
            player: PlayerSide {
                entry_id: None,
                name: String::new(),
                current_hp: 0,
                max_hp: 0,
            },
            wild: WildSide {
                name: wild_name.into(),
                current_hp: wild_max_hp,
                max_hp: wild_max_hp,
            },
            log: Vec::new(),
            phase: BattlePhase::InProgress,
            turn_number: 0,
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, BattlePhase::Ended(_))
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            BattlePhase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Narrative lines of the whole log, skipping silent events.
    pub fn narrative(&self) -> Vec<String> {
        self.log.iter().filter_map(BattleEvent::format).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    BattleStarted {
        wild: String,
        wild_level: u8,
    },
    BattlerSelected {
        name: String,
        max_hp: u16,
    },
    TurnStarted {
        turn_number: u32,
    },
    Attacked {
        attacker: Side,
        attacker_name: String,
        damage: u16,
        remaining_hp: u16,
        /// Type multiplier in hundredths, so events stay `Eq`.
        effectiveness_pct: u16,
    },
    Fainted {
        side: Side,
        name: String,
    },
    ReplacementNeeded,
    XpAwarded {
        name: String,
        amount: u32,
    },
    LevelUp {
        name: String,
        level: u8,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
    TurnEnded,
}

impl BattleEvent {
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::BattleStarted { wild, wild_level } => {
                Some(format!("A wild {} (Lv {}) wants to fight!", wild, wild_level))
            }
            BattleEvent::BattlerSelected { name, max_hp } => {
                Some(format!("Go, {}! ({} HP)", name, max_hp))
            }
            BattleEvent::TurnStarted { turn_number } => {
                Some(format!("=== Turn {} ===", turn_number))
            }
            BattleEvent::Attacked {
                attacker,
                attacker_name,
                damage,
                effectiveness_pct,
                ..
            } => {
                let who = match attacker {
                    Side::Player => format!("Your {}", attacker_name),
                    Side::Wild => format!("The wild {}", attacker_name),
                };
                let mut line = format!("{} dealt {} damage.", who, damage);
                match *effectiveness_pct {
                    0 => line.push_str(" It had no effect..."),
                    1..=99 => line.push_str(" It's not very effective..."),
                    100 => {}
                    _ => line.push_str(" It's super effective!"),
                }
                Some(line)
            }
            BattleEvent::Fainted { side, name } => match side {
                Side::Player => Some(format!("Your {} fainted!", name)),
                Side::Wild => Some(format!("The wild {} fainted!", name)),
            },
            BattleEvent::ReplacementNeeded => Some("Choose another Pokemon to continue.".to_string()),
            BattleEvent::XpAwarded { name, amount } => {
                Some(format!("{} gained {} XP.", name, amount))
            }
            BattleEvent::LevelUp { name, level } => {
                Some(format!("{} grew to level {}!", name, level))
            }
            BattleEvent::BattleEnded { outcome } => match outcome {
                BattleOutcome::Victory => {
                    Some("You won! The weakened wild is easier to catch.".to_string())
                }
                BattleOutcome::Defeat => {
                    Some("You have no Pokemon left able to fight. The battle is over.".to_string())
                }
            },
            BattleEvent::TurnEnded => None, // Silent
        }
    }
}

/// Events produced by a single engine call, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hp_depleted_fraction() {
        let mut battle = Battle::new("rattata", 20);
        assert_eq!(battle.wild.hp_depleted(), 0.0);
        battle.wild.current_hp = 2;
        assert!((battle.wild.hp_depleted() - 0.9).abs() < 1e-9);
        battle.wild.current_hp = 0;
        assert_eq!(battle.wild.hp_depleted(), 1.0);
    }

    #[test]
    fn test_narrative_skips_silent_events() {
        let mut battle = Battle::new("pidgey", 12);
        battle.log = vec![
            BattleEvent::TurnStarted { turn_number: 1 },
            BattleEvent::Attacked {
                attacker: Side::Wild,
                attacker_name: "pidgey".to_string(),
                damage: 4,
                remaining_hp: 8,
                effectiveness_pct: 200,
            },
            BattleEvent::TurnEnded,
        ];

        assert_eq!(
            battle.narrative(),
            vec![
                "=== Turn 1 ===".to_string(),
                "The wild pidgey dealt 4 damage. It's super effective!".to_string(),
            ]
        );
    }
}
