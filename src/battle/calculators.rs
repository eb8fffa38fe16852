use crate::battle::state::Side;
use crate::pokemon::DerivedStats;
use schema::PokemonType;

/// Everything the damage formula needs to know about one side.
#[derive(Debug, Clone, Copy)]
pub struct Combatant<'a> {
    pub name: &'a str,
    pub level: u8,
    pub types: &'a [PokemonType],
    pub stats: DerivedStats,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackResult {
    pub damage: u16,
    pub multiplier: f64,
}

/// Damage = floor((2 * Atk * Lvl / 100 + 5) / (Def + 5) * TypeMultiplier),
/// never less than 1.
pub fn calculate_damage(attacker: &Combatant, defender: &Combatant) -> AttackResult {
    let multiplier = PokemonType::multiplier(attacker.types, defender.types);

    let offense = 2.0 * attacker.stats.attack as f64 * attacker.level as f64 / 100.0 + 5.0;
    let defense = defender.stats.defense as f64 + 5.0;
    let raw = (offense / defense * multiplier).floor();

    let damage = raw.clamp(1.0, u16::MAX as f64) as u16;
    AttackResult { damage, multiplier }
}

/// Faster side first; a speed tie goes to the player.
pub fn turn_order(player_speed: u16, wild_speed: u16) -> [Side; 2] {
    if player_speed >= wild_speed {
        [Side::Player, Side::Wild]
    } else {
        [Side::Wild, Side::Player]
    }
}
