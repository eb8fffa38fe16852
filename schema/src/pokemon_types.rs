use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    /// Calculate type effectiveness multiplier for attacking type vs defending type
    /// Returns: 2.0 = Super Effective, 1.0 = Normal, 0.5 = Not Very Effective, 0.0 = No Effect
    pub fn type_effectiveness(attacking: PokemonType, defending: PokemonType) -> f64 {
        use PokemonType::*;

        match (attacking, defending) {
            // Normal
            (Normal, Ghost) => 0.0,
            (Normal, Rock) | (Normal, Steel) => 0.5,
            (Normal, _) => 1.0,

            // Fire
            (Fire, Fire) | (Fire, Water) | (Fire, Rock) | (Fire, Dragon) => 0.5,
            (Fire, Grass) | (Fire, Ice) | (Fire, Bug) | (Fire, Steel) => 2.0,
            (Fire, _) => 1.0,

            // Water
            (Water, Water) | (Water, Grass) | (Water, Dragon) => 0.5,
            (Water, Fire) | (Water, Ground) | (Water, Rock) => 2.0,
            (Water, _) => 1.0,

            // Electric
            (Electric, Electric) | (Electric, Grass) | (Electric, Dragon) => 0.5,
            (Electric, Ground) => 0.0,
            (Electric, Water) | (Electric, Flying) => 2.0,
            (Electric, _) => 1.0,

            // Grass
            (Grass, Fire)
            | (Grass, Grass)
            | (Grass, Poison)
            | (Grass, Flying)
            | (Grass, Bug)
            | (Grass, Dragon)
            | (Grass, Steel) => 0.5,
            (Grass, Water) | (Grass, Ground) | (Grass, Rock) => 2.0,
            (Grass, _) => 1.0,

            // Ice
            (Ice, Fire) | (Ice, Water) | (Ice, Ice) | (Ice, Steel) => 0.5,
            (Ice, Grass) | (Ice, Ground) | (Ice, Flying) | (Ice, Dragon) => 2.0,
            (Ice, _) => 1.0,

            // Fighting
            (Fighting, Poison)
            | (Fighting, Flying)
            | (Fighting, Psychic)
            | (Fighting, Bug)
            | (Fighting, Fairy) => 0.5,
            (Fighting, Ghost) => 0.0,
            (Fighting, Normal)
            | (Fighting, Ice)
            | (Fighting, Rock)
            | (Fighting, Dark)
            | (Fighting, Steel) => 2.0,
            (Fighting, _) => 1.0,

            // Poison
            (Poison, Poison) | (Poison, Ground) | (Poison, Rock) | (Poison, Ghost) => 0.5,
            (Poison, Steel) => 0.0,
            (Poison, Grass) | (Poison, Fairy) => 2.0,
            (Poison, _) => 1.0,

            // Ground
            (Ground, Grass) | (Ground, Bug) => 0.5,
            (Ground, Flying) => 0.0,
            (Ground, Fire)
            | (Ground, Electric)
            | (Ground, Poison)
            | (Ground, Rock)
            | (Ground, Steel) => 2.0,
            (Ground, _) => 1.0,

            // Flying
            (Flying, Electric) | (Flying, Rock) | (Flying, Steel) => 0.5,
            (Flying, Grass) | (Flying, Fighting) | (Flying, Bug) => 2.0,
            (Flying, _) => 1.0,

            // Psychic
            (Psychic, Psychic) | (Psychic, Steel) => 0.5,
            (Psychic, Dark) => 0.0,
            (Psychic, Fighting) | (Psychic, Poison) => 2.0,
            (Psychic, _) => 1.0,

            // Bug
            (Bug, Fire)
            | (Bug, Fighting)
            | (Bug, Poison)
            | (Bug, Flying)
            | (Bug, Ghost)
            | (Bug, Steel)
            | (Bug, Fairy) => 0.5,
            (Bug, Grass) | (Bug, Psychic) | (Bug, Dark) => 2.0,
            (Bug, _) => 1.0,

            // Rock
            (Rock, Fighting) | (Rock, Ground) | (Rock, Steel) => 0.5,
            (Rock, Fire) | (Rock, Ice) | (Rock, Flying) | (Rock, Bug) => 2.0,
            (Rock, _) => 1.0,

            // Ghost
            (Ghost, Normal) => 0.0,
            (Ghost, Dark) => 0.5,
            (Ghost, Ghost) | (Ghost, Psychic) => 2.0,
            (Ghost, _) => 1.0,

            // Dragon
            (Dragon, Steel) => 0.5,
            (Dragon, Fairy) => 0.0,
            (Dragon, Dragon) => 2.0,
            (Dragon, _) => 1.0,

            // Dark
            (Dark, Fighting) | (Dark, Dark) | (Dark, Fairy) => 0.5,
            (Dark, Psychic) | (Dark, Ghost) => 2.0,
            (Dark, _) => 1.0,

            // Steel
            (Steel, Fire) | (Steel, Water) | (Steel, Electric) | (Steel, Steel) => 0.5,
            (Steel, Ice) | (Steel, Rock) | (Steel, Fairy) => 2.0,
            (Steel, _) => 1.0,

            // Fairy
            (Fairy, Fire) | (Fairy, Poison) | (Fairy, Steel) => 0.5,
            (Fairy, Fighting) | (Fairy, Dragon) | (Fairy, Dark) => 2.0,
            (Fairy, _) => 1.0,
        }
    }

    /// Combined multiplier of every attacking type against every defending type.
    /// Either side being untyped (types not loaded yet) yields a neutral 1.0.
    pub fn multiplier(attacking: &[PokemonType], defending: &[PokemonType]) -> f64 {
        if attacking.is_empty() || defending.is_empty() {
            return 1.0;
        }

        attacking
            .iter()
            .flat_map(|&a| defending.iter().map(move |&d| (a, d)))
            .map(|(a, d)| Self::type_effectiveness(a, d))
            .product()
    }

    pub fn is_immune(attacking: PokemonType, defending: PokemonType) -> bool {
        Self::type_effectiveness(attacking, defending) == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    const SINGLE_VALUES: [f64; 4] = [0.0, 0.5, 1.0, 2.0];
    const PRODUCT_VALUES: [f64; 6] = [0.0, 0.25, 0.5, 1.0, 2.0, 4.0];

    #[rstest]
    #[case(PokemonType::Water, PokemonType::Fire, 2.0)]
    #[case(PokemonType::Fire, PokemonType::Water, 0.5)]
    #[case(PokemonType::Normal, PokemonType::Ghost, 0.0)]
    #[case(PokemonType::Electric, PokemonType::Ground, 0.0)]
    #[case(PokemonType::Ice, PokemonType::Ice, 0.5)]
    #[case(PokemonType::Fighting, PokemonType::Fairy, 0.5)]
    #[case(PokemonType::Dragon, PokemonType::Fairy, 0.0)]
    #[case(PokemonType::Normal, PokemonType::Water, 1.0)]
    fn test_single_type_effectiveness(
        #[case] attacking: PokemonType,
        #[case] defending: PokemonType,
        #[case] expected: f64,
    ) {
        assert_eq!(PokemonType::type_effectiveness(attacking, defending), expected);
    }

    #[test]
    fn test_every_single_pair_uses_chart_values() {
        for a in PokemonType::iter() {
            for d in PokemonType::iter() {
                let m = PokemonType::type_effectiveness(a, d);
                assert!(SINGLE_VALUES.contains(&m), "{a} vs {d} gave {m}");
            }
        }
    }

    #[test]
    fn test_dual_type_products_stay_in_range() {
        let all: Vec<PokemonType> = PokemonType::iter().collect();
        for a in &all {
            for d1 in &all {
                for d2 in &all {
                    let m = PokemonType::multiplier(&[*a], &[*d1, *d2]);
                    assert!(PRODUCT_VALUES.contains(&m), "{a} vs {d1}/{d2} gave {m}");
                }
            }
        }
    }

    #[test]
    fn test_dual_weakness_compounds() {
        // Rock vs Fire/Flying is a double weakness.
        let m = PokemonType::multiplier(
            &[PokemonType::Rock],
            &[PokemonType::Fire, PokemonType::Flying],
        );
        assert_eq!(m, 4.0);

        let m = PokemonType::multiplier(
            &[PokemonType::Fire],
            &[PokemonType::Water, PokemonType::Rock],
        );
        assert_eq!(m, 0.25);
    }

    #[test]
    fn test_untyped_sides_are_neutral() {
        assert_eq!(PokemonType::multiplier(&[], &[PokemonType::Ghost]), 1.0);
        assert_eq!(PokemonType::multiplier(&[PokemonType::Normal], &[]), 1.0);
    }

    #[test]
    fn test_type_names_round_trip_through_strum() {
        assert_eq!(PokemonType::from_str("psychic"), Ok(PokemonType::Psychic));
        assert_eq!(PokemonType::from_str("FAIRY"), Ok(PokemonType::Fairy));
        assert!(PokemonType::from_str("stellar").is_err());
        assert_eq!(PokemonType::Steel.to_string(), "steel");
    }
}
