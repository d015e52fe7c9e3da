//! Damage types carried by spells
//!
//! These define WHAT kind of damage a spell deals, which drives resistances
//! on the receiving side and a few spell side effects (bash damage shakes
//! terrain).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Damage type - what kind of damage is dealt
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum DamageType {
    /// No damage type (support spells)
    #[default]
    None = 0,

    /// Ignores every resistance
    #[strum(to_string = "pure", serialize = "true")]
    Pure = 1,

    /// Internal damage (poison, disease)
    #[strum(to_string = "biological", serialize = "bio")]
    Biological = 2,

    /// Blunt force
    Bash = 3,

    /// Slashing
    Cut = 4,

    /// Corrosion
    Acid = 5,

    /// Piercing
    Stab = 6,

    /// Fire and heat
    #[strum(to_string = "heat", serialize = "fire")]
    Heat = 7,

    /// Cold
    Cold = 8,

    /// Electric shock
    Electric = 9,
}

impl DamageType {
    /// Check if this damage type knocks terrain around
    pub const fn disrupts_terrain(&self) -> bool {
        matches!(self, DamageType::Bash)
    }
}

/// A single packet of spell damage delivered to one creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageInstance {
    pub damage_type: DamageType,
    /// Damage reduced by armor and resistances
    pub amount: i32,
    /// Part of the damage that ignores armor
    pub armor_penetration: i32,
    /// Damage dealt every turn afterwards
    pub damage_over_time: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(DamageType::from_str("fire").unwrap(), DamageType::Heat);
        assert_eq!(DamageType::from_str("HEAT").unwrap(), DamageType::Heat);
        assert_eq!(DamageType::from_str("true").unwrap(), DamageType::Pure);
        assert_eq!(DamageType::from_str("bio").unwrap(), DamageType::Biological);
        assert_eq!(DamageType::from_str("NONE").unwrap(), DamageType::None);
        assert!(DamageType::from_str("plasma").is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for dt in DamageType::iter() {
            let shown = dt.to_string();
            assert_eq!(DamageType::from_str(&shown).unwrap(), dt);
        }
    }

    #[test]
    fn test_only_bash_disrupts_terrain() {
        let disrupting: Vec<_> = DamageType::iter().filter(|d| d.disrupts_terrain()).collect();
        assert_eq!(disrupting, vec![DamageType::Bash]);
    }
}
