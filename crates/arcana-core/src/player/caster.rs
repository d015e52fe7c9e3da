//! The actor side of spellcasting
//!
//! Spells read the caster's attributes and reserves through [`Caster`]; the
//! owning game keeps the actual character data.

use crate::magic::ClassId;
use crate::world::{CreatureId, Tripoint};

use super::BodyPart;

/// Attribute and reserve accessors for a spellcaster.
///
/// Only the accessors are required; the class and mana hooks default to a
/// plain caster with no trait-based modifiers.
pub trait Caster {
    fn id(&self) -> CreatureId;
    fn pos(&self) -> Tripoint;

    fn intelligence(&self) -> i32;
    /// Spellcraft skill level
    fn spellcraft(&self) -> i32;
    fn encumbrance(&self, bp: BodyPart) -> i32;
    /// Current focus, 100 is neutral
    fn focus(&self) -> i32;

    fn stamina(&self) -> i32;
    /// Bionic power, in the same units as mana
    fn power_level(&self) -> i32;
    fn fatigue(&self) -> i32;
    fn hp(&self, bp: BodyPart) -> i32;

    fn mod_stamina(&mut self, delta: i32);
    fn mod_power_level(&mut self, delta: i32);
    fn mod_fatigue(&mut self, delta: i32);
    fn mod_hp(&mut self, bp: BodyPart, delta: i32);
    fn set_hp(&mut self, bp: BodyPart, value: i32);

    /// Whether the caster has the trait that grants a spell class
    fn has_class(&self, class: &ClassId) -> bool;

    /// Whether the caster has a trait that excludes a spell class
    fn has_conflicting_class(&self, _class: &ClassId) -> bool {
        false
    }

    /// Class-restricted spells of this class cost nothing to cast
    fn class_grants_proficiency(&self, _class: &ClassId) -> bool {
        false
    }

    fn mana_multiplier(&self) -> f32 {
        1.0
    }

    fn mana_modifier(&self) -> i32 {
        0
    }

    fn mana_regen_multiplier(&self) -> f32 {
        1.0
    }

    /// A distraction (noise, hostile in view) is waiting to interrupt the caster
    fn interrupt_pending(&self) -> bool {
        false
    }

    /// Combined encumbrance of both arms
    fn arms_encumbrance(&self) -> i32 {
        self.encumbrance(BodyPart::ArmL) + self.encumbrance(BodyPart::ArmR)
    }

    /// Combined encumbrance of both hands
    fn hands_encumbrance(&self) -> i32 {
        self.encumbrance(BodyPart::HandL) + self.encumbrance(BodyPart::HandR)
    }

    /// Combined encumbrance of both legs
    fn legs_encumbrance(&self) -> i32 {
        self.encumbrance(BodyPart::LegL) + self.encumbrance(BodyPart::LegR)
    }

    /// Hit points over every part that carries them
    fn hp_total(&self) -> i32 {
        BodyPart::HIT_POINT_PARTS.iter().map(|bp| self.hp(*bp)).sum()
    }
}
