//! Combat primitives shared by spell effects
//!
//! Spells never resolve hits themselves; they hand a [`DamageInstance`] to the
//! world, which applies armor and resistances.

mod damage_type;

pub use damage_type::{DamageInstance, DamageType};
