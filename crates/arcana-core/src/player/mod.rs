//! Spellcaster-facing player model
//!
//! Body parts and the [`Caster`] accessor trait.

mod body;
mod caster;

pub use body::{BodyPart, BodyPartSet};
pub use caster::Caster;
