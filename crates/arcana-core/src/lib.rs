//! arcana-core: spellcasting rules for a turn-based survival game
//!
//! Data-authored spell templates, per-caster proficiency and mana, area
//! geometry and world effects, translocator gates and the cast pipeline.
//!
//! The crate owns no map, creature or UI state. The game plugs those in
//! through the [`player::Caster`], [`world::SpellWorld`] and [`ui::Selector`]
//! traits.

pub mod combat;
pub mod magic;
pub mod player;
pub mod ui;
pub mod world;

mod consts;
mod rng;

pub use consts::*;
pub use rng::GameRng;
