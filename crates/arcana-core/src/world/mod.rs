//! World-facing pieces of the spell system
//!
//! Grid geometry, the world collaborator traits and save helpers.

mod coords;
pub mod save;
mod view;

pub use coords::{Tripoint, calc_ray_end, coord_to_angle, line_to, rl_dist};
pub use save::SaveError;
pub use view::{
    Attitude, CreatureId, CreatureInfo, CreatureKind, Ground, SpellWorld, WorldView,
};
