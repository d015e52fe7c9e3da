//! World collaborators consumed by spell effects
//!
//! The spell system never owns the map or the creature list. Effects query
//! the world through [`WorldView`] and mutate it through [`SpellWorld`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::combat::DamageInstance;
use crate::magic::EnergyType;
use crate::player::BodyPart;

use super::Tripoint;

/// Opaque creature handle issued by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub u32);

/// How a creature relates to the caster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Attitude {
    /// The caster itself
    Caster,
    Friendly,
    Hostile,
}

/// Broad creature category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum CreatureKind {
    /// The player character
    Avatar,
    Npc,
    Monster,
}

/// Result of a creature lookup at a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatureInfo {
    pub id: CreatureId,
    pub attitude: Attitude,
    pub kind: CreatureKind,
}

/// Ground state of a cell, as far as earth-moving magic cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Ground {
    /// Open air, nothing to move
    Air,
    Hole,
    DeepPit,
    ShallowPit,
    SoftDirt,
    HardRock,
    Sand,
    /// Constructed floor, walls and anything else that ignores the spell
    #[default]
    Constructed,
}

/// Read-only world queries
pub trait WorldView {
    /// Whether creatures and projectiles can pass through the cell
    fn is_passable(&self, p: Tripoint) -> bool;

    fn creature_at(&self, p: Tripoint) -> Option<CreatureInfo>;

    /// Line of sight from `from` to `to`
    fn sees(&self, from: Tripoint, to: Tripoint) -> bool;

    fn ground_at(&self, p: Tripoint) -> Ground;

    /// Passable and not occupied by a creature
    fn is_free(&self, p: Tripoint) -> bool {
        self.is_passable(p) && self.creature_at(p).is_none()
    }
}

/// World mutations performed by spell effects
pub trait SpellWorld: WorldView {
    fn deal_damage(&mut self, target: CreatureId, damage: DamageInstance);

    /// Apply a named status effect; `bp` is `None` for whole-body effects
    fn add_effect(&mut self, target: CreatureId, effect: &str, turns: i32, bp: Option<BodyPart>);

    /// Heal one body part, returning the hit points actually restored
    fn heal(&mut self, target: CreatureId, bp: BodyPart, amount: i32) -> i32;

    /// Restore an energy reserve of a creature other than the caster
    fn restore_energy(&mut self, target: CreatureId, kind: EnergyType, amount: i32);

    fn make_sound(&mut self, p: Tripoint, volume: i32, description: &str);

    /// Smash terrain and furniture at a cell
    fn bash(&mut self, p: Tripoint, strength: i32);

    /// Spawn a creature; `lifespan_turns` of `None` means it never expires
    fn spawn_monster(
        &mut self,
        kind: &str,
        p: Tripoint,
        hostile: bool,
        lifespan_turns: Option<i32>,
    ) -> bool;

    /// Give an item to a creature; `expires_in_turns` of `None` means permanent
    fn grant_item(
        &mut self,
        recipient: CreatureId,
        item: &str,
        charges: i32,
        expires_in_turns: Option<i32>,
    );

    fn set_ground(&mut self, p: Tripoint, ground: Ground);

    /// Move a creature within the current map
    fn teleport_creature(&mut self, id: CreatureId, dest: Tripoint) -> bool;

    /// Free landing cell near a gate in another region, `None` if obstructed
    fn find_gate_landing(&mut self, region: Tripoint) -> Option<Tripoint>;

    /// Move a creature to the landing cell of another region
    fn relocate_to_region(&mut self, id: CreatureId, region: Tripoint, landing: Tripoint) -> bool;
}
