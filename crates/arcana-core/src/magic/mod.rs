//! Magic system
//!
//! Spell templates and their catalog, per-caster spell instances and mana,
//! the effect resolver, translocator gates and the cast pipeline.

pub mod area;
mod casting;
mod catalog;
pub mod effects;
mod known_magic;
mod spell;
mod spell_type;
mod teleporter;

pub use casting::{
    CastError, CastRequest, CastResult, MSG_FIRST_LEVEL, MSG_LOST_CONCENTRATION, cast_spell,
    cast_spell_with,
};
pub use catalog::{ConsistencyIssue, LoadReport, SpellCatalog};
pub use effects::{EffectContext, EffectResult};
pub use known_magic::{
    InvletSave, KnownMagic, KnownMagicSave, LearnResult, SpellSave, invlet_candidates,
};
pub use spell::Spell;
pub use spell_type::{
    CatalogError, ClassId, EffectKind, EnergyType, ScalingAxis, SpellFlags, SpellId, SpellRecord,
    SpellType, TargetSet, ValidTarget,
};
pub use teleporter::{
    GateSave, MSG_GATE_OBSTRUCTED, MSG_NO_GATE_KNOWN, MSG_NO_VALID_TARGETS, MSG_TELEPORT_CANCELED,
    TeleporterList, TeleporterListSave, TranslocateResult,
};
