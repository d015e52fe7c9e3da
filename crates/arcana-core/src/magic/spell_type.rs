//! Spell templates
//!
//! A [`SpellType`] is the immutable, data-authored definition of a spell:
//! its scaling axes, cost model, targeting bitsets and behavior flags.
//! Templates are parsed from [`SpellRecord`]s (one JSON object each) and
//! owned by the [`SpellCatalog`](super::SpellCatalog).

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

use crate::combat::DamageType;
use crate::player::{BodyPart, BodyPartSet};

// ============================================================================
// Identifiers
// ============================================================================

/// Unique spell identifier
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SpellId(pub String);

impl SpellId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SpellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpellId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of the trait (mutation) that grants a spell class
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClassId(pub String);

impl ClassId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Resource a spell draws from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum EnergyType {
    #[strum(to_string = "HP", serialize = "health")]
    Hp,
    #[default]
    #[strum(to_string = "MANA")]
    Mana,
    #[strum(to_string = "STAMINA")]
    Stamina,
    #[strum(to_string = "BIONIC")]
    Bionic,
    #[strum(to_string = "FATIGUE")]
    Fatigue,
    #[strum(to_string = "NONE")]
    None,
}

impl EnergyType {
    /// Player-facing name of the resource
    pub const fn name(&self) -> &'static str {
        match self {
            EnergyType::Hp => "health",
            EnergyType::Mana => "mana",
            EnergyType::Stamina => "stamina",
            EnergyType::Bionic => "bionic power",
            EnergyType::Fatigue => "fatigue",
            EnergyType::None => "",
        }
    }
}

/// Kinds of target a spell may affect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ValidTarget {
    Ally,
    Hostile,
    #[strum(to_string = "self")]
    SelfTarget,
    Ground,
    None,
}

impl ValidTarget {
    pub const fn flag(self) -> TargetSet {
        match self {
            ValidTarget::Ally => TargetSet::ALLY,
            ValidTarget::Hostile => TargetSet::HOSTILE,
            ValidTarget::SelfTarget => TargetSet::SELF,
            ValidTarget::Ground => TargetSet::GROUND,
            ValidTarget::None => TargetSet::NONE,
        }
    }
}

bitflags! {
    /// Set of [`ValidTarget`]s
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TargetSet: u8 {
        const ALLY = 0x01;
        const HOSTILE = 0x02;
        const SELF = 0x04;
        const GROUND = 0x08;
        const NONE = 0x10;
    }
}

impl TargetSet {
    /// Member targets in declaration order
    pub fn targets(&self) -> Vec<ValidTarget> {
        ValidTarget::iter().filter(|t| self.contains(t.flag())).collect()
    }
}

bitflags! {
    /// Behavior flags of a spell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpellFlags: u16 {
        /// Spawned items and creatures never expire
        const PERMANENT = 1 << 0;
        /// Area of effect passes through walls
        const IGNORE_WALLS = 1 << 1;
        /// Summons are always hostile
        const HOSTILE_SUMMON = 1 << 2;
        /// Summons are hostile half of the time
        const HOSTILE_50 = 1 << 3;
        /// No noise at the target
        const SILENT = 1 << 4;
        /// Extra noise at the target
        const LOUD = 1 << 5;
        /// Noise at the caster, mouth encumbrance raises failure
        const VERBAL = 1 << 6;
        /// Arm encumbrance raises failure and casting time
        const SOMATIC = 1 << 7;
        /// Hand encumbrance does not raise energy cost
        const NO_HANDS = 1 << 8;
        /// Leg encumbrance does not raise casting time
        const NO_LEGS = 1 << 9;
        /// Focus scales failure
        const CONCENTRATE = 1 << 10;
    }
}

/// What a spell does when it resolves
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EffectKind {
    #[default]
    #[strum(to_string = "none")]
    NoEffect,
    TargetAttack,
    ProjectileAttack,
    ConeAttack,
    LineAttack,
    TeleportRandom,
    PainSplit,
    MoveEarth,
    SpawnItem,
    Summon,
    RecoverEnergy,
    Heal,
    Translocate,
}

// ============================================================================
// Scaling
// ============================================================================

/// A value that scales with spell level: `start + increment * level`,
/// bounded by `bound` in the direction of the increment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScalingAxis {
    pub start: i32,
    pub increment: f32,
    pub bound: i32,
}

impl ScalingAxis {
    pub const fn new(start: i32, increment: f32, bound: i32) -> Self {
        Self { start, increment, bound }
    }

    /// A value that does not scale
    pub const fn flat(value: i32) -> Self {
        Self::new(value, 0.0, value)
    }

    /// Realized value at `level`.
    ///
    /// Never panics on a misconfigured axis; a bound on the wrong side of
    /// `start` pins the result to `start`.
    pub fn at(&self, level: i32) -> i32 {
        let raw = self.start + (self.increment * level as f32).round() as i32;
        if self.increment >= 0.0 {
            raw.min(self.bound).max(self.start)
        } else {
            raw.max(self.bound).min(self.start)
        }
    }

    /// Whether `bound` lies on the side the increment moves towards
    pub fn is_consistent(&self) -> bool {
        if self.increment > 0.0 {
            self.bound >= self.start
        } else if self.increment < 0.0 {
            self.bound <= self.start
        } else {
            true
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure to turn a configuration record into a template
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed spell record from {src}: {source}")]
    Parse {
        src: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("spell record from {src} has no id")]
    MissingId { src: String },

    #[error("spell {id}: unknown {field} '{value}'")]
    UnknownValue {
        id: SpellId,
        field: &'static str,
        value: String,
    },

    #[error("spell {id} is invalid: {reason}")]
    Invalid { id: SpellId, reason: &'static str },

    #[error("cannot read spell file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Records
// ============================================================================

/// One spell as written in the data files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub effect: String,
    pub effect_str: String,
    pub valid_targets: Vec<String>,
    pub affected_body_parts: Vec<String>,
    pub flags: Vec<String>,

    pub min_damage: i32,
    pub damage_increment: f32,
    pub max_damage: i32,
    pub min_range: i32,
    pub range_increment: f32,
    pub max_range: i32,
    pub min_aoe: i32,
    pub aoe_increment: f32,
    pub max_aoe: i32,
    pub min_dot: i32,
    pub dot_increment: f32,
    pub max_dot: i32,
    pub min_duration: i32,
    pub duration_increment: f32,
    pub max_duration: i32,
    pub min_pierce: i32,
    pub pierce_increment: f32,
    pub max_pierce: i32,

    pub base_energy_cost: i32,
    pub energy_increment: f32,
    pub final_energy_cost: Option<i32>,
    pub base_casting_time: i32,
    pub casting_time_increment: f32,
    pub final_casting_time: Option<i32>,

    pub spell_class: String,
    pub energy_source: Option<String>,
    pub damage_type: Option<String>,
    pub difficulty: i32,
    pub max_level: i32,
}

// ============================================================================
// Templates
// ============================================================================

/// Immutable spell definition
#[derive(Debug, Clone, PartialEq)]
pub struct SpellType {
    pub id: SpellId,
    pub name: String,
    pub description: String,
    pub effect: EffectKind,
    /// Free-form effect parameter (status effect, monster or item id, energy kind)
    pub effect_str: String,
    pub valid_targets: TargetSet,
    pub affected_body_parts: BodyPartSet,
    pub flags: SpellFlags,

    pub damage: ScalingAxis,
    pub range: ScalingAxis,
    pub aoe: ScalingAxis,
    pub dot: ScalingAxis,
    /// In moves
    pub duration: ScalingAxis,
    pub pierce: ScalingAxis,
    pub energy_cost: ScalingAxis,
    /// In moves
    pub casting_time: ScalingAxis,

    /// Trait required to learn the spell; `None` means anyone can
    pub spell_class: Option<ClassId>,
    pub energy_source: EnergyType,
    pub damage_type: DamageType,
    pub difficulty: i32,
    pub max_level: i32,

    /// Where the definition was loaded from
    pub src: String,
}

fn parse_enum<T: FromStr>(id: &SpellId, field: &'static str, value: &str) -> Result<T, CatalogError> {
    T::from_str(value.trim()).map_err(|_| CatalogError::UnknownValue {
        id: id.clone(),
        field,
        value: value.to_string(),
    })
}

impl SpellType {
    /// Build a template from a parsed record
    pub fn from_record(record: SpellRecord, src: &str) -> Result<Self, CatalogError> {
        if record.id.trim().is_empty() {
            return Err(CatalogError::MissingId { src: src.to_string() });
        }
        let id = SpellId::new(record.id.trim());

        let effect = if record.effect.is_empty() {
            EffectKind::NoEffect
        } else {
            parse_enum(&id, "effect", &record.effect)?
        };

        let mut valid_targets = TargetSet::empty();
        for t in &record.valid_targets {
            let target: ValidTarget = parse_enum(&id, "valid target", t)?;
            valid_targets |= target.flag();
        }

        let mut affected_body_parts = BodyPartSet::empty();
        for bp in &record.affected_body_parts {
            let part: BodyPart = parse_enum(&id, "body part", bp)?;
            affected_body_parts |= part.flag();
        }

        let mut flags = SpellFlags::empty();
        for f in &record.flags {
            let flag = SpellFlags::from_name(&f.trim().to_ascii_uppercase()).ok_or_else(|| {
                CatalogError::UnknownValue {
                    id: id.clone(),
                    field: "flag",
                    value: f.clone(),
                }
            })?;
            flags |= flag;
        }

        let energy_source = match &record.energy_source {
            Some(s) => parse_enum(&id, "energy source", s)?,
            None => EnergyType::None,
        };
        let damage_type = match &record.damage_type {
            Some(s) => parse_enum(&id, "damage type", s)?,
            None => DamageType::None,
        };
        let spell_class = Some(record.spell_class.trim())
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("NONE"))
            .map(ClassId::new);

        let spell = SpellType {
            id,
            name: record.name,
            description: record.description,
            effect,
            effect_str: record.effect_str,
            valid_targets,
            affected_body_parts,
            flags,
            damage: ScalingAxis::new(record.min_damage, record.damage_increment, record.max_damage),
            range: ScalingAxis::new(record.min_range, record.range_increment, record.max_range),
            aoe: ScalingAxis::new(record.min_aoe, record.aoe_increment, record.max_aoe),
            dot: ScalingAxis::new(record.min_dot, record.dot_increment, record.max_dot),
            duration: ScalingAxis::new(
                record.min_duration,
                record.duration_increment,
                record.max_duration,
            ),
            pierce: ScalingAxis::new(record.min_pierce, record.pierce_increment, record.max_pierce),
            energy_cost: ScalingAxis::new(
                record.base_energy_cost,
                record.energy_increment,
                record.final_energy_cost.unwrap_or(record.base_energy_cost),
            ),
            casting_time: ScalingAxis::new(
                record.base_casting_time,
                record.casting_time_increment,
                record.final_casting_time.unwrap_or(record.base_casting_time),
            ),
            spell_class,
            energy_source,
            damage_type,
            difficulty: record.difficulty,
            max_level: record.max_level,
            src: src.to_string(),
        };
        spell.validate()?;
        Ok(spell)
    }

    /// Check the internal consistency of the targeting bitsets
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason| CatalogError::Invalid { id: self.id.clone(), reason };
        if self.id.is_empty() {
            return Err(invalid("empty id"));
        }
        if self.valid_targets.is_empty() {
            return Err(invalid("no valid targets"));
        }
        if self.valid_targets.contains(TargetSet::NONE) && self.valid_targets != TargetSet::NONE {
            return Err(invalid("target 'none' combined with other targets"));
        }
        if !self.affected_body_parts.is_empty()
            && !self.valid_targets.intersects(TargetSet::SELF | TargetSet::ALLY)
        {
            return Err(invalid("body parts given for a spell that cannot target self or allies"));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn has_flag(&self, flag: SpellFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_valid_target(&self, target: ValidTarget) -> bool {
        self.valid_targets.contains(target.flag())
    }
}
