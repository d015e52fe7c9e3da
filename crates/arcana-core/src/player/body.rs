//! Body parts
//!
//! Spells that target self or allies touch a fixed subset of body parts, and
//! per-part encumbrance drives the somatic/verbal casting penalties.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// A body part, named by its data identifier (`TORSO`, `ARM_L`, ...)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[repr(u8)]
pub enum BodyPart {
    Torso = 0,
    Head = 1,
    Eyes = 2,
    Mouth = 3,
    ArmL = 4,
    ArmR = 5,
    HandL = 6,
    HandR = 7,
    LegL = 8,
    LegR = 9,
    FootL = 10,
    FootR = 11,
}

impl BodyPart {
    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            BodyPart::Torso => "torso",
            BodyPart::Head => "head",
            BodyPart::Eyes => "eyes",
            BodyPart::Mouth => "mouth",
            BodyPart::ArmL => "left arm",
            BodyPart::ArmR => "right arm",
            BodyPart::HandL => "left hand",
            BodyPart::HandR => "right hand",
            BodyPart::LegL => "left leg",
            BodyPart::LegR => "right leg",
            BodyPart::FootL => "left foot",
            BodyPart::FootR => "right foot",
        }
    }

    /// Body parts that carry their own hit points
    pub const HIT_POINT_PARTS: [BodyPart; 6] = [
        BodyPart::Head,
        BodyPart::Torso,
        BodyPart::ArmL,
        BodyPart::ArmR,
        BodyPart::LegL,
        BodyPart::LegR,
    ];

    pub const fn flag(self) -> BodyPartSet {
        BodyPartSet::from_bits_retain(1 << self as u16)
    }
}

bitflags! {
    /// Set of body parts, one bit per [`BodyPart`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BodyPartSet: u16 {
        const TORSO = 1 << 0;
        const HEAD = 1 << 1;
        const EYES = 1 << 2;
        const MOUTH = 1 << 3;
        const ARM_L = 1 << 4;
        const ARM_R = 1 << 5;
        const HAND_L = 1 << 6;
        const HAND_R = 1 << 7;
        const LEG_L = 1 << 8;
        const LEG_R = 1 << 9;
        const FOOT_L = 1 << 10;
        const FOOT_R = 1 << 11;
    }
}

impl BodyPartSet {
    pub fn contains_part(&self, bp: BodyPart) -> bool {
        self.contains(bp.flag())
    }

    /// Member parts in declaration order
    pub fn parts(&self) -> Vec<BodyPart> {
        BodyPart::iter().filter(|bp| self.contains_part(*bp)).collect()
    }
}

impl FromIterator<BodyPart> for BodyPartSet {
    fn from_iter<I: IntoIterator<Item = BodyPart>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BodyPartSet::empty(), |set, bp| set | bp.flag())
    }
}
