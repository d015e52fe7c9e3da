//! Spell instances
//!
//! A [`Spell`] is one caster's copy of a template: the template plus the
//! experience earned with it. Every derived number (damage, range, cost,
//! failure chance, ...) is a pure function of the template, the current
//! level and a caster snapshot.

use std::sync::Arc;

use crate::combat::DamageType;
use crate::consts::{
    CastingTuning, EXP_CURVE_A, EXP_CURVE_B, EXP_CURVE_C, MAX_SPELL_LEVEL, MOVES_PER_TURN,
};
use crate::player::{BodyPart, Caster};
use crate::world::{Attitude, Tripoint, WorldView};

use super::known_magic::KnownMagic;
use super::spell_type::{EffectKind, EnergyType, SpellFlags, SpellId, SpellType, ValidTarget};

/// A learned spell
#[derive(Debug, Clone)]
pub struct Spell {
    template: Arc<SpellType>,
    experience: i32,
}

impl Spell {
    pub fn new(template: Arc<SpellType>) -> Self {
        Self::with_experience(template, 0)
    }

    pub fn with_experience(template: Arc<SpellType>, experience: i32) -> Self {
        Self {
            template,
            experience: experience.max(0),
        }
    }

    pub fn template(&self) -> &SpellType {
        &self.template
    }

    pub(crate) fn set_template(&mut self, template: Arc<SpellType>) {
        self.template = template;
    }

    pub fn id(&self) -> &SpellId {
        &self.template.id
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn description(&self) -> &str {
        &self.template.description
    }

    pub fn effect(&self) -> EffectKind {
        self.template.effect
    }

    pub fn effect_data(&self) -> &str {
        &self.template.effect_str
    }

    pub fn has_flag(&self, flag: SpellFlags) -> bool {
        self.template.has_flag(flag)
    }

    // ========================================================================
    // Experience and level
    // ========================================================================

    /// Total experience needed to reach `level`
    pub fn exp_for_level(level: i32) -> i32 {
        if level <= 0 {
            return 0;
        }
        let raw = ((level as f64 - EXP_CURVE_C) * EXP_CURVE_B).exp().ceil() - EXP_CURVE_A;
        // saturating float-to-int cast for absurd levels
        raw as i32
    }

    pub fn experience(&self) -> i32 {
        self.experience
    }

    /// Largest level up to `max_level` whose threshold has been reached
    pub fn level(&self) -> i32 {
        let mut level = 0;
        let cap = self.max_level();
        while level < cap && Self::exp_for_level(level + 1) <= self.experience {
            level += 1;
        }
        level
    }

    /// Template max level, clamped to `0..=MAX_SPELL_LEVEL`
    pub fn max_level(&self) -> i32 {
        self.template.max_level.clamp(0, MAX_SPELL_LEVEL)
    }

    pub fn is_max_level(&self) -> bool {
        self.level() >= self.max_level()
    }

    /// Experience still missing for the next level, 0 at max level
    pub fn exp_to_next_level(&self) -> i32 {
        if self.is_max_level() {
            0
        } else {
            Self::exp_for_level(self.level() + 1) - self.experience
        }
    }

    /// Percent of the way from the current level to the next
    pub fn exp_progress(&self) -> i32 {
        if self.is_max_level() {
            return 100;
        }
        let level = self.level();
        let this_level = Self::exp_for_level(level);
        let next_level = Self::exp_for_level(level + 1);
        let span = i64::from(next_level - this_level).max(1);
        let gained = i64::from(self.experience - this_level);
        (gained * 100 / span).clamp(0, 100) as i32
    }

    /// Add experience; negative amounts are ignored
    pub fn gain_exp(&mut self, amount: i32) {
        self.experience = self.experience.saturating_add(amount.max(0));
    }

    pub fn gain_level(&mut self) {
        self.gain_exp(self.exp_to_next_level());
    }

    pub fn gain_levels(&mut self, levels: i32) {
        for _ in 0..levels {
            if self.is_max_level() {
                break;
            }
            self.gain_level();
        }
    }

    // ========================================================================
    // Level-scaled values
    // ========================================================================

    pub fn damage(&self) -> i32 {
        self.template.damage.at(self.level())
    }

    pub fn range(&self) -> i32 {
        self.template.range.at(self.level())
    }

    pub fn aoe(&self) -> i32 {
        self.template.aoe.at(self.level())
    }

    pub fn dot(&self) -> i32 {
        self.template.dot.at(self.level())
    }

    /// Duration in moves
    pub fn duration(&self) -> i32 {
        self.template.duration.at(self.level())
    }

    pub fn duration_turns(&self) -> i32 {
        self.duration() / MOVES_PER_TURN
    }

    pub fn pierce(&self) -> i32 {
        self.template.pierce.at(self.level())
    }

    pub fn damage_type(&self) -> DamageType {
        self.template.damage_type
    }

    pub fn damage_type_string(&self) -> String {
        self.template.damage_type.to_string()
    }

    pub fn energy_source(&self) -> EnergyType {
        self.template.energy_source
    }

    pub fn energy_string(&self) -> &'static str {
        self.template.energy_source.name()
    }

    // ========================================================================
    // Caster-dependent values
    // ========================================================================

    pub fn energy_cost(&self, caster: &dyn Caster) -> i32 {
        self.energy_cost_with(caster, &CastingTuning::DEFAULT)
    }

    /// Energy cost at the current level, raised by hand encumbrance
    pub fn energy_cost_with(&self, caster: &dyn Caster, tuning: &CastingTuning) -> i32 {
        if let Some(class) = &self.template.spell_class
            && caster.class_grants_proficiency(class)
        {
            return 0;
        }
        let mut cost = self.template.energy_cost.at(self.level());
        if !self.has_flag(SpellFlags::NO_HANDS) {
            let excess = caster.hands_encumbrance() - tuning.hands_free_encumbrance;
            if excess > 0 {
                cost += excess * tuning.hands_cost_per_point;
            }
        }
        cost
    }

    pub fn casting_time(&self, caster: &dyn Caster) -> i32 {
        self.casting_time_with(caster, &CastingTuning::DEFAULT)
    }

    /// Casting time in moves, raised by leg and (somatic) arm encumbrance
    pub fn casting_time_with(&self, caster: &dyn Caster, tuning: &CastingTuning) -> i32 {
        let mut time = self.template.casting_time.at(self.level());
        if !self.has_flag(SpellFlags::NO_LEGS) {
            let excess = caster.legs_encumbrance() - tuning.legs_free_encumbrance;
            if excess > 0 {
                time += excess * tuning.legs_time_per_point;
            }
        }
        if self.has_flag(SpellFlags::SOMATIC) {
            let excess = caster.arms_encumbrance() - tuning.somatic_free_encumbrance;
            if excess > 0 {
                time += excess * tuning.somatic_time_per_point;
            }
        }
        time
    }

    pub fn spell_fail(&self, caster: &dyn Caster) -> f32 {
        self.spell_fail_with(caster, &CastingTuning::DEFAULT)
    }

    /// Failure probability in `[0, 1]`
    pub fn spell_fail_with(&self, caster: &dyn Caster, tuning: &CastingTuning) -> f32 {
        let effective_skill = tuning.level_weight * (self.level() - self.template.difficulty) as f32
            + caster.intelligence() as f32
            + caster.spellcraft() as f32;
        if effective_skill > tuning.mastery_skill {
            return 0.0;
        }
        if effective_skill < 0.0 {
            return 1.0;
        }
        let deficit = (effective_skill - tuning.mastery_skill) / tuning.mastery_skill;
        let mut fail = deficit * deficit;

        if self.has_flag(SpellFlags::SOMATIC) {
            let excess = (caster.arms_encumbrance() - tuning.somatic_free_encumbrance).max(0);
            fail += excess as f32 * tuning.somatic_fail_per_point;
        }
        if self.has_flag(SpellFlags::VERBAL) {
            let excess =
                (caster.encumbrance(BodyPart::Mouth) - tuning.verbal_free_encumbrance).max(0);
            fail += excess as f32 * tuning.verbal_fail_per_point;
        }
        if self.has_flag(SpellFlags::CONCENTRATE) {
            let focus = caster.focus();
            if focus <= 0 {
                return 1.0;
            }
            fail /= focus as f32 / tuning.neutral_focus;
        }
        fail.clamp(0.0, 1.0)
    }

    pub fn exp_modifier(&self, caster: &dyn Caster) -> f32 {
        self.exp_modifier_with(caster, &CastingTuning::DEFAULT)
    }

    /// Multiplier on casting experience from intelligence, difficulty and skill
    pub fn exp_modifier_with(&self, caster: &dyn Caster, tuning: &CastingTuning) -> f32 {
        let int_term =
            (caster.intelligence() as f32 - tuning.average_intelligence) / tuning.average_intelligence;
        let difficulty_term = self.template.difficulty as f32 / 20.0;
        let skill_term = caster.spellcraft() as f32 / 10.0;
        (int_term + difficulty_term + skill_term) / 5.0 + 1.0
    }

    pub fn casting_exp(&self, caster: &dyn Caster) -> i32 {
        self.casting_exp_with(caster, &CastingTuning::DEFAULT)
    }

    /// Experience for one successful cast
    pub fn casting_exp_with(&self, caster: &dyn Caster, tuning: &CastingTuning) -> i32 {
        let focus_scale = caster.focus().max(0) as f32 / tuning.neutral_focus;
        let exp = tuning.base_casting_exp * self.exp_modifier_with(caster, tuning) * focus_scale;
        (exp.round() as i32).max(0)
    }

    /// Enough energy of the right kind to pay the cost
    pub fn can_cast(&self, caster: &dyn Caster, magic: &KnownMagic) -> bool {
        magic.has_enough_energy(caster, self)
    }

    /// Unrestricted, or the caster has the spell's class
    pub fn can_learn(&self, caster: &dyn Caster) -> bool {
        match &self.template.spell_class {
            Some(class) => caster.has_class(class),
            None => true,
        }
    }

    // ========================================================================
    // Targeting
    // ========================================================================

    pub fn is_valid_target(&self, target: ValidTarget) -> bool {
        self.template.is_valid_target(target)
    }

    /// Whether the creature at `p` may be affected; empty cells need a
    /// ground-targeting spell
    pub fn is_valid_target_at(&self, world: &dyn WorldView, p: Tripoint) -> bool {
        match world.creature_at(p) {
            Some(c) => match c.attitude {
                Attitude::Hostile => self.is_valid_target(ValidTarget::Hostile),
                Attitude::Friendly => self.is_valid_target(ValidTarget::Ally),
                Attitude::Caster => self.is_valid_target(ValidTarget::SelfTarget),
            },
            None => self.is_valid_target(ValidTarget::Ground),
        }
    }

    /// Valid targets as prose: "ally, hostile and ground"
    pub fn enumerate_targets(&self) -> String {
        let names: Vec<String> = self
            .template
            .valid_targets
            .targets()
            .into_iter()
            .filter(|t| *t != ValidTarget::None)
            .map(|t| t.to_string())
            .collect();
        match names.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
        }
    }

    pub fn energy_cost_string(&self, caster: &dyn Caster) -> String {
        match self.energy_source() {
            EnergyType::None => "none".to_string(),
            _ => self.energy_cost(caster).to_string(),
        }
    }

    /// Current amount of the resource this spell draws from
    pub fn energy_cur_string(&self, caster: &dyn Caster, magic: &KnownMagic) -> String {
        match self.energy_source() {
            EnergyType::None => "infinite".to_string(),
            EnergyType::Hp => caster.hp_total().to_string(),
            EnergyType::Mana => magic.available_mana().to_string(),
            EnergyType::Stamina => caster.stamina().to_string(),
            EnergyType::Bionic => caster.power_level().to_string(),
            EnergyType::Fatigue => caster.fatigue().to_string(),
        }
    }
}
