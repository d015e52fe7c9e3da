//! The cast pipeline
//!
//! Validates a cast, rolls for failure, pays the cost, resolves the effect
//! and awards experience. Nothing is spent until every check has passed, and
//! experience is only granted after the cost has been paid on a successful
//! cast.

use thiserror::Error;
use tracing::debug;

use crate::consts::CastingTuning;
use crate::player::{BodyPart, Caster};
use crate::world::{Tripoint, rl_dist};

use super::catalog::SpellCatalog;
use super::effects::{self, EffectContext, EffectResult};
use super::known_magic::KnownMagic;
use super::spell::Spell;
use super::spell_type::{EnergyType, SpellFlags, SpellId, ValidTarget};

pub const MSG_LOST_CONCENTRATION: &str = "You lose your concentration!";
pub const MSG_FIRST_LEVEL: &str =
    "Something about how this spell works just clicked!  You gained a level!";

/// Why a cast was refused. Nothing is spent on a refusal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("you don't know the spell {0}")]
    UnknownSpell(SpellId),

    #[error("you are interrupted before you can finish the spell")]
    Interrupted,

    #[error("you don't have enough {energy} to cast the spell")]
    InsufficientEnergy { energy: &'static str },

    #[error("target is out of range ({distance} > {range})")]
    OutOfRange { distance: i32, range: i32 },

    #[error("you can't target that with this spell")]
    InvalidTarget,

    #[error("you can't see the target")]
    TargetNotVisible,
}

/// One cast attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastRequest {
    pub spell: SpellId,
    pub target: Tripoint,
    /// Skip the failure roll
    pub no_fail: bool,
    /// Skip paying the energy cost
    pub no_mana: bool,
    /// Cast at this level without knowing the spell (scrolls, wands)
    pub level_override: Option<i32>,
}

impl CastRequest {
    pub fn new(spell: SpellId, target: Tripoint) -> Self {
        Self {
            spell,
            target,
            no_fail: false,
            no_mana: false,
            level_override: None,
        }
    }
}

/// Result of a cast that was not refused
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastResult {
    /// Messages to display
    pub messages: Vec<String>,
    /// False when the failure roll fizzled the spell
    pub success: bool,
    /// Moves spent casting
    pub moves: i32,
    /// Energy actually paid
    pub energy_paid: i32,
    pub exp_gained: i32,
    pub leveled_up: bool,
    /// Cell the spell was aimed at after range checks
    pub target: Tripoint,
    pub effect: EffectResult,
}

/// Cast a spell with the default tuning
pub fn cast_spell(
    request: &CastRequest,
    caster: &mut dyn Caster,
    magic: &mut KnownMagic,
    catalog: &SpellCatalog,
    ctx: &mut EffectContext<'_>,
) -> Result<CastResult, CastError> {
    cast_spell_with(request, caster, magic, catalog, ctx, &CastingTuning::DEFAULT)
}

pub fn cast_spell_with(
    request: &CastRequest,
    caster: &mut dyn Caster,
    magic: &mut KnownMagic,
    catalog: &SpellCatalog,
    ctx: &mut EffectContext<'_>,
    tuning: &CastingTuning,
) -> Result<CastResult, CastError> {
    let spell = match request.level_override {
        Some(level) => {
            let template = catalog
                .get(&request.spell)
                .ok_or_else(|| CastError::UnknownSpell(request.spell.clone()))?;
            Spell::with_experience(template.clone(), Spell::exp_for_level(level))
        }
        None => magic
            .get_spell(&request.spell)
            .cloned()
            .ok_or_else(|| CastError::UnknownSpell(request.spell.clone()))?,
    };

    if caster.interrupt_pending() && !magic.casting_ignore {
        return Err(CastError::Interrupted);
    }
    if !request.no_mana && !magic.has_enough_energy(caster, &spell) {
        return Err(CastError::InsufficientEnergy {
            energy: spell.energy_string(),
        });
    }
    let target = resolve_target(&spell, caster, request.target, ctx)?;

    let mut result = CastResult {
        moves: spell.casting_time_with(caster, tuning),
        target,
        ..CastResult::default()
    };

    if !request.no_fail && ctx.rng.roll_chance(spell.spell_fail_with(caster, tuning)) {
        debug!(spell = %spell.id(), "cast failed");
        result.messages.push(MSG_LOST_CONCENTRATION.to_string());
        return Ok(result);
    }

    if !request.no_mana {
        result.energy_paid = pay_cost(&spell, caster, magic, tuning);
    }

    if spell.has_flag(SpellFlags::VERBAL) && !spell.has_flag(SpellFlags::SILENT) {
        let volume = spell.damage().abs() * 2 / 3;
        if volume > 0 {
            ctx.world.make_sound(caster.pos(), volume, "an incantation");
        }
    }

    result.success = true;
    result.messages.push(format!("You cast {}!", spell.name()));
    let effect = effects::resolve(&spell, caster, magic, target, ctx);
    result.messages.extend(effect.messages.iter().cloned());
    result.effect = effect;

    if request.level_override.is_none() {
        award_experience(&request.spell, caster, magic, tuning, &mut result);
    }
    Ok(result)
}

/// Range and target checks; self-only spells aim at the caster
fn resolve_target(
    spell: &Spell,
    caster: &dyn Caster,
    requested: Tripoint,
    ctx: &EffectContext<'_>,
) -> Result<Tripoint, CastError> {
    let range = spell.range();
    if range <= 0 || spell.is_valid_target(ValidTarget::None) {
        return Ok(caster.pos());
    }

    let distance = rl_dist(caster.pos(), requested);
    if distance > range {
        return Err(CastError::OutOfRange { distance, range });
    }
    if !spell.is_valid_target_at(&*ctx.world, requested) {
        return Err(CastError::InvalidTarget);
    }
    if !spell.is_valid_target(ValidTarget::Ground) && !ctx.world.sees(caster.pos(), requested) {
        return Err(CastError::TargetNotVisible);
    }
    Ok(requested)
}

/// Deduct the cost from the spell's energy source
fn pay_cost(
    spell: &Spell,
    caster: &mut dyn Caster,
    magic: &mut KnownMagic,
    tuning: &CastingTuning,
) -> i32 {
    let cost = spell.energy_cost_with(caster, tuning);
    match spell.energy_source() {
        EnergyType::Mana => magic.mod_mana(caster, -cost),
        EnergyType::Stamina => caster.mod_stamina(-cost),
        EnergyType::Bionic => caster.mod_power_level(-cost),
        EnergyType::Fatigue => caster.mod_fatigue(cost),
        EnergyType::Hp => {
            let healthiest = BodyPart::HIT_POINT_PARTS
                .iter()
                .copied()
                .max_by_key(|bp| caster.hp(*bp))
                .unwrap_or(BodyPart::Torso);
            caster.mod_hp(healthiest, -cost);
        }
        EnergyType::None => return 0,
    }
    cost
}

fn award_experience(
    id: &SpellId,
    caster: &dyn Caster,
    magic: &mut KnownMagic,
    tuning: &CastingTuning,
    result: &mut CastResult,
) {
    let Some(spell) = magic.get_spell_mut(id) else {
        return;
    };
    if spell.is_max_level() {
        return;
    }

    let old_level = spell.level();
    if old_level == 0 {
        let before = spell.experience();
        spell.gain_level();
        result.exp_gained = spell.experience() - before;
        result.leveled_up = true;
        result.messages.push(MSG_FIRST_LEVEL.to_string());
    } else {
        let exp = spell.casting_exp_with(caster, tuning);
        spell.gain_exp(exp);
        result.exp_gained = exp;
        if spell.level() != old_level {
            result.leveled_up = true;
            result.messages.push(format!("You gained a level in {}!", spell.name()));
        }
    }
    if result.leveled_up {
        debug!(spell = %id, level = spell.level(), "spell level gained");
    }
}
