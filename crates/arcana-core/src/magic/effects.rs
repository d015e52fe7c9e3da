//! Spell effects
//!
//! One resolver per [`EffectKind`], selected by [`resolve`]. Resolvers read
//! the spell's level-scaled values, pick cells with the geometry in
//! [`area`](super::area) and push the consequences into the world.

use std::collections::BTreeSet;
use std::str::FromStr;

use tracing::debug;

use crate::combat::DamageInstance;
use crate::consts::TELEPORT_TRIES;
use crate::player::{BodyPart, Caster};
use crate::rng::GameRng;
use crate::ui::Selector;
use crate::world::{Attitude, CreatureId, Ground, SpellWorld, Tripoint, rl_dist};

use super::area;
use super::known_magic::KnownMagic;
use super::spell::Spell;
use super::spell_type::{EffectKind, EnergyType, SpellFlags};
use super::teleporter::TeleporterList;

/// Collaborators an effect may touch
pub struct EffectContext<'a> {
    pub world: &'a mut dyn SpellWorld,
    pub selector: &'a mut dyn Selector,
    /// Gate registry of the region the caster is in
    pub gates: &'a mut TeleporterList,
    pub rng: &'a mut GameRng,
}

/// What an effect did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectResult {
    /// Messages to display
    pub messages: Vec<String>,
    /// Cells the effect covered
    pub cells: BTreeSet<Tripoint>,
    /// Hit points restored
    pub healed: i32,
    /// Creatures spawned
    pub spawned: i32,
}

impl EffectResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.messages.push(msg.into());
        self
    }
}

/// Run the effect of `spell` cast by `caster` at `target`
pub fn resolve(
    spell: &Spell,
    caster: &mut dyn Caster,
    magic: &mut KnownMagic,
    target: Tripoint,
    ctx: &mut EffectContext<'_>,
) -> EffectResult {
    match spell.effect() {
        EffectKind::NoEffect => EffectResult::new(),
        EffectKind::TargetAttack => target_attack(spell, target, ctx),
        EffectKind::ProjectileAttack => projectile_attack(spell, caster.pos(), target, ctx),
        EffectKind::ConeAttack => cone_attack(spell, caster.pos(), target, ctx),
        EffectKind::LineAttack => line_attack(spell, caster.pos(), target, ctx),
        EffectKind::TeleportRandom => teleport_random(spell, caster, ctx),
        EffectKind::PainSplit => pain_split(caster),
        EffectKind::MoveEarth => move_earth(target, ctx),
        EffectKind::SpawnItem => spawn_item(spell, caster, ctx),
        EffectKind::Summon => summon(spell, target, ctx),
        EffectKind::RecoverEnergy => recover_energy(spell, caster, magic, target, ctx),
        EffectKind::Heal => heal(spell, target, ctx),
        EffectKind::Translocate => translocate(spell, target, ctx),
    }
}

// ============================================================================
// Attacks
// ============================================================================

/// Blast of `aoe()` centered on the target
pub fn target_attack(spell: &Spell, target: Tripoint, ctx: &mut EffectContext<'_>) -> EffectResult {
    let cells = area::blast(
        target,
        spell.aoe(),
        spell.has_flag(SpellFlags::IGNORE_WALLS),
        &*ctx.world,
    );
    damage_targets(spell, cells, ctx)
}

/// Fly towards the target and burst at the first obstruction
pub fn projectile_attack(
    spell: &Spell,
    source: Tripoint,
    target: Tripoint,
    ctx: &mut EffectContext<'_>,
) -> EffectResult {
    let impact = if spell.has_flag(SpellFlags::IGNORE_WALLS) {
        target
    } else {
        area::projectile_impact(source, target, &*ctx.world)
    };
    target_attack(spell, impact, ctx)
}

pub fn cone_attack(
    spell: &Spell,
    source: Tripoint,
    target: Tripoint,
    ctx: &mut EffectContext<'_>,
) -> EffectResult {
    let cells = area::cone(
        source,
        target,
        spell.range(),
        spell.aoe(),
        spell.has_flag(SpellFlags::IGNORE_WALLS),
        &*ctx.world,
    );
    damage_targets(spell, cells, ctx)
}

pub fn line_attack(
    spell: &Spell,
    source: Tripoint,
    target: Tripoint,
    ctx: &mut EffectContext<'_>,
) -> EffectResult {
    let cells = area::line(
        source,
        target,
        spell.aoe(),
        spell.has_flag(SpellFlags::IGNORE_WALLS),
        &*ctx.world,
    );
    damage_targets(spell, cells, ctx)
}

/// Noise a spell makes where it lands, 0 when silent
pub fn impact_loudness(spell: &Spell) -> i32 {
    if spell.has_flag(SpellFlags::SILENT) {
        return 0;
    }
    let mut loudness = spell.damage().abs() / 3;
    if spell.has_flag(SpellFlags::LOUD) {
        loudness += 1 + spell.damage() / 3;
    }
    loudness.max(0)
}

/// Apply the spell's damage, healing and status effect to every valid
/// target in `cells`
fn damage_targets(
    spell: &Spell,
    cells: BTreeSet<Tripoint>,
    ctx: &mut EffectContext<'_>,
) -> EffectResult {
    let mut result = EffectResult::new();
    let damage = spell.damage();
    let loudness = impact_loudness(spell);
    let body_parts = spell.template().affected_body_parts.parts();

    for &p in &cells {
        if !spell.is_valid_target_at(&*ctx.world, p) {
            continue;
        }
        if loudness > 0 {
            ctx.world.make_sound(p, loudness, "a crackle of magic");
        }
        if spell.damage_type().disrupts_terrain() && damage > 0 {
            ctx.world.bash(p, damage);
        }

        let Some(creature) = ctx.world.creature_at(p) else {
            continue;
        };
        if !spell.effect_data().is_empty() {
            add_effect_to_target(spell, creature.id, &body_parts, ctx);
        }
        if damage > 0 {
            ctx.world.deal_damage(
                creature.id,
                DamageInstance {
                    damage_type: spell.damage_type(),
                    amount: damage,
                    armor_penetration: spell.pierce(),
                    damage_over_time: spell.dot(),
                },
            );
        } else if damage < 0 {
            let parts = if body_parts.is_empty() {
                BodyPart::HIT_POINT_PARTS.to_vec()
            } else {
                body_parts.clone()
            };
            for bp in parts {
                result.healed += ctx.world.heal(creature.id, bp, -damage);
            }
        }
    }

    result.cells = cells;
    result
}

fn add_effect_to_target(
    spell: &Spell,
    target: CreatureId,
    body_parts: &[BodyPart],
    ctx: &mut EffectContext<'_>,
) {
    let turns = spell.duration_turns();
    if body_parts.is_empty() {
        ctx.world.add_effect(target, spell.effect_data(), turns, None);
    }
    for bp in body_parts {
        ctx.world.add_effect(target, spell.effect_data(), turns, Some(*bp));
    }
}

// ============================================================================
// Movement
// ============================================================================

/// Blink to a random free cell between `aoe()` and `range()` away
pub fn teleport_random(
    spell: &Spell,
    caster: &dyn Caster,
    ctx: &mut EffectContext<'_>,
) -> EffectResult {
    let origin = caster.pos();
    let (min_dist, max_dist) = {
        let (a, b) = (spell.aoe().max(0), spell.range().max(0));
        (a.min(b), a.max(b))
    };

    for _ in 0..TELEPORT_TRIES {
        let dest = origin.offset(
            ctx.rng.range_i32(-max_dist, max_dist),
            ctx.rng.range_i32(-max_dist, max_dist),
        );
        let dist = rl_dist(origin, dest);
        if dist < min_dist || dist > max_dist || dest == origin || !ctx.world.is_free(dest) {
            continue;
        }
        if ctx.world.teleport_creature(caster.id(), dest) {
            debug!(from = %origin, to = %dest, "random teleport");
            let mut result = EffectResult::new();
            result.cells.insert(dest);
            return result;
        }
    }
    EffectResult::new().with_message("You feel a tug, but nothing happens.")
}

/// Long-range teleport through a known gate
pub fn translocate(spell: &Spell, target: Tripoint, ctx: &mut EffectContext<'_>) -> EffectResult {
    let cells = area::blast(
        target,
        spell.aoe(),
        spell.has_flag(SpellFlags::IGNORE_WALLS),
        &*ctx.world,
    );
    let outcome = ctx.gates.translocate(&cells, &mut *ctx.world, &mut *ctx.selector);
    EffectResult {
        messages: outcome.messages,
        cells,
        ..EffectResult::default()
    }
}

// ============================================================================
// Self and support
// ============================================================================

/// Even out hit points across every body part that still has some
pub fn pain_split(caster: &mut dyn Caster) -> EffectResult {
    let parts: Vec<BodyPart> = BodyPart::HIT_POINT_PARTS
        .iter()
        .copied()
        .filter(|bp| caster.hp(*bp) != 0)
        .collect();
    if parts.is_empty() {
        return EffectResult::new();
    }
    let total: i32 = parts.iter().map(|bp| caster.hp(*bp)).sum();
    let each = total / parts.len() as i32;
    for bp in parts {
        caster.set_hp(bp, each);
    }
    EffectResult::new().with_message("Your injuries even out.")
}

/// Restore hit points on the spell's body parts (every part when none listed)
pub fn heal(spell: &Spell, target: Tripoint, ctx: &mut EffectContext<'_>) -> EffectResult {
    let mut result = EffectResult::new();
    result.cells.insert(target);
    let Some(creature) = ctx.world.creature_at(target) else {
        return result;
    };
    if !spell.is_valid_target_at(&*ctx.world, target) {
        return result;
    }
    let amount = spell.damage().abs();
    let mut parts = spell.template().affected_body_parts.parts();
    if parts.is_empty() {
        parts = BodyPart::HIT_POINT_PARTS.to_vec();
    }
    for bp in parts {
        result.healed += ctx.world.heal(creature.id, bp, amount);
    }
    result
}

/// Restore an energy reserve by `damage()`.
///
/// The reserve is named by the effect parameter (`MANA`, `STAMINA`,
/// `FATIGUE`, `BIONIC`), falling back to the spell's own energy source.
pub fn recover_energy(
    spell: &Spell,
    caster: &mut dyn Caster,
    magic: &mut KnownMagic,
    target: Tripoint,
    ctx: &mut EffectContext<'_>,
) -> EffectResult {
    let mut result = EffectResult::new();
    result.cells.insert(target);
    let amount = spell.damage();
    let kind = EnergyType::from_str(spell.effect_data()).unwrap_or(spell.energy_source());

    let Some(creature) = ctx.world.creature_at(target) else {
        return result;
    };
    if !spell.is_valid_target_at(&*ctx.world, target) {
        return result;
    }
    if creature.attitude != Attitude::Caster {
        ctx.world.restore_energy(creature.id, kind, amount);
        return result;
    }

    match kind {
        EnergyType::Mana => magic.mod_mana(caster, amount),
        EnergyType::Stamina => caster.mod_stamina(amount),
        EnergyType::Fatigue => caster.mod_fatigue(-amount),
        // a negative bionic restore drains stamina instead
        EnergyType::Bionic if amount > 0 => caster.mod_power_level(amount),
        EnergyType::Bionic => caster.mod_stamina(amount),
        EnergyType::Hp => {
            let mut parts = spell.template().affected_body_parts.parts();
            if parts.is_empty() {
                parts = vec![BodyPart::Torso];
            }
            for bp in parts {
                caster.mod_hp(bp, amount);
            }
        }
        EnergyType::None => {}
    }
    result
}

// ============================================================================
// World shaping
// ============================================================================

/// Dig the ground at the target one step deeper
pub fn move_earth(target: Tripoint, ctx: &mut EffectContext<'_>) -> EffectResult {
    let mut result = EffectResult::new();
    result.cells.insert(target);
    let (next, msg) = match ctx.world.ground_at(target) {
        Ground::Air => (None, "All the dust in the air here falls to the ground."),
        Ground::DeepPit => (Some(Ground::Hole), "The pit has deepened further."),
        Ground::ShallowPit => (Some(Ground::DeepPit), "More debris shifts out of the pit."),
        Ground::SoftDirt => (Some(Ground::ShallowPit), "The earth moves out of the way for you."),
        Ground::HardRock => (Some(Ground::Sand), "The rocks here are ground into sand."),
        _ => (None, "The earth here does not listen to your command to move."),
    };
    if let Some(ground) = next {
        ctx.world.set_ground(target, ground);
    }
    result.with_message(msg)
}

/// Conjure `damage()` charges of the item named by the effect parameter.
///
/// Conjured items fade after `duration_turns()` unless the spell is
/// permanent and mastered.
pub fn spawn_item(spell: &Spell, caster: &dyn Caster, ctx: &mut EffectContext<'_>) -> EffectResult {
    let expires = if spell.has_flag(SpellFlags::PERMANENT) && spell.is_max_level() {
        None
    } else {
        Some(spell.duration_turns())
    };
    ctx.world
        .grant_item(caster.id(), spell.effect_data(), spell.damage(), expires);
    EffectResult::new()
}

/// Summon `|damage()|` creatures on free cells around the target
pub fn summon(spell: &Spell, target: Tripoint, ctx: &mut EffectContext<'_>) -> EffectResult {
    let mut result = EffectResult::new();
    let mut candidates: Vec<Tripoint> = area::blast(target, spell.aoe(), false, &*ctx.world)
        .into_iter()
        .collect();
    let lifespan = if spell.has_flag(SpellFlags::PERMANENT) {
        None
    } else {
        Some(spell.duration_turns())
    };

    let loudness = impact_loudness(spell);
    let wanted = spell.damage().abs();
    while result.spawned < wanted && !candidates.is_empty() {
        let idx = ctx.rng.rn2(candidates.len() as u32) as usize;
        let p = candidates.swap_remove(idx);
        if !ctx.world.is_free(p) {
            continue;
        }
        let hostile = summon_is_hostile(spell, ctx.rng);
        if ctx.world.spawn_monster(spell.effect_data(), p, hostile, lifespan) {
            result.spawned += 1;
            result.cells.insert(p);
            if loudness > 0 {
                ctx.world.make_sound(p, loudness, "a summoning");
            }
        }
    }
    result
}

fn summon_is_hostile(spell: &Spell, rng: &mut GameRng) -> bool {
    if spell.has_flag(SpellFlags::HOSTILE_SUMMON) {
        true
    } else if spell.has_flag(SpellFlags::HOSTILE_50) {
        rng.one_in(2)
    } else {
        false
    }
}
