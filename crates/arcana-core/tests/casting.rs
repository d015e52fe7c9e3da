//! The cast pipeline end to end

mod common;

use arcana_core::CastingTuning;
use arcana_core::magic::{
    CastError, CastRequest, KnownMagic, MSG_FIRST_LEVEL, MSG_LOST_CONCENTRATION, Spell,
    SpellCatalog, cast_spell, cast_spell_with,
};
use arcana_core::player::BodyPart;
use arcana_core::world::{Attitude, CreatureId, CreatureKind, Tripoint};
use common::{FakeWorld, Harness, TestCaster, catalog, id, p};

fn learned(spells: &[&str], caster: &TestCaster) -> (SpellCatalog, KnownMagic) {
    let catalog = catalog();
    let mut magic = KnownMagic::new();
    for spell in spells {
        magic.learn_spell(&catalog, &id(spell), caster, true);
    }
    (catalog, magic)
}

/// Caster at (5, 5) with a goblin at (9, 5)
fn arena() -> (Harness, CreatureId) {
    let mut world = FakeWorld::with_caster(p(5, 5));
    let goblin = world.add_creature(p(9, 5), Attitude::Hostile, CreatureKind::Monster);
    (Harness::new(world), goblin)
}

fn request(spell: &str, target: Tripoint) -> CastRequest {
    CastRequest::new(id(spell), target)
}

// ============================================================================
// Refusals
// ============================================================================

#[test]
fn test_unknown_spell_refused() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&[], &caster);

    let err = cast_spell(&request("fireball", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap_err();
    assert_eq!(err, CastError::UnknownSpell(id("fireball")));
}

#[test]
fn test_interruption() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::expert();
    caster.interrupted = true;
    let (catalog, mut magic) = learned(&["fireball"], &caster);

    let err = cast_spell(&request("fireball", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap_err();
    assert_eq!(err, CastError::Interrupted);
    assert_eq!(magic.available_mana(), 1000);

    magic.casting_ignore = true;
    let result =
        cast_spell(&request("fireball", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
            .unwrap();
    assert!(result.success);
}

#[test]
fn test_insufficient_energy_spends_nothing() {
    let (mut h, goblin) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["fireball"], &caster);
    magic.set_mana(&caster, 10);

    let err = cast_spell(&request("fireball", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap_err();

    assert_eq!(err, CastError::InsufficientEnergy { energy: "mana" });
    assert_eq!(err.to_string(), "you don't have enough mana to cast the spell");
    assert_eq!(magic.available_mana(), 10);
    assert_eq!(h.world.damage_to(goblin), 0);
}

#[test]
fn test_out_of_range() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["fireball"], &caster);

    let err = cast_spell(&request("fireball", p(20, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap_err();
    assert_eq!(err, CastError::OutOfRange { distance: 15, range: 10 });
    assert_eq!(err.to_string(), "target is out of range (15 > 10)");
}

#[test]
fn test_invalid_targets() {
    let (mut h, _) = arena();
    h.world.add_creature(p(6, 6), Attitude::Friendly, CreatureKind::Npc);
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["fireball", "cheap_bolt"], &caster);

    // hostile-only spell at an empty cell
    let err = cast_spell(&request("cheap_bolt", p(7, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap_err();
    assert_eq!(err, CastError::InvalidTarget);

    // ground targeting does not make an ally fair game
    let err = cast_spell(&request("fireball", p(6, 6)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap_err();
    assert_eq!(err, CastError::InvalidTarget);
    assert_eq!(magic.available_mana(), 1000);
}

#[test]
fn test_target_must_be_visible() {
    let (mut h, _) = arena();
    h.world.add_creature(p(7, 5), Attitude::Hostile, CreatureKind::Monster);
    h.world.hidden.insert(p(7, 5));
    h.world.hidden.insert(p(7, 7));
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["fireball", "cheap_bolt"], &caster);

    let err = cast_spell(&request("cheap_bolt", p(7, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap_err();
    assert_eq!(err, CastError::TargetNotVisible);

    // ground-targeting spells may aim at unseen cells
    let result =
        cast_spell(&request("fireball", p(7, 7)), &mut caster, &mut magic, &catalog, &mut h.ctx())
            .unwrap();
    assert!(result.success);
}

// ============================================================================
// Failure roll
// ============================================================================

#[test]
fn test_failed_cast_spends_time_only() {
    let (mut h, goblin) = arena();
    let mut caster = TestCaster::new();
    caster.intelligence = 0;
    let (catalog, mut magic) = learned(&["cheap_bolt"], &caster);

    let result =
        cast_spell(&request("cheap_bolt", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
            .unwrap();

    assert!(!result.success);
    assert_eq!(result.messages, vec![MSG_LOST_CONCENTRATION.to_string()]);
    assert_eq!(result.energy_paid, 0);
    assert_eq!(result.exp_gained, 0);
    assert_eq!(magic.available_mana(), 1000);
    assert_eq!(magic.get_spell(&id("cheap_bolt")).unwrap().experience(), 0);
    assert_eq!(h.world.damage_to(goblin), 0);
}

#[test]
fn test_no_fail_skips_roll() {
    let (mut h, goblin) = arena();
    let mut caster = TestCaster::new();
    caster.intelligence = 0;
    let (catalog, mut magic) = learned(&["cheap_bolt"], &caster);
    let mut req = request("cheap_bolt", p(9, 5));
    req.no_fail = true;

    let result = cast_spell(&req, &mut caster, &mut magic, &catalog, &mut h.ctx()).unwrap();

    assert!(result.success);
    assert_eq!(h.world.damage_to(goblin), 4);
}

#[test]
fn test_custom_tuning_in_pipeline() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::new();
    let (catalog, mut magic) = learned(&["fireball"], &caster);
    let lenient = CastingTuning {
        mastery_skill: 1.0,
        ..CastingTuning::DEFAULT
    };

    for _ in 0..5 {
        let result = cast_spell_with(
            &request("fireball", p(9, 5)),
            &mut caster,
            &mut magic,
            &catalog,
            &mut h.ctx(),
            &lenient,
        )
        .unwrap();
        assert!(result.success);
    }
}

// ============================================================================
// Successful casts
// ============================================================================

#[test]
fn test_first_cast_pays_and_levels() {
    let (mut h, goblin) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["fireball"], &caster);

    let result =
        cast_spell(&request("fireball", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
            .unwrap();

    assert!(result.success);
    assert_eq!(result.moves, 100);
    assert_eq!(result.target, p(9, 5));
    assert_eq!(result.energy_paid, 50);
    assert_eq!(magic.available_mana(), 950);
    assert_eq!(h.world.damage_to(goblin), 10);

    assert!(result.leveled_up);
    assert_eq!(result.exp_gained, Spell::exp_for_level(1));
    assert_eq!(magic.get_spell(&id("fireball")).unwrap().level(), 1);
    assert_eq!(result.messages[0], "You cast Fireball!");
    assert_eq!(result.messages.last().unwrap(), MSG_FIRST_LEVEL);
}

#[test]
fn test_later_casts_earn_casting_exp() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["fireball"], &caster);
    magic.get_spell_mut(&id("fireball")).unwrap().gain_level();
    let before = magic.get_spell(&id("fireball")).unwrap().experience();
    let expected = magic.get_spell(&id("fireball")).unwrap().casting_exp(&caster);

    let result =
        cast_spell(&request("fireball", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
            .unwrap();

    assert_eq!(expected, 130);
    assert_eq!(result.exp_gained, expected);
    assert_eq!(
        magic.get_spell(&id("fireball")).unwrap().experience(),
        before + expected
    );
    assert!(!result.leveled_up);
}

#[test]
fn test_no_exp_at_max_level() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::expert();
    let catalog = catalog();
    let mut magic = KnownMagic::new();
    magic.learn_spell_at_level(&catalog, &id("conjure_blade"), &caster, 1, true);

    let result =
        cast_spell(&request("conjure_blade", p(5, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
            .unwrap();

    assert!(result.success);
    assert_eq!(result.exp_gained, 0);
    assert_eq!(h.world.items[0].3, None);
}

#[test]
fn test_verbal_spell_makes_noise_at_caster() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["fireball", "lance"], &caster);

    cast_spell(&request("fireball", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap();
    assert!(h.world.sounds.contains(&(p(5, 5), 6)));

    h.world.sounds.clear();
    cast_spell(&request("lance", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap();
    assert!(h.world.sounds.is_empty());
}

#[test]
fn test_no_mana_flag() {
    let (mut h, goblin) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["fireball"], &caster);
    magic.set_mana(&caster, 0);
    let mut req = request("fireball", p(9, 5));
    req.no_mana = true;

    let result = cast_spell(&req, &mut caster, &mut magic, &catalog, &mut h.ctx()).unwrap();

    assert!(result.success);
    assert_eq!(result.energy_paid, 0);
    assert_eq!(magic.available_mana(), 0);
    assert_eq!(h.world.damage_to(goblin), 10);
}

#[test]
fn test_level_override_casts_unknown_spell() {
    let (mut h, goblin) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&[], &caster);
    let mut req = request("fireball", p(9, 5));
    req.level_override = Some(5);

    let result = cast_spell(&req, &mut caster, &mut magic, &catalog, &mut h.ctx()).unwrap();

    assert!(result.success);
    assert_eq!(h.world.damage_to(goblin), 20);
    assert_eq!(result.exp_gained, 0);
    assert!(!magic.knows_spell(&id("fireball")));

    req.spell = id("nonexistent");
    let err = cast_spell(&req, &mut caster, &mut magic, &catalog, &mut h.ctx()).unwrap_err();
    assert_eq!(err, CastError::UnknownSpell(id("nonexistent")));
}

// ============================================================================
// Energy sources
// ============================================================================

#[test]
fn test_hp_cost_from_healthiest_part() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::expert();
    caster.hp.insert(BodyPart::Torso, 80);
    let (catalog, mut magic) = learned(&["blood_price"], &caster);

    let result =
        cast_spell(&request("blood_price", p(0, 0)), &mut caster, &mut magic, &catalog, &mut h.ctx())
            .unwrap();

    assert_eq!(result.energy_paid, 15);
    assert_eq!(result.target, p(5, 5));
    assert_eq!(caster.hp[&BodyPart::Torso], 65);
    assert_eq!(caster.hp[&BodyPart::Head], 60);
    assert_eq!(magic.available_mana(), 1000);
}

#[test]
fn test_fatigue_cost_and_self_target() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["second_wind"], &caster);

    cast_spell(&request("second_wind", p(9, 5)), &mut caster, &mut magic, &catalog, &mut h.ctx())
        .unwrap();

    assert_eq!(caster.fatigue, 20);
    assert_eq!(caster.stamina, 1040);
}

#[test]
fn test_stamina_cost_and_blink() {
    let (mut h, _) = arena();
    let mut caster = TestCaster::expert();
    let (catalog, mut magic) = learned(&["blink"], &caster);

    let result =
        cast_spell(&request("blink", p(0, 0)), &mut caster, &mut magic, &catalog, &mut h.ctx())
            .unwrap();

    assert_eq!(result.energy_paid, 30);
    assert_eq!(caster.stamina, 970);
    assert_eq!(h.world.teleported.len(), 1);
}
