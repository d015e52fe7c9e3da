//! Shared fixtures: a scripted world, a test caster and a small catalog

#![allow(dead_code)]

use hashbrown::{HashMap, HashSet};

use arcana_core::GameRng;
use arcana_core::combat::DamageInstance;
use arcana_core::magic::{ClassId, EffectContext, EnergyType, SpellCatalog, SpellId, TeleporterList};
use arcana_core::player::{BodyPart, Caster};
use arcana_core::ui::ScriptedSelector;
use arcana_core::world::{
    Attitude, CreatureId, CreatureInfo, CreatureKind, Ground, SpellWorld, Tripoint, WorldView,
};

pub const CASTER_ID: CreatureId = CreatureId(1);

pub fn p(x: i32, y: i32) -> Tripoint {
    Tripoint::new(x, y, 0)
}

// ============================================================================
// World
// ============================================================================

/// Open map that records every mutation
#[derive(Debug, Default)]
pub struct FakeWorld {
    pub walls: HashSet<Tripoint>,
    pub hidden: HashSet<Tripoint>,
    pub creatures: HashMap<Tripoint, CreatureInfo>,
    pub ground: HashMap<Tripoint, Ground>,
    /// Region coordinate -> landing cell; missing means obstructed
    pub gate_landings: HashMap<Tripoint, Tripoint>,

    pub damage: Vec<(CreatureId, DamageInstance)>,
    pub effects: Vec<(CreatureId, String, i32, Option<BodyPart>)>,
    pub healed: Vec<(CreatureId, BodyPart, i32)>,
    pub restored: Vec<(CreatureId, EnergyType, i32)>,
    pub sounds: Vec<(Tripoint, i32)>,
    pub bashed: Vec<(Tripoint, i32)>,
    pub spawned: Vec<(String, Tripoint, bool, Option<i32>)>,
    pub items: Vec<(CreatureId, String, i32, Option<i32>)>,
    pub teleported: Vec<(CreatureId, Tripoint)>,
    pub relocated: Vec<(CreatureId, Tripoint, Tripoint)>,
    next_id: u32,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self {
            next_id: 100,
            ..Self::default()
        }
    }

    /// World with the caster standing at `pos`
    pub fn with_caster(pos: Tripoint) -> Self {
        let mut world = Self::new();
        world.creatures.insert(
            pos,
            CreatureInfo {
                id: CASTER_ID,
                attitude: Attitude::Caster,
                kind: CreatureKind::Avatar,
            },
        );
        world
    }

    pub fn add_creature(&mut self, pos: Tripoint, attitude: Attitude, kind: CreatureKind) -> CreatureId {
        self.next_id += 1;
        let id = CreatureId(self.next_id);
        self.creatures.insert(pos, CreatureInfo { id, attitude, kind });
        id
    }

    pub fn add_wall(&mut self, pos: Tripoint) {
        self.walls.insert(pos);
    }

    pub fn damage_to(&self, id: CreatureId) -> i32 {
        self.damage
            .iter()
            .filter(|(target, _)| *target == id)
            .map(|(_, d)| d.amount)
            .sum()
    }
}

impl WorldView for FakeWorld {
    fn is_passable(&self, p: Tripoint) -> bool {
        !self.walls.contains(&p)
    }

    fn creature_at(&self, p: Tripoint) -> Option<CreatureInfo> {
        self.creatures.get(&p).copied()
    }

    fn sees(&self, _from: Tripoint, to: Tripoint) -> bool {
        !self.hidden.contains(&to)
    }

    fn ground_at(&self, p: Tripoint) -> Ground {
        self.ground.get(&p).copied().unwrap_or_default()
    }
}

impl SpellWorld for FakeWorld {
    fn deal_damage(&mut self, target: CreatureId, damage: DamageInstance) {
        self.damage.push((target, damage));
    }

    fn add_effect(&mut self, target: CreatureId, effect: &str, turns: i32, bp: Option<BodyPart>) {
        self.effects.push((target, effect.to_string(), turns, bp));
    }

    fn heal(&mut self, target: CreatureId, bp: BodyPart, amount: i32) -> i32 {
        self.healed.push((target, bp, amount));
        amount
    }

    fn restore_energy(&mut self, target: CreatureId, kind: EnergyType, amount: i32) {
        self.restored.push((target, kind, amount));
    }

    fn make_sound(&mut self, p: Tripoint, volume: i32, _description: &str) {
        self.sounds.push((p, volume));
    }

    fn bash(&mut self, p: Tripoint, strength: i32) {
        self.bashed.push((p, strength));
    }

    fn spawn_monster(
        &mut self,
        kind: &str,
        p: Tripoint,
        hostile: bool,
        lifespan_turns: Option<i32>,
    ) -> bool {
        let attitude = if hostile { Attitude::Hostile } else { Attitude::Friendly };
        self.add_creature(p, attitude, CreatureKind::Monster);
        self.spawned.push((kind.to_string(), p, hostile, lifespan_turns));
        true
    }

    fn grant_item(&mut self, recipient: CreatureId, item: &str, charges: i32, expires: Option<i32>) {
        self.items.push((recipient, item.to_string(), charges, expires));
    }

    fn set_ground(&mut self, p: Tripoint, ground: Ground) {
        self.ground.insert(p, ground);
    }

    fn teleport_creature(&mut self, id: CreatureId, dest: Tripoint) -> bool {
        let Some(from) = self
            .creatures
            .iter()
            .find(|(_, c)| c.id == id)
            .map(|(pos, _)| *pos)
        else {
            return false;
        };
        if let Some(info) = self.creatures.remove(&from) {
            self.creatures.insert(dest, info);
        }
        self.teleported.push((id, dest));
        true
    }

    fn find_gate_landing(&mut self, region: Tripoint) -> Option<Tripoint> {
        self.gate_landings.get(&region).copied()
    }

    fn relocate_to_region(&mut self, id: CreatureId, region: Tripoint, landing: Tripoint) -> bool {
        self.relocated.push((id, region, landing));
        true
    }
}

// ============================================================================
// Caster
// ============================================================================

#[derive(Debug, Clone)]
pub struct TestCaster {
    pub pos: Tripoint,
    pub intelligence: i32,
    pub spellcraft: i32,
    pub focus: i32,
    pub stamina: i32,
    pub power: i32,
    pub fatigue: i32,
    pub encumbrance: HashMap<BodyPart, i32>,
    pub hp: HashMap<BodyPart, i32>,
    pub classes: Vec<ClassId>,
    pub conflicting: Vec<ClassId>,
    pub proficient: Vec<ClassId>,
    pub interrupted: bool,
    pub regen_multiplier: f32,
}

impl TestCaster {
    pub fn new() -> Self {
        Self {
            pos: p(5, 5),
            intelligence: 8,
            spellcraft: 0,
            focus: 100,
            stamina: 1000,
            power: 0,
            fatigue: 0,
            encumbrance: HashMap::new(),
            hp: BodyPart::HIT_POINT_PARTS.iter().map(|bp| (*bp, 60)).collect(),
            classes: Vec::new(),
            conflicting: Vec::new(),
            proficient: Vec::new(),
            interrupted: false,
            regen_multiplier: 1.0,
        }
    }

    /// Caster skilled enough that nothing in the test catalog fails
    pub fn expert() -> Self {
        Self {
            intelligence: 20,
            spellcraft: 20,
            ..Self::new()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(ClassId::from(class));
        self
    }
}

impl Caster for TestCaster {
    fn id(&self) -> CreatureId {
        CASTER_ID
    }
    fn pos(&self) -> Tripoint {
        self.pos
    }
    fn intelligence(&self) -> i32 {
        self.intelligence
    }
    fn spellcraft(&self) -> i32 {
        self.spellcraft
    }
    fn encumbrance(&self, bp: BodyPart) -> i32 {
        self.encumbrance.get(&bp).copied().unwrap_or(0)
    }
    fn focus(&self) -> i32 {
        self.focus
    }
    fn stamina(&self) -> i32 {
        self.stamina
    }
    fn power_level(&self) -> i32 {
        self.power
    }
    fn fatigue(&self) -> i32 {
        self.fatigue
    }
    fn hp(&self, bp: BodyPart) -> i32 {
        self.hp.get(&bp).copied().unwrap_or(0)
    }
    fn mod_stamina(&mut self, delta: i32) {
        self.stamina += delta;
    }
    fn mod_power_level(&mut self, delta: i32) {
        self.power += delta;
    }
    fn mod_fatigue(&mut self, delta: i32) {
        self.fatigue += delta;
    }
    fn mod_hp(&mut self, bp: BodyPart, delta: i32) {
        *self.hp.entry(bp).or_insert(0) += delta;
    }
    fn set_hp(&mut self, bp: BodyPart, value: i32) {
        self.hp.insert(bp, value);
    }
    fn has_class(&self, class: &ClassId) -> bool {
        self.classes.contains(class)
    }
    fn has_conflicting_class(&self, class: &ClassId) -> bool {
        self.conflicting.contains(class)
    }
    fn class_grants_proficiency(&self, class: &ClassId) -> bool {
        self.proficient.contains(class)
    }
    fn mana_regen_multiplier(&self) -> f32 {
        self.regen_multiplier
    }
    fn interrupt_pending(&self) -> bool {
        self.interrupted
    }
}

// ============================================================================
// Catalog and context
// ============================================================================

pub const TEST_SPELLS: &str = r#"[
    {
        "id": "fireball", "name": "Fireball", "effect": "projectile_attack",
        "valid_targets": ["hostile", "ground"], "flags": ["VERBAL"],
        "min_damage": 10, "damage_increment": 2.0, "max_damage": 40,
        "min_range": 10, "max_range": 10,
        "min_aoe": 1, "max_aoe": 1,
        "base_energy_cost": 50, "energy_source": "MANA",
        "base_casting_time": 100, "damage_type": "fire",
        "difficulty": 3, "max_level": 10
    },
    {
        "id": "cheap_bolt", "name": "Cheap Bolt", "effect": "target_attack",
        "valid_targets": ["hostile"],
        "min_damage": 4, "max_damage": 4, "min_range": 5, "max_range": 5,
        "base_energy_cost": 10, "energy_increment": -1.0, "final_energy_cost": 2,
        "energy_source": "MANA", "difficulty": 5, "max_level": 10
    },
    {
        "id": "mend", "name": "Mend", "effect": "heal",
        "valid_targets": ["self", "ally"], "affected_body_parts": ["TORSO", "HEAD"],
        "min_damage": 8, "max_damage": 8,
        "base_energy_cost": 10, "energy_source": "MANA", "max_level": 5
    },
    {
        "id": "blink", "name": "Blink", "effect": "teleport_random",
        "valid_targets": ["none"],
        "min_aoe": 2, "max_aoe": 2, "min_range": 6, "max_range": 6,
        "base_energy_cost": 30, "energy_source": "STAMINA", "max_level": 5
    },
    {
        "id": "call_wolves", "name": "Call Wolves", "effect": "summon", "effect_str": "mon_wolf",
        "valid_targets": ["ground"],
        "min_damage": 2, "max_damage": 2, "min_aoe": 1, "max_aoe": 1,
        "min_range": 5, "max_range": 5, "min_duration": 6000, "max_duration": 6000,
        "base_energy_cost": 20, "energy_source": "MANA", "max_level": 5
    },
    {
        "id": "gate_walk", "name": "Gate Walk", "effect": "translocate",
        "valid_targets": ["self"], "energy_source": "NONE", "max_level": 5
    },
    {
        "id": "earthshape", "name": "Earthshape", "effect": "move_earth",
        "valid_targets": ["ground"], "min_range": 3, "max_range": 3,
        "base_energy_cost": 5, "energy_source": "MANA", "max_level": 5
    },
    {
        "id": "druid_thorns", "name": "Thorns", "effect": "target_attack",
        "valid_targets": ["hostile"], "spell_class": "DRUID",
        "min_damage": 3, "max_damage": 3, "min_range": 4, "max_range": 4,
        "base_energy_cost": 15, "energy_source": "MANA", "max_level": 5
    },
    {
        "id": "druid_bark", "name": "Bark Skin", "effect": "none",
        "valid_targets": ["self"], "spell_class": "DRUID",
        "base_energy_cost": 15, "energy_source": "MANA", "max_level": 5
    },
    {
        "id": "second_wind", "name": "Second Wind", "effect": "recover_energy", "effect_str": "STAMINA",
        "valid_targets": ["self", "ally"],
        "min_damage": 40, "max_damage": 40,
        "base_energy_cost": 20, "energy_source": "FATIGUE", "max_level": 5
    },
    {
        "id": "shatter", "name": "Shatter", "effect": "cone_attack",
        "valid_targets": ["hostile", "ground"],
        "min_damage": 6, "max_damage": 6, "min_aoe": 60, "max_aoe": 60,
        "min_range": 3, "max_range": 3, "damage_type": "bash",
        "base_energy_cost": 10, "energy_source": "MANA", "max_level": 5
    },
    {
        "id": "lance", "name": "Lance", "effect": "line_attack",
        "valid_targets": ["hostile", "ground"], "flags": ["SILENT"],
        "min_damage": 5, "max_damage": 5, "min_range": 6, "max_range": 6,
        "min_pierce": 2, "max_pierce": 2, "damage_type": "electric",
        "base_energy_cost": 10, "energy_source": "MANA", "max_level": 5
    },
    {
        "id": "conjure_blade", "name": "Conjure Blade", "effect": "spawn_item", "effect_str": "magic_blade",
        "valid_targets": ["self"], "flags": ["PERMANENT"],
        "min_damage": 1, "max_damage": 1, "min_duration": 30000, "max_duration": 30000,
        "base_energy_cost": 10, "energy_source": "MANA", "max_level": 1
    },
    {
        "id": "pain_split", "name": "Pain Split", "effect": "pain_split",
        "valid_targets": ["self"], "energy_source": "NONE", "max_level": 3
    },
    {
        "id": "blood_price", "name": "Blood Price", "effect": "none",
        "valid_targets": ["self"], "base_energy_cost": 15, "energy_source": "HP", "max_level": 3
    }
]"#;

pub fn catalog() -> SpellCatalog {
    let mut catalog = SpellCatalog::new();
    let report = catalog
        .load_json_str(TEST_SPELLS, "test")
        .expect("test spells parse");
    assert!(report.errors.is_empty(), "test spells rejected: {:?}", report.errors);
    catalog
}

pub fn id(s: &str) -> SpellId {
    SpellId::from(s)
}

/// Everything an effect needs besides the caster
pub struct Harness {
    pub world: FakeWorld,
    pub selector: ScriptedSelector,
    pub gates: TeleporterList,
    pub rng: GameRng,
}

impl Harness {
    pub fn new(world: FakeWorld) -> Self {
        Self {
            world,
            selector: ScriptedSelector::new(),
            gates: TeleporterList::new(),
            rng: GameRng::new(42),
        }
    }

    pub fn ctx(&mut self) -> EffectContext<'_> {
        EffectContext {
            world: &mut self.world,
            selector: &mut self.selector,
            gates: &mut self.gates,
            rng: &mut self.rng,
        }
    }
}
