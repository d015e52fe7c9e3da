//! Per-caster spellbook and mana pool
//!
//! [`KnownMagic`] is owned by exactly one caster: the learned spells, their
//! quick-access letters and the mana reserve.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::consts::{DEFAULT_MANA_BASE, FATIGUE_EXHAUSTED, LEARN_BASE_MOVES, MANA_FULL_REPLENISH_TURNS};
use crate::player::{BodyPart, Caster};

use super::catalog::SpellCatalog;
use super::spell::Spell;
use super::spell_type::{ClassId, EnergyType, SpellId};

/// Quick-access letters, in the order they are handed out
pub fn invlet_candidates() -> impl Iterator<Item = char> {
    ('a'..='z').chain('A'..='Z').chain('!'..='-')
}

/// Outcome of a learn attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnResult {
    Learned,
    AlreadyKnown,
    /// Class-restricted and the caster lacks the class
    NotAllowed,
    /// Not in the catalog, or flagged invalid
    UnknownSpell,
}

/// Saved form of one learned spell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSave {
    pub id: SpellId,
    pub experience: i32,
}

/// Saved form of one quick-access binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvletSave {
    pub id: SpellId,
    pub slot: char,
}

/// Saved form of a caster's magic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownMagicSave {
    pub spellbook: Vec<SpellSave>,
    pub invlets: Vec<InvletSave>,
    pub mana_base: i32,
    pub mana: i32,
}

impl Default for KnownMagicSave {
    fn default() -> Self {
        KnownMagic::new().to_save()
    }
}

/// A caster's spellbook and mana
#[derive(Debug, Clone)]
pub struct KnownMagic {
    spellbook: BTreeMap<SpellId, Spell>,
    invlets: BTreeMap<SpellId, char>,
    mana_base: i32,
    mana: i32,
    /// Distractions cannot interrupt the current cast
    pub casting_ignore: bool,
}

impl Default for KnownMagic {
    fn default() -> Self {
        Self::new()
    }
}

impl KnownMagic {
    pub fn new() -> Self {
        Self {
            spellbook: BTreeMap::new(),
            invlets: BTreeMap::new(),
            mana_base: DEFAULT_MANA_BASE,
            mana: DEFAULT_MANA_BASE,
            casting_ignore: false,
        }
    }

    // ========================================================================
    // Spellbook
    // ========================================================================

    /// Learn a spell at level 0
    pub fn learn_spell(
        &mut self,
        catalog: &SpellCatalog,
        id: &SpellId,
        caster: &dyn Caster,
        force: bool,
    ) -> LearnResult {
        self.learn_spell_at_level(catalog, id, caster, 0, force)
    }

    /// Learn a spell with enough experience for `level`.
    ///
    /// Already-known spells are left untouched. Without `force`, a
    /// class-restricted spell requires the caster to have the class.
    pub fn learn_spell_at_level(
        &mut self,
        catalog: &SpellCatalog,
        id: &SpellId,
        caster: &dyn Caster,
        level: i32,
        force: bool,
    ) -> LearnResult {
        let Some(template) = catalog.get(id).filter(|_| catalog.is_usable(id)) else {
            warn!(spell = %id, "tried to learn an unknown or invalid spell");
            return LearnResult::UnknownSpell;
        };
        if self.knows_spell(id) {
            return LearnResult::AlreadyKnown;
        }

        let spell = Spell::with_experience(template.clone(), Spell::exp_for_level(level));
        if !force && !spell.can_learn(caster) {
            return LearnResult::NotAllowed;
        }
        debug!(spell = %id, level = spell.level(), "spell learned");
        self.spellbook.insert(id.clone(), spell);
        LearnResult::Learned
    }

    /// Remove a spell and free its quick-access letter
    pub fn forget_spell(&mut self, id: &SpellId) -> bool {
        if self.spellbook.remove(id).is_none() {
            warn!(spell = %id, "tried to forget a spell that is not known");
            return false;
        }
        self.invlets.remove(id);
        debug!(spell = %id, "spell forgotten");
        true
    }

    pub fn knows_spell(&self, id: &SpellId) -> bool {
        self.spellbook.contains_key(id)
    }

    /// Ids of every known spell, sorted
    pub fn spells(&self) -> Vec<SpellId> {
        self.spellbook.keys().cloned().collect()
    }

    pub fn get_spell(&self, id: &SpellId) -> Option<&Spell> {
        self.spellbook.get(id)
    }

    pub fn get_spell_mut(&mut self, id: &SpellId) -> Option<&mut Spell> {
        self.spellbook.get_mut(id)
    }

    pub fn get_spells(&self) -> Vec<&Spell> {
        self.spellbook.values().collect()
    }

    /// Known to the catalog and not blocked by a conflicting class
    pub fn can_learn_spell(&self, catalog: &SpellCatalog, id: &SpellId, caster: &dyn Caster) -> bool {
        let Some(template) = catalog.get(id) else {
            return false;
        };
        match &template.spell_class {
            Some(class) => !caster.has_conflicting_class(class),
            None => true,
        }
    }

    /// Moves needed to study a spell, `None` if the spell does not exist
    pub fn time_to_learn_spell(
        &self,
        catalog: &SpellCatalog,
        id: &SpellId,
        caster: &dyn Caster,
    ) -> Option<i32> {
        let template = catalog.get(id)?;
        let int_factor = (1.0 + (caster.intelligence() as f32 - 8.0) / 8.0).max(0.125);
        let factor =
            1.0 + template.difficulty as f32 / int_factor + caster.spellcraft() as f32 / 10.0;
        Some((LEARN_BASE_MOVES as f32 * factor) as i32)
    }

    /// A trait granting `class` was gained: learn every spell of that class
    pub fn on_mutation_gain(
        &mut self,
        catalog: &SpellCatalog,
        class: &ClassId,
        caster: &dyn Caster,
    ) -> Vec<SpellId> {
        catalog
            .spells_of_class(class)
            .into_iter()
            .filter(|id| self.learn_spell(catalog, id, caster, true) == LearnResult::Learned)
            .collect()
    }

    /// A trait granting `class` was lost: forget every spell of that class
    pub fn on_mutation_loss(&mut self, catalog: &SpellCatalog, class: &ClassId) -> Vec<SpellId> {
        catalog
            .spells_of_class(class)
            .into_iter()
            .filter(|id| self.knows_spell(id) && self.forget_spell(id))
            .collect()
    }

    /// Point every instance at the current catalog entry, dropping spells
    /// that no longer exist. Returns the dropped ids.
    pub fn rebind(&mut self, catalog: &SpellCatalog) -> Vec<SpellId> {
        let mut dropped = Vec::new();
        for (id, spell) in self.spellbook.iter_mut() {
            match catalog.get(id) {
                Some(template) => spell.set_template(template.clone()),
                None => dropped.push(id.clone()),
            }
        }
        for id in &dropped {
            warn!(spell = %id, "known spell no longer exists, dropping it");
            self.spellbook.remove(id);
            self.invlets.remove(id);
        }
        dropped
    }

    // ========================================================================
    // Quick-access letters
    // ========================================================================

    /// Letter for `id`: its current binding, or the lowest letter not bound
    /// elsewhere and not in `used`. Does not store the choice.
    pub fn get_invlet(&self, id: &SpellId, used: &BTreeSet<char>) -> Option<char> {
        if let Some(c) = self.invlets.get(id) {
            return Some(*c);
        }
        let bound: BTreeSet<char> = self.invlets.values().copied().collect();
        invlet_candidates().find(|c| !used.contains(c) && !bound.contains(c))
    }

    /// Like [`get_invlet`](Self::get_invlet), but stores the choice
    pub fn assign_invlet(&mut self, id: &SpellId, used: &BTreeSet<char>) -> Option<char> {
        if !self.knows_spell(id) {
            return None;
        }
        let c = self.get_invlet(id, used)?;
        self.invlets.insert(id.clone(), c);
        Some(c)
    }

    /// Bind `slot` to `id`, unbinding whichever spell held it
    pub fn set_invlet(&mut self, id: &SpellId, slot: char) -> bool {
        if !self.knows_spell(id) {
            return false;
        }
        self.invlets.retain(|_, c| *c != slot);
        self.invlets.insert(id.clone(), slot);
        true
    }

    pub fn clear_invlet(&mut self, id: &SpellId) {
        self.invlets.remove(id);
    }

    pub fn invlet_of(&self, id: &SpellId) -> Option<char> {
        self.invlets.get(id).copied()
    }

    // ========================================================================
    // Mana
    // ========================================================================

    pub fn available_mana(&self) -> i32 {
        self.mana
    }

    pub fn mana_base(&self) -> i32 {
        self.mana_base
    }

    pub fn set_mana_base(&mut self, base: i32) {
        self.mana_base = base.max(0);
    }

    /// Capacity of the pool for this caster
    pub fn max_mana(&self, caster: &dyn Caster) -> i32 {
        let base = self.mana_base as f32;
        let int_bonus = (0.2 + 0.1 * caster.intelligence() as f32) - 1.0;
        let unaugmented = (base + int_bonus * base) * caster.mana_multiplier();
        let max = unaugmented as i32 + caster.mana_modifier() - caster.power_level();
        max.max(0)
    }

    /// Add (or drain) mana, clamped to `[0, max_mana]`
    pub fn mod_mana(&mut self, caster: &dyn Caster, delta: i32) {
        self.set_mana(caster, self.mana.saturating_add(delta));
    }

    pub fn set_mana(&mut self, caster: &dyn Caster, value: i32) {
        self.mana = value.clamp(0, self.max_mana(caster));
    }

    /// Regenerate mana over `turns` elapsed turns; a full pool refills in eight hours
    pub fn update_mana(&mut self, caster: &dyn Caster, turns: f32) {
        let max = self.max_mana(caster);
        if self.mana >= max {
            return;
        }
        let gain = (turns / MANA_FULL_REPLENISH_TURNS * max as f32 * caster.mana_regen_multiplier())
            .floor() as i32;
        if gain > 0 {
            self.mana = self.mana.saturating_add(gain).min(max);
        }
    }

    /// Whether the caster can pay `spell`'s cost from the right reserve
    pub fn has_enough_energy(&self, caster: &dyn Caster, spell: &Spell) -> bool {
        let cost = spell.energy_cost(caster);
        match spell.energy_source() {
            EnergyType::Mana => self.available_mana() >= cost,
            EnergyType::Bionic => caster.power_level() >= cost,
            EnergyType::Stamina => caster.stamina() >= cost,
            EnergyType::Hp => BodyPart::HIT_POINT_PARTS.iter().any(|bp| caster.hp(*bp) > cost),
            EnergyType::Fatigue => caster.fatigue() < FATIGUE_EXHAUSTED,
            EnergyType::None => true,
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn to_save(&self) -> KnownMagicSave {
        KnownMagicSave {
            spellbook: self
                .spellbook
                .values()
                .map(|s| SpellSave {
                    id: s.id().clone(),
                    experience: s.experience(),
                })
                .collect(),
            invlets: self
                .invlets
                .iter()
                .map(|(id, slot)| InvletSave {
                    id: id.clone(),
                    slot: *slot,
                })
                .collect(),
            mana_base: self.mana_base,
            mana: self.mana,
        }
    }

    /// Rebuild from saved data. Spells missing from the catalog and letters
    /// pointing at them are dropped; duplicate letters keep the first binding.
    pub fn from_save(save: &KnownMagicSave, catalog: &SpellCatalog) -> Self {
        let mut magic = KnownMagic {
            mana_base: save.mana_base.max(0),
            mana: save.mana.max(0),
            ..KnownMagic::new()
        };
        for entry in &save.spellbook {
            match catalog.get(&entry.id) {
                Some(template) => {
                    magic.spellbook.insert(
                        entry.id.clone(),
                        Spell::with_experience(template.clone(), entry.experience),
                    );
                }
                None => warn!(spell = %entry.id, "saved spell does not exist, dropping it"),
            }
        }
        for entry in &save.invlets {
            let taken = magic.invlets.values().any(|c| *c == entry.slot);
            if magic.knows_spell(&entry.id) && !taken {
                magic.invlets.insert(entry.id.clone(), entry.slot);
            } else {
                warn!(spell = %entry.id, slot = %entry.slot, "dropping saved spell letter");
            }
        }
        magic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invlet_order() {
        let letters: Vec<char> = invlet_candidates().collect();
        assert_eq!(letters[0], 'a');
        assert_eq!(letters[25], 'z');
        assert_eq!(letters[26], 'A');
        assert_eq!(letters[52], '!');
        assert_eq!(*letters.last().unwrap(), '-');
    }

    #[test]
    fn test_new_pool_starts_full_base() {
        let magic = KnownMagic::new();
        assert_eq!(magic.mana_base(), DEFAULT_MANA_BASE);
        assert_eq!(magic.available_mana(), DEFAULT_MANA_BASE);
        assert!(magic.spells().is_empty());
    }

    #[test]
    fn test_default_save_is_empty_pool() {
        let save = KnownMagicSave::default();
        assert!(save.spellbook.is_empty());
        assert!(save.invlets.is_empty());
        assert_eq!(save.mana, DEFAULT_MANA_BASE);
    }
}
