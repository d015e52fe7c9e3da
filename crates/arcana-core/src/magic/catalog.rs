//! The spell catalog
//!
//! Owns every [`SpellType`] by id. Built once at startup from JSON records,
//! read-only afterwards except for an explicit full reload. Templates are
//! handed out as `Arc`s so spell instances can hold on to them; after a
//! reload, callers rebind their instances with
//! [`KnownMagic::rebind`](super::KnownMagic::rebind).

use std::path::Path;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::MAX_SPELL_LEVEL;

use super::spell_type::{CatalogError, ClassId, SpellId, SpellRecord, SpellType};

/// Cross-reference problem found after loading
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsistencyIssue {
    #[error("spell has an empty id (from {src})")]
    EmptyId { src: String },

    #[error("spell {id}: min {axis} ({min}) is greater than max {axis} ({max})")]
    InvertedAxis {
        id: SpellId,
        axis: &'static str,
        min: i32,
        max: i32,
    },

    #[error("spell {id}: negative max level {max_level}")]
    NegativeMaxLevel { id: SpellId, max_level: i32 },

    #[error("spell {id}: max level {max_level} is above the cap of {cap}")]
    MaxLevelTooHigh { id: SpellId, max_level: i32, cap: i32 },

    #[error("spell {id}: {axis} increment {increment} moves away from final value {bound}")]
    IncrementMismatch {
        id: SpellId,
        axis: &'static str,
        increment: f32,
        bound: i32,
    },

    #[error("spell {id}: unknown spell class {class}")]
    UnknownClass { id: SpellId, class: ClassId },
}

impl ConsistencyIssue {
    fn spell_id(&self) -> Option<&SpellId> {
        match self {
            ConsistencyIssue::EmptyId { .. } => None,
            ConsistencyIssue::InvertedAxis { id, .. }
            | ConsistencyIssue::NegativeMaxLevel { id, .. }
            | ConsistencyIssue::MaxLevelTooHigh { id, .. }
            | ConsistencyIssue::IncrementMismatch { id, .. }
            | ConsistencyIssue::UnknownClass { id, .. } => Some(id),
        }
    }
}

/// Outcome of loading a batch of records
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Ids inserted or overwritten, in record order
    pub loaded: Vec<SpellId>,
    /// Records that were skipped
    pub errors: Vec<CatalogError>,
}

/// Registry of spell templates keyed by id
#[derive(Debug, Clone, Default)]
pub struct SpellCatalog {
    spells: HashMap<SpellId, Arc<SpellType>>,
    /// Entries that failed the consistency check
    flagged: HashSet<SpellId>,
}

impl SpellCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// Parse one record and insert it, overwriting any entry with the same id
    pub fn load(&mut self, record: &Value, src: &str) -> Result<SpellId, CatalogError> {
        let record: SpellRecord =
            serde_json::from_value(record.clone()).map_err(|source| CatalogError::Parse {
                src: src.to_string(),
                source,
            })?;
        let spell = SpellType::from_record(record, src)?;
        Ok(self.insert(spell))
    }

    /// Insert an already-built template
    pub fn insert(&mut self, spell: SpellType) -> SpellId {
        let id = spell.id.clone();
        self.flagged.remove(&id);
        if self.spells.insert(id.clone(), Arc::new(spell)).is_some() {
            debug!(spell = %id, "spell definition overwritten");
        }
        id
    }

    /// Load one record or an array of records from JSON text
    pub fn load_json_str(&mut self, text: &str, src: &str) -> Result<LoadReport, CatalogError> {
        let value: Value = serde_json::from_str(text).map_err(|source| CatalogError::Parse {
            src: src.to_string(),
            source,
        })?;
        let records = match value {
            Value::Array(records) => records,
            single => vec![single],
        };

        let mut report = LoadReport::default();
        for record in &records {
            match self.load(record, src) {
                Ok(id) => report.loaded.push(id),
                Err(e) => {
                    warn!(src, error = %e, "skipping spell record");
                    report.errors.push(e);
                }
            }
        }
        info!(
            src,
            loaded = report.loaded.len(),
            skipped = report.errors.len(),
            "loaded spell definitions"
        );
        Ok(report)
    }

    /// Load records from a JSON file
    pub fn load_file(&mut self, path: &Path) -> Result<LoadReport, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.load_json_str(&text, &path.display().to_string())
    }

    pub fn get(&self, id: &SpellId) -> Option<&Arc<SpellType>> {
        self.spells.get(id)
    }

    pub fn contains(&self, id: &SpellId) -> bool {
        self.spells.contains_key(id)
    }

    /// Present and not flagged by the consistency check
    pub fn is_usable(&self, id: &SpellId) -> bool {
        self.contains(id) && !self.flagged.contains(id)
    }

    pub fn is_flagged(&self, id: &SpellId) -> bool {
        self.flagged.contains(id)
    }

    /// Every template, sorted by id
    pub fn get_all(&self) -> Vec<&Arc<SpellType>> {
        let mut all: Vec<_> = self.spells.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Ids of every spell restricted to `class`, sorted
    pub fn spells_of_class(&self, class: &ClassId) -> Vec<SpellId> {
        let mut ids: Vec<_> = self
            .spells
            .values()
            .filter(|s| s.spell_class.as_ref() == Some(class))
            .map(|s| s.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Walk every entry looking for malformed values and dangling class references.
    ///
    /// Offending entries stay in the catalog but are flagged invalid; nothing
    /// here is fatal.
    pub fn check_consistency(&mut self, known_classes: &[ClassId]) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        for spell in self.get_all() {
            check_spell(spell, known_classes, &mut issues);
        }

        self.flagged.clear();
        for issue in &issues {
            warn!("{}", issue);
            if let Some(id) = issue.spell_id() {
                self.flagged.insert(id.clone());
            }
        }
        issues
    }

    /// Drop every definition, ahead of a data reload
    pub fn reset_all(&mut self) {
        self.spells.clear();
        self.flagged.clear();
    }

    /// Replace the whole catalog with the records in `text`
    pub fn reload_json_str(&mut self, text: &str, src: &str) -> Result<LoadReport, CatalogError> {
        self.reset_all();
        self.load_json_str(text, src)
    }
}

fn check_spell(spell: &SpellType, known_classes: &[ClassId], issues: &mut Vec<ConsistencyIssue>) {
    if spell.id.is_empty() {
        issues.push(ConsistencyIssue::EmptyId { src: spell.src.clone() });
        return;
    }
    let id = &spell.id;

    // damage may be negative for healing spells, compare magnitudes
    let axes = [
        ("damage", spell.damage.start.abs(), spell.damage.bound.abs()),
        ("range", spell.range.start, spell.range.bound),
        ("aoe", spell.aoe.start, spell.aoe.bound),
        ("dot", spell.dot.start, spell.dot.bound),
        ("duration", spell.duration.start, spell.duration.bound),
        ("pierce", spell.pierce.start, spell.pierce.bound),
    ];
    for (axis, min, max) in axes {
        if min > max {
            issues.push(ConsistencyIssue::InvertedAxis { id: id.clone(), axis, min, max });
        }
    }

    if spell.max_level < 0 {
        issues.push(ConsistencyIssue::NegativeMaxLevel {
            id: id.clone(),
            max_level: spell.max_level,
        });
    } else if spell.max_level > MAX_SPELL_LEVEL {
        issues.push(ConsistencyIssue::MaxLevelTooHigh {
            id: id.clone(),
            max_level: spell.max_level,
            cap: MAX_SPELL_LEVEL,
        });
    }

    for (axis, model) in [
        ("energy cost", spell.energy_cost),
        ("casting time", spell.casting_time),
    ] {
        if !model.is_consistent() {
            issues.push(ConsistencyIssue::IncrementMismatch {
                id: id.clone(),
                axis,
                increment: model.increment,
                bound: model.bound,
            });
        }
    }

    if let Some(class) = &spell.spell_class
        && !known_classes.contains(class)
    {
        issues.push(ConsistencyIssue::UnknownClass { id: id.clone(), class: class.clone() });
    }
}
