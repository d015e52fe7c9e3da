//! arcana-data: Built-in spell definitions
//!
//! The stock spell set ships as JSON compiled into the binary, so a catalog
//! can be built without touching the filesystem.

use arcana_core::magic::{CatalogError, ClassId, LoadReport, SpellCatalog};

/// Raw JSON of the built-in spells
pub const SPELLS_JSON: &str = include_str!("../data/spells.json");

/// Source tag recorded on every built-in template
pub const BUILTIN_SOURCE: &str = "builtin";

/// Spell classes the built-in set refers to
pub const KNOWN_CLASSES: &[&str] = &["MAGUS", "DRUID", "KELVINIST", "STORMSHAPER", "BIOMANCER"];

/// Known classes as ids, for [`SpellCatalog::check_consistency`]
pub fn known_classes() -> Vec<ClassId> {
    KNOWN_CLASSES.iter().map(|c| ClassId::from(*c)).collect()
}

/// Add the built-in spells to `catalog`, overwriting entries with the same id
pub fn load_builtin(catalog: &mut SpellCatalog) -> Result<LoadReport, CatalogError> {
    catalog.load_json_str(SPELLS_JSON, BUILTIN_SOURCE)
}

/// A fresh catalog holding only the built-in spells
pub fn builtin_catalog() -> Result<SpellCatalog, CatalogError> {
    let mut catalog = SpellCatalog::new();
    load_builtin(&mut catalog)?;
    Ok(catalog)
}
