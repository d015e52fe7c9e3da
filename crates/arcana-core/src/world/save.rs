//! Save and restore of spellcasting state
//!
//! The surrounding game owns the save file; this module only turns the
//! spellbook and gate registry into JSON values and back. Corrupt data
//! resets the affected subsystem instead of failing the whole load.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Save/restore errors
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted {section} data: {reason}")]
    Corrupted { section: &'static str, reason: String },
}

/// Serialize a value to a JSON string
pub fn to_json<T: Serialize>(value: &T) -> Result<String, SaveError> {
    Ok(serde_json::to_string(value)?)
}

/// Deserialize a value from a JSON string
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SaveError> {
    Ok(serde_json::from_str(json)?)
}

/// Write a value as pretty JSON to a file
pub fn save_to_file<T: Serialize>(value: &T, path: &Path) -> Result<(), SaveError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Read a value from a JSON file
pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T, SaveError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Decode one subsystem of a save
pub fn restore_section<T: DeserializeOwned>(
    section: &'static str,
    value: serde_json::Value,
) -> Result<T, SaveError> {
    serde_json::from_value(value).map_err(|e| SaveError::Corrupted {
        section,
        reason: e.to_string(),
    })
}

/// Decode one subsystem of a save, falling back to its default on corrupt data
pub fn restore_or_default<T: DeserializeOwned + Default>(
    section: &'static str,
    value: serde_json::Value,
) -> T {
    restore_section(section, value).unwrap_or_else(|e| {
        warn!(error = %e, "resetting to defaults");
        T::default()
    })
}
