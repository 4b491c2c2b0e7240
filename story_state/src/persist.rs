//! Textual persistence of the narrative state.
//!
//! The storage medium belongs to the caller. These functions only turn a
//! [`NarrativeState`] into JSON and back, checking the schema version so a
//! stale save surfaces as an error instead of silently losing data.

use serde_json::Value;
use thiserror::Error;

use crate::world_state::{NarrativeState, SCHEMA_VERSION};

/// Errors from loading a saved state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("malformed state: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: u32, found: u32 },

    #[error("saved state has no schema version")]
    MissingSchemaVersion,
}

/// Serialize the state to JSON.
pub fn serialize(state: &NarrativeState) -> Result<String, PersistError> {
    Ok(serde_json::to_string(state)?)
}

/// Serialize the state to indented JSON.
pub fn serialize_pretty(state: &NarrativeState) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Parse a state produced by [`serialize`].
pub fn deserialize(text: &str) -> Result<NarrativeState, PersistError> {
    let value: Value = serde_json::from_str(text)?;
    let found = value
        .get("schema_version")
        .and_then(Value::as_u64)
        .ok_or(PersistError::MissingSchemaVersion)?;
    if found != u64::from(SCHEMA_VERSION) {
        return Err(PersistError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            found: u32::try_from(found).unwrap_or(u32::MAX),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// Load whatever the caller's storage returned.
///
/// `None` or blank text means there is no state yet and yields `Ok(None)`.
pub fn load_state(stored: Option<&str>) -> Result<Option<NarrativeState>, PersistError> {
    match stored {
        Some(text) if !text.trim().is_empty() => deserialize(text).map(Some),
        _ => Ok(None),
    }
}
