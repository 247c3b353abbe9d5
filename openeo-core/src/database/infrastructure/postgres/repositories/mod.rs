//! PostgreSQL-backed repository implementations.

pub mod jobs;
pub mod process_graphs;
pub mod udps;
pub mod users;

use serde_json::Value;
use sqlx::error::ErrorKind;

use crate::error::CoreError;

/// Maps a failed write to the core error taxonomy.
///
/// Key collisions become `Conflict`, dangling references become a
/// validation failure, everything else is internal.
pub(crate) fn write_error(what: &str, err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.kind() {
            ErrorKind::UniqueViolation => {
                return CoreError::conflict(format!("{what} already exists"));
            }
            ErrorKind::ForeignKeyViolation => {
                return CoreError::validation(format!(
                    "{what} references a record that does not exist"
                ));
            }
            _ => {}
        }
    }
    CoreError::internal(format!("Failed to write {what}: {err}"))
}

pub(crate) fn read_error(what: &str, err: sqlx::Error) -> CoreError {
    CoreError::internal(format!("Failed to read {what}: {err}"))
}

// JSON documents are stored in `json` columns (not `jsonb`) and exchanged
// as text so that key order survives the round trip.
pub(crate) fn encode_json(value: &Value) -> Result<String, CoreError> {
    serde_json::to_string(value)
        .map_err(|e| CoreError::internal(format!("Failed to encode document: {e}")))
}

pub(crate) fn decode_json(column: &str, text: &str) -> Result<Value, CoreError> {
    serde_json::from_str(text).map_err(|e| {
        CoreError::internal(format!("Failed to decode {column} document: {e}"))
    })
}
