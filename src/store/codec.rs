//! On-disk representation of a task record.
//!
//! Records are JSON objects with named fields. Fields added later must carry
//! `#[serde(default)]` so older records keep decoding; unknown fields are
//! ignored. The due date is written as `YYYY-MM-DD`.

use crate::error::{Result, TodoError};
use crate::model::Task;
use crate::task_id::TaskId;

pub fn encode(task: &Task) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(task)?)
}

/// Decode the record stored under `key`.
///
/// Fails with `CorruptRecord` when the bytes are not a well-formed task, or
/// when the id inside the record disagrees with the key it is stored under.
pub fn decode(key: &TaskId, bytes: &[u8]) -> Result<Task> {
    let task: Task = serde_json::from_slice(bytes).map_err(|e| corrupt(key, e.to_string()))?;
    if task.id != *key {
        return Err(corrupt(
            key,
            format!("record carries id {} under key {}", task.id, key),
        ));
    }
    task.validate().map_err(|e| corrupt(key, e.to_string()))?;
    Ok(task)
}

fn corrupt(key: &TaskId, reason: String) -> TodoError {
    TodoError::CorruptRecord {
        id: key.to_string(),
        reason,
    }
}
