use thiserror::Error;

use crate::task_id::{TaskId, TaskIdGenerationError};

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("no task is listed under label '{0}' (run `todo list` first)")]
    LabelNotFound(String),

    #[error("task {0} already exists")]
    DuplicateTask(TaskId),

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("corrupt record for task {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("index corrupt: {0}")]
    IndexCorrupt(String),

    #[error("locked by another process: {0}")]
    Locked(String),

    #[error("invalid date '{0}' (expected today, tomorrow, yesterday or YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid task reference '{0}': {1}")]
    InvalidTaskRef(String, String),

    #[error(transparent)]
    IdGeneration(#[from] TaskIdGenerationError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl TodoError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TaskNotFound(_) => "task_not_found",
            Self::LabelNotFound(_) => "label_not_found",
            Self::DuplicateTask(_) => "duplicate_task",
            Self::InvalidTask(_) => "invalid_task",
            Self::CorruptRecord { .. } => "corrupt_record",
            Self::IndexCorrupt(_) => "index_corrupt",
            Self::Locked(_) => "locked",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidTaskRef(_, _) => "invalid_task_ref",
            Self::IdGeneration(_) => "id_generation",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Db(_) => "db_error",
        }
    }

    /// True for the referenced-thing-is-absent family.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TaskNotFound(_) | Self::LabelNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_snake_case() {
        let id: TaskId = "0000000000010000abcd".parse().unwrap();
        assert_eq!(TodoError::TaskNotFound(id).code(), "task_not_found");
        assert_eq!(TodoError::LabelNotFound("3".into()).code(), "label_not_found");
        assert_eq!(
            TodoError::IndexCorrupt("missing bucket".into()).code(),
            "index_corrupt"
        );
    }

    #[test]
    fn not_found_family() {
        assert!(TodoError::LabelNotFound("1".into()).is_not_found());
        assert!(!TodoError::Locked("x".into()).is_not_found());
    }
}
