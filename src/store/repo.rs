use std::path::Path;

use crate::error::{Result, TodoError};
use crate::store::db::Database;
use crate::store::listing::ListingStore;
use crate::store::tasks::TaskStore;
use crate::task_id::TaskId;

/// Scoped handle on an open store. Dropping it releases the database and its lock.
pub struct Repo {
    db: Database,
}

impl Repo {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    pub fn open_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_memory()?,
        })
    }

    pub fn tasks(&self) -> TaskStore<'_> {
        TaskStore::new(&self.db)
    }

    pub fn listing(&self) -> ListingStore<'_> {
        ListingStore::new(&self.db)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Resolve a user-supplied task reference to a task id.
    ///
    /// Resolution strategy:
    /// 1) a short all-digit input is a label from the latest listing,
    /// 2) a full-length hex input is a task id; an all-digit one is tried as a
    ///    label first,
    /// 3) anything else is rejected.
    pub fn resolve_task_ref(&self, input: &str) -> Result<TaskId> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(TodoError::InvalidTaskRef(
                input.to_string(),
                "reference cannot be empty".into(),
            ));
        }

        let is_digits = raw.bytes().all(|b| b.is_ascii_digit());
        if is_digits && raw.len() != TaskId::HEX_LEN {
            return self.listing().resolve(raw);
        }
        if is_digits {
            match self.listing().resolve(raw) {
                Err(TodoError::LabelNotFound(_)) => {}
                other => return other,
            }
        }

        raw.parse::<TaskId>().map_err(|e| {
            TodoError::InvalidTaskRef(
                raw.to_string(),
                format!("expected a list label or a task id ({e})"),
            )
        })
    }
}
