use std::path::Path;

use chrono::NaiveDate;

use crate::error::{Result, TodoError};
use crate::input;
use crate::model::{DEFAULT_OWNER, TaskPatch};
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn due(db_path: &Path, reference: &str, due: NaiveDate, format: Format) -> Result<()> {
    let repo = Repo::open(db_path)?;
    let id = repo.resolve_task_ref(reference)?;
    let task = repo.tasks().set_due(DEFAULT_OWNER, &id, due)?;
    output::print_task(&task, format)
}

pub fn tags(db_path: &Path, reference: &str, tags: &[String], format: Format) -> Result<()> {
    let tags = tags.iter().flat_map(|t| input::parse_tags(t)).collect();
    let repo = Repo::open(db_path)?;
    let id = repo.resolve_task_ref(reference)?;
    let task = repo.tasks().set_tags(DEFAULT_OWNER, &id, tags)?;
    output::print_task(&task, format)
}

pub fn effort(db_path: &Path, reference: &str, effort: f64, format: Format) -> Result<()> {
    let repo = Repo::open(db_path)?;
    let id = repo.resolve_task_ref(reference)?;
    let task = repo.tasks().set_effort(DEFAULT_OWNER, &id, effort)?;
    output::print_task(&task, format)
}

/// Rewrite several fields at once. The task is deleted and re-created with
/// the same id, so it moves to the end of every listing it appears in.
pub fn update(db_path: &Path, reference: &str, patch: TaskPatch, format: Format) -> Result<()> {
    if patch.is_empty() {
        return Err(TodoError::InvalidTask("no fields to update".into()));
    }
    let repo = Repo::open(db_path)?;
    let id = repo.resolve_task_ref(reference)?;
    let task = repo.tasks().update(DEFAULT_OWNER, &id, &patch)?;
    output::print_task(&task, format)
}
