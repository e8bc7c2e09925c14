use std::path::Path;

use crate::error::Result;
use crate::model::DEFAULT_OWNER;
use crate::output::{self, Format};
use crate::store::repo::Repo;

fn set_done(db_path: &Path, reference: &str, done: bool, format: Format) -> Result<()> {
    let repo = Repo::open(db_path)?;
    let id = repo.resolve_task_ref(reference)?;
    let task = repo.tasks().set_done(DEFAULT_OWNER, &id, done)?;
    output::print_task(&task, format)
}

pub fn done(db_path: &Path, reference: &str, format: Format) -> Result<()> {
    set_done(db_path, reference, true, format)
}

pub fn undo(db_path: &Path, reference: &str, format: Format) -> Result<()> {
    set_done(db_path, reference, false, format)
}
