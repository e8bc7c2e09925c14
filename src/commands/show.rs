use std::path::Path;

use crate::error::Result;
use crate::model::DEFAULT_OWNER;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(db_path: &Path, reference: &str, format: Format) -> Result<()> {
    let repo = Repo::open(db_path)?;
    let id = repo.resolve_task_ref(reference)?;
    let task = repo.tasks().get(DEFAULT_OWNER, &id)?;
    output::print_task(&task, format)
}
