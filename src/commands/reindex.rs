use std::path::Path;

use crate::error::Result;
use crate::model::DEFAULT_OWNER;
use crate::store::repo::Repo;

pub fn run(db_path: &Path) -> Result<()> {
    let repo = Repo::open(db_path)?;
    let count = repo.tasks().reindex(DEFAULT_OWNER)?;
    eprintln!("Reindexed {count} tasks");
    Ok(())
}
