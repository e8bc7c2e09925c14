use std::collections::BTreeMap;

use log::debug;
use rusqlite::{OptionalExtension, params};

use crate::error::{Result, TodoError};
use crate::store::db::Database;
use crate::task_id::TaskId;

/// Label -> task id mapping written after each listing.
///
/// Global rather than per owner. Writes merge: a label present in the new
/// mapping overwrites its old value, other labels keep theirs.
pub struct ListingStore<'db> {
    db: &'db Database,
}

impl<'db> ListingStore<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    pub fn replace(&self, mapping: &BTreeMap<String, TaskId>) -> Result<()> {
        self.db.write(|tx| {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO listing (label, task_id) VALUES (?1, ?2)")?;
            for (label, id) in mapping {
                stmt.execute(params![label, id])?;
            }
            Ok(())
        })?;
        debug!("event=listing_replace labels={}", mapping.len());
        Ok(())
    }

    pub fn resolve(&self, label: &str) -> Result<TaskId> {
        self.db
            .read(|tx| {
                let id = tx
                    .query_row(
                        "SELECT task_id FROM listing WHERE label = ?1",
                        params![label],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(id)
            })?
            .ok_or_else(|| TodoError::LabelNotFound(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> TaskId {
        format!("0192a1b2c3d4{n:08x}").parse().unwrap()
    }

    fn mapping(pairs: &[(&str, u32)]) -> BTreeMap<String, TaskId> {
        pairs
            .iter()
            .map(|(label, n)| (label.to_string(), id(*n)))
            .collect()
    }

    #[test]
    fn resolves_stored_labels() {
        let db = Database::open_memory().unwrap();
        let listing = ListingStore::new(&db);
        listing.replace(&mapping(&[("1", 1), ("2", 3)])).unwrap();

        assert_eq!(listing.resolve("1").unwrap(), id(1));
        assert_eq!(listing.resolve("2").unwrap(), id(3));
        let err = listing.resolve("3").unwrap_err();
        assert!(matches!(err, TodoError::LabelNotFound(ref l) if l == "3"));
    }

    #[test]
    fn replace_merges_by_label() {
        let db = Database::open_memory().unwrap();
        let listing = ListingStore::new(&db);
        listing
            .replace(&mapping(&[("1", 1), ("2", 2), ("3", 3)]))
            .unwrap();
        listing.replace(&mapping(&[("1", 9)])).unwrap();

        assert_eq!(listing.resolve("1").unwrap(), id(9));
        assert_eq!(listing.resolve("2").unwrap(), id(2));
        assert_eq!(listing.resolve("3").unwrap(), id(3));
    }

    #[test]
    fn empty_replace_is_a_no_op() {
        let db = Database::open_memory().unwrap();
        let listing = ListingStore::new(&db);
        listing.replace(&BTreeMap::new()).unwrap();
        assert!(listing.resolve("1").is_err());
    }
}
