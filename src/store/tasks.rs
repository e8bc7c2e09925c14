use chrono::NaiveDate;
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, TodoError};
use crate::model::{Task, TaskPatch, validate_effort};
use crate::store::codec;
use crate::store::db::Database;
use crate::store::index::{self, IndexIssue};
use crate::task_id::TaskId;

/// Effort written whenever a task's done flag is set, in either direction.
pub const STATUS_CHANGE_EFFORT: f64 = 1.0;

/// Effort a task carries after `set_done`. The previous value is discarded.
pub fn effort_after_status_change(_previous: f64) -> f64 {
    STATUS_CHANGE_EFFORT
}

/// Task records and their indexes, partitioned by owner.
///
/// Every method runs in exactly one transaction: reads in a deferred one,
/// mutations in the immediate (single writer) one. A mutation that fails at
/// any step leaves the store as it was.
pub struct TaskStore<'db> {
    db: &'db Database,
}

impl<'db> TaskStore<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Persist a new task whose id the caller has already assigned.
    pub fn create(&self, owner: &str, task: &Task) -> Result<()> {
        task.validate()?;
        self.db.write(|tx| {
            if read_record(tx, owner, &task.id)?.is_some() {
                return Err(TodoError::DuplicateTask(task.id.clone()));
            }
            insert_record(tx, owner, task)?;
            index::on_create(tx, owner, task)
        })?;
        debug!("event=task_create owner={owner} id={}", task.id);
        Ok(())
    }

    pub fn get(&self, owner: &str, id: &TaskId) -> Result<Task> {
        self.db.read(|tx| load(tx, owner, id))
    }

    /// Undone tasks in the order they entered the pending set.
    pub fn list_pending(&self, owner: &str) -> Result<Vec<Task>> {
        self.db.read(|tx| {
            let ids = index::pending_members(tx, owner)?;
            load_existing(tx, owner, &ids)
        })
    }

    /// Tasks due on `date`, in the order they entered that date's bucket.
    pub fn list_by_date(&self, owner: &str, date: NaiveDate) -> Result<Vec<Task>> {
        self.db.read(|tx| {
            let ids = index::due_members(tx, owner, date)?;
            load_existing(tx, owner, &ids)
        })
    }

    /// Every task of `owner`, in id (creation) order.
    pub fn list_all(&self, owner: &str) -> Result<Vec<Task>> {
        self.db.read(|tx| {
            all_records(tx, owner)?
                .into_iter()
                .map(|(id, bytes)| codec::decode(&id, &bytes))
                .collect()
        })
    }

    /// Mark a task done or pending. Also resets effort, see
    /// [`effort_after_status_change`].
    pub fn set_done(&self, owner: &str, id: &TaskId, done: bool) -> Result<Task> {
        let task = self.db.write(|tx| {
            let mut task = load(tx, owner, id)?;
            task.done = done;
            task.effort = effort_after_status_change(task.effort);
            write_record(tx, owner, &task)?;
            index::on_done_change(tx, owner, id, done)?;
            Ok(task)
        })?;
        debug!("event=task_set_done owner={owner} id={id} done={done}");
        Ok(task)
    }

    pub fn set_due(&self, owner: &str, id: &TaskId, due: NaiveDate) -> Result<Task> {
        let task = self.db.write(|tx| {
            let mut task = load(tx, owner, id)?;
            let old_due = task.due;
            index::on_due_change(tx, owner, id, old_due, due)?;
            task.due = due;
            write_record(tx, owner, &task)?;
            Ok(task)
        })?;
        debug!("event=task_set_due owner={owner} id={id} due={due}");
        Ok(task)
    }

    pub fn set_tags(&self, owner: &str, id: &TaskId, tags: Vec<String>) -> Result<Task> {
        let task = self.db.write(|tx| {
            let mut task = load(tx, owner, id)?;
            task.tags = tags;
            write_record(tx, owner, &task)?;
            Ok(task)
        })?;
        debug!(
            "event=task_set_tags owner={owner} id={id} tags={}",
            task.tags.len()
        );
        Ok(task)
    }

    pub fn set_effort(&self, owner: &str, id: &TaskId, effort: f64) -> Result<Task> {
        validate_effort(effort)?;
        let task = self.db.write(|tx| {
            let mut task = load(tx, owner, id)?;
            task.effort = effort;
            write_record(tx, owner, &task)?;
            Ok(task)
        })?;
        debug!("event=task_set_effort owner={owner} id={id} effort={effort}");
        Ok(task)
    }

    /// Remove a task and every index entry for it. Returns the removed task.
    pub fn delete(&self, owner: &str, id: &TaskId) -> Result<Task> {
        let task = self.db.write(|tx| {
            let task = load(tx, owner, id)?;
            index::on_delete(tx, owner, &task)?;
            delete_record(tx, owner, id)?;
            Ok(task)
        })?;
        debug!("event=task_delete owner={owner} id={id}");
        Ok(task)
    }

    /// Replace several fields at once.
    ///
    /// Implemented as delete followed by re-create of the merged record inside
    /// one transaction, so index membership is re-derived from scratch.
    pub fn update(&self, owner: &str, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        let task = self.db.write(|tx| {
            let old = load(tx, owner, id)?;
            let merged = old.merged(patch);
            merged.validate()?;

            index::on_delete(tx, owner, &old)?;
            delete_record(tx, owner, id)?;

            insert_record(tx, owner, &merged)?;
            index::on_create(tx, owner, &merged)?;
            Ok(merged)
        })?;
        debug!("event=task_update owner={owner} id={id}");
        Ok(task)
    }

    /// Every divergence between records and indexes for `owner`.
    pub fn verify(&self, owner: &str) -> Result<Vec<IndexIssue>> {
        let issues = self.db.read(|tx| {
            let mut tasks = Vec::new();
            let mut issues = Vec::new();
            for (id, bytes) in all_records(tx, owner)? {
                match codec::decode(&id, &bytes) {
                    Ok(task) => tasks.push(task),
                    Err(TodoError::CorruptRecord { id, reason }) => {
                        issues.push(IndexIssue::CorruptRecord { id, reason })
                    }
                    Err(other) => return Err(other),
                }
            }
            issues.extend(index::audit(tx, owner, &tasks)?);
            Ok(issues)
        })?;
        for issue in &issues {
            warn!("event=index_issue owner={owner} issue=\"{issue}\"");
        }
        Ok(issues)
    }

    /// Rebuild both indexes from the primary records. Returns the number of
    /// tasks indexed. Fails without changes if any record is corrupt.
    pub fn reindex(&self, owner: &str) -> Result<usize> {
        let count = self.db.write(|tx| {
            let tasks = all_records(tx, owner)?
                .into_iter()
                .map(|(id, bytes)| codec::decode(&id, &bytes))
                .collect::<Result<Vec<_>>>()?;
            index::rebuild(tx, owner, &tasks)?;
            Ok(tasks.len())
        })?;
        info!("event=reindex owner={owner} tasks={count}");
        Ok(count)
    }
}

fn read_record(conn: &Connection, owner: &str, id: &TaskId) -> Result<Option<Vec<u8>>> {
    let bytes = conn
        .query_row(
            "SELECT record FROM tasks WHERE owner = ?1 AND id = ?2",
            params![owner, id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(bytes)
}

fn load(conn: &Connection, owner: &str, id: &TaskId) -> Result<Task> {
    match read_record(conn, owner, id)? {
        Some(bytes) => codec::decode(id, &bytes),
        None => Err(TodoError::TaskNotFound(id.clone())),
    }
}

/// Decode the records behind `ids`, skipping ids with no primary record.
fn load_existing(conn: &Connection, owner: &str, ids: &[TaskId]) -> Result<Vec<Task>> {
    let mut tasks = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(bytes) = read_record(conn, owner, id)? {
            tasks.push(codec::decode(id, &bytes)?);
        }
    }
    Ok(tasks)
}

fn all_records(conn: &Connection, owner: &str) -> Result<Vec<(TaskId, Vec<u8>)>> {
    let mut stmt = conn.prepare("SELECT id, record FROM tasks WHERE owner = ?1 ORDER BY id")?;
    let rows = stmt
        .query_map(params![owner], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<(TaskId, Vec<u8>)>, _>>()?;
    Ok(rows)
}

fn insert_record(conn: &Connection, owner: &str, task: &Task) -> Result<()> {
    conn.execute(
        "INSERT INTO tasks (owner, id, record) VALUES (?1, ?2, ?3)",
        params![owner, &task.id, codec::encode(task)?],
    )?;
    Ok(())
}

fn write_record(conn: &Connection, owner: &str, task: &Task) -> Result<()> {
    conn.execute(
        "UPDATE tasks SET record = ?3 WHERE owner = ?1 AND id = ?2",
        params![owner, &task.id, codec::encode(task)?],
    )?;
    Ok(())
}

fn delete_record(conn: &Connection, owner: &str, id: &TaskId) -> Result<()> {
    conn.execute(
        "DELETE FROM tasks WHERE owner = ?1 AND id = ?2",
        params![owner, id],
    )?;
    Ok(())
}
