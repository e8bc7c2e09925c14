//! Secondary index maintenance.
//!
//! Two presence-only indexes sit beside the primary `tasks` table for every
//! owner: one due-date bucket per distinct date, and a pending set holding
//! every task whose `done` flag is false. The functions here take a live
//! transaction so that a caller's record write and its index updates commit
//! or roll back together; none of them commit on their own.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use log::debug;
use rusqlite::{Connection, Transaction, params};

use crate::error::{Result, TodoError};
use crate::model::Task;
use crate::task_id::TaskId;

/// Bucket name for a due date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A new task enters its due-date bucket and, while not done, the pending set.
pub fn on_create(tx: &Transaction<'_>, owner: &str, task: &Task) -> Result<()> {
    add_to_bucket(tx, owner, task.due, &task.id)?;
    if !task.done {
        add_pending(tx, owner, &task.id)?;
    }
    Ok(())
}

/// Move `id` from the bucket for `old` to the bucket for `new`.
///
/// `old` must be read from the stored record before that record is
/// overwritten; once it is gone the old entry can no longer be located.
pub fn on_due_change(
    tx: &Transaction<'_>,
    owner: &str,
    id: &TaskId,
    old: NaiveDate,
    new: NaiveDate,
) -> Result<()> {
    if old == new {
        return Ok(());
    }
    tx.execute(
        "DELETE FROM due_index WHERE owner = ?1 AND due = ?2 AND task_id = ?3",
        params![owner, date_key(old), id],
    )?;
    add_to_bucket(tx, owner, new, id)?;
    debug!(
        "event=index_due_move owner={owner} id={id} from={} to={}",
        date_key(old),
        date_key(new)
    );
    Ok(())
}

/// Derive pending-set membership from the new `done` value.
pub fn on_done_change(tx: &Transaction<'_>, owner: &str, id: &TaskId, done: bool) -> Result<()> {
    if done {
        remove_pending(tx, owner, id)
    } else {
        add_pending(tx, owner, id)
    }
}

/// Drop every index entry for a task that is being deleted.
///
/// The bucket for the record's due date must exist; its absence means an
/// earlier write left the indexes inconsistent and the delete is refused.
pub fn on_delete(tx: &Transaction<'_>, owner: &str, task: &Task) -> Result<()> {
    let key = date_key(task.due);
    let bucket_exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM due_buckets WHERE owner = ?1 AND due = ?2)",
        params![owner, &key],
        |row| row.get(0),
    )?;
    if !bucket_exists {
        return Err(TodoError::IndexCorrupt(format!(
            "no due-date bucket {key} for task {}",
            task.id
        )));
    }
    tx.execute(
        "DELETE FROM due_index WHERE owner = ?1 AND due = ?2 AND task_id = ?3",
        params![owner, &key, &task.id],
    )?;
    remove_pending(tx, owner, &task.id)
}

/// Clear and repopulate both indexes for `owner` from `tasks`.
///
/// Buckets are kept; entries are re-added in the order given.
pub fn rebuild(tx: &Transaction<'_>, owner: &str, tasks: &[Task]) -> Result<()> {
    tx.execute("DELETE FROM due_index WHERE owner = ?1", params![owner])?;
    tx.execute("DELETE FROM pending_index WHERE owner = ?1", params![owner])?;
    for task in tasks {
        on_create(tx, owner, task)?;
    }
    Ok(())
}

fn add_to_bucket(tx: &Transaction<'_>, owner: &str, due: NaiveDate, id: &TaskId) -> Result<()> {
    let key = date_key(due);
    tx.execute(
        "INSERT OR IGNORE INTO due_buckets (owner, due) VALUES (?1, ?2)",
        params![owner, &key],
    )?;
    tx.execute(
        "INSERT OR IGNORE INTO due_index (owner, due, task_id) VALUES (?1, ?2, ?3)",
        params![owner, &key, id],
    )?;
    Ok(())
}

fn add_pending(tx: &Transaction<'_>, owner: &str, id: &TaskId) -> Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO pending_index (owner, task_id) VALUES (?1, ?2)",
        params![owner, id],
    )?;
    Ok(())
}

fn remove_pending(tx: &Transaction<'_>, owner: &str, id: &TaskId) -> Result<()> {
    tx.execute(
        "DELETE FROM pending_index WHERE owner = ?1 AND task_id = ?2",
        params![owner, id],
    )?;
    Ok(())
}

/// Ids in the bucket for `date`, in insertion order. Empty if the bucket does not exist.
pub fn due_members(conn: &Connection, owner: &str, date: NaiveDate) -> Result<Vec<TaskId>> {
    let mut stmt =
        conn.prepare("SELECT task_id FROM due_index WHERE owner = ?1 AND due = ?2 ORDER BY seq")?;
    let ids = stmt
        .query_map(params![owner, date_key(date)], |row| row.get(0))?
        .collect::<std::result::Result<Vec<TaskId>, _>>()?;
    Ok(ids)
}

/// Ids in the pending set, in insertion order.
pub fn pending_members(conn: &Connection, owner: &str) -> Result<Vec<TaskId>> {
    let mut stmt =
        conn.prepare("SELECT task_id FROM pending_index WHERE owner = ?1 ORDER BY seq")?;
    let ids = stmt
        .query_map(params![owner], |row| row.get(0))?
        .collect::<std::result::Result<Vec<TaskId>, _>>()?;
    Ok(ids)
}

/// Every `(bucket, id)` due-date entry for `owner`, in insertion order.
pub fn due_entries(conn: &Connection, owner: &str) -> Result<Vec<(String, TaskId)>> {
    let mut stmt =
        conn.prepare("SELECT due, task_id FROM due_index WHERE owner = ?1 ORDER BY seq")?;
    let rows = stmt
        .query_map(params![owner], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<(String, TaskId)>, _>>()?;
    Ok(rows)
}

/// A divergence between primary records and the secondary indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexIssue {
    /// The task has no entry in the bucket for its due date.
    MissingDueEntry { id: TaskId, due: String },
    /// The task sits in a bucket other than the one for its due date.
    StrayDueEntry { id: TaskId, due: String },
    /// A bucket entry points at a task with no primary record.
    DanglingDueEntry { id: TaskId, due: String },
    /// An undone task is absent from the pending set.
    MissingPending { id: TaskId },
    /// A done task is still in the pending set.
    StrayPending { id: TaskId },
    /// A pending entry points at a task with no primary record.
    DanglingPending { id: TaskId },
    /// A primary record that does not decode.
    CorruptRecord { id: String, reason: String },
}

impl fmt::Display for IndexIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDueEntry { id, due } => {
                write!(f, "task {id} missing from due-date bucket {due}")
            }
            Self::StrayDueEntry { id, due } => {
                write!(f, "task {id} listed in wrong due-date bucket {due}")
            }
            Self::DanglingDueEntry { id, due } => {
                write!(f, "due-date bucket {due} lists unknown task {id}")
            }
            Self::MissingPending { id } => write!(f, "undone task {id} missing from pending set"),
            Self::StrayPending { id } => write!(f, "done task {id} still in pending set"),
            Self::DanglingPending { id } => write!(f, "pending set lists unknown task {id}"),
            Self::CorruptRecord { id, reason } => write!(f, "record {id} is corrupt: {reason}"),
        }
    }
}

/// Compare both indexes against the decoded primary records of `owner`.
///
/// Entries pointing at a primary row that exists but failed to decode are
/// not reported as dangling; the caller reports the corrupt row itself.
pub fn audit(conn: &Connection, owner: &str, tasks: &[Task]) -> Result<Vec<IndexIssue>> {
    let mut issues = Vec::new();

    let present: HashSet<TaskId> = {
        let mut stmt = conn.prepare("SELECT id FROM tasks WHERE owner = ?1")?;
        let ids = stmt
            .query_map(params![owner], |row| row.get(0))?
            .collect::<std::result::Result<HashSet<TaskId>, _>>()?;
        ids
    };
    let entries = due_entries(conn, owner)?;
    let pending: HashSet<TaskId> = pending_members(conn, owner)?.into_iter().collect();

    for task in tasks {
        let key = date_key(task.due);
        if !entries.iter().any(|(due, id)| *id == task.id && *due == key) {
            issues.push(IndexIssue::MissingDueEntry {
                id: task.id.clone(),
                due: key.clone(),
            });
        }
        for (due, _) in entries.iter().filter(|(due, id)| *id == task.id && *due != key) {
            issues.push(IndexIssue::StrayDueEntry {
                id: task.id.clone(),
                due: due.clone(),
            });
        }
        match (task.done, pending.contains(&task.id)) {
            (false, false) => issues.push(IndexIssue::MissingPending {
                id: task.id.clone(),
            }),
            (true, true) => issues.push(IndexIssue::StrayPending {
                id: task.id.clone(),
            }),
            _ => {}
        }
    }

    for (due, id) in &entries {
        if !present.contains(id) {
            issues.push(IndexIssue::DanglingDueEntry {
                id: id.clone(),
                due: due.clone(),
            });
        }
    }
    for id in pending_members(conn, owner)? {
        if !present.contains(&id) {
            issues.push(IndexIssue::DanglingPending { id });
        }
    }

    Ok(issues)
}
