use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::Result;
use crate::store::lock;

/// An open store file plus the process lock that guards it.
///
/// Dropping the `Database` closes the connection and releases the lock.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
    _lock: Option<File>,
}

impl Database {
    /// Open (or create) the store at `path`. Fails fast with `Locked` when
    /// another process holds it.
    pub fn open(path: &Path) -> Result<Self> {
        let lock_file = lock::acquire_lock(&lock::lock_path_for(path))?;
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA foreign_keys=ON;\
             PRAGMA busy_timeout=5000;",
        )?;
        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
            _lock: Some(lock_file),
        };
        db.create_tables()?;
        info!("event=db_open status=ok path={}", path.display());
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let db = Self {
            conn,
            path: None,
            _lock: None,
        };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                owner TEXT NOT NULL,
                id TEXT NOT NULL,
                record BLOB NOT NULL,
                PRIMARY KEY (owner, id)
            );
            CREATE TABLE IF NOT EXISTS due_buckets (
                owner TEXT NOT NULL,
                due TEXT NOT NULL,
                PRIMARY KEY (owner, due)
            );
            CREATE TABLE IF NOT EXISTS due_index (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                due TEXT NOT NULL,
                task_id TEXT NOT NULL,
                UNIQUE (owner, due, task_id),
                FOREIGN KEY (owner, due) REFERENCES due_buckets(owner, due)
            );
            CREATE TABLE IF NOT EXISTS pending_index (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                task_id TEXT NOT NULL,
                UNIQUE (owner, task_id)
            );
            CREATE INDEX IF NOT EXISTS idx_due_index_task ON due_index(owner, task_id);
            CREATE TABLE IF NOT EXISTS listing (
                label TEXT PRIMARY KEY,
                task_id TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Path of the backing file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` inside a read-only transaction. The transaction is rolled
    /// back afterwards; nothing `f` does is persisted.
    pub fn read<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Deferred)?;
        let out = f(&tx)?;
        tx.finish()?;
        Ok(out)
    }

    /// Run `f` inside the single read-write transaction. Commits only when
    /// `f` returns `Ok`; any error rolls every change back.
    pub fn write<T>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T>) -> Result<T> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        match f(&tx) {
            Ok(out) => {
                tx.commit()?;
                Ok(out)
            }
            Err(e) => {
                debug!("event=tx_rollback error={}", e.code());
                tx.rollback()?;
                Err(e)
            }
        }
    }

    /// The underlying connection, outside any transaction.
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
