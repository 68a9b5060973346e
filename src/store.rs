//! Storage layer for prio
//!
//! One `rusqlite::Connection` per process, owned here. Task rows live in the
//! `task` table; priority order lives in a singleton `task_sequence` row as a
//! JSON array of task ids, rewritten in full on every reorder. The archived
//! view is never persisted as an ordering, it is derived from `updated_at`.
//!
//! Inserts extend the sequence inside the same transaction as the row write,
//! so a crash can never leave an active task missing from the sequence. All
//! other row mutations leave the sequence alone; callers follow up with
//! [`Store::write_sequence`] when the ordering changed.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::error::Result;
use crate::migrations;
use crate::task::{Task, TaskId};

/// Storage handle wrapping the single live connection.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if needed) the database at `path` and migrate it to the
    /// latest schema version.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut conn = Connection::open(path)?;
        // A second process (quick-add while the list is open) may hold the
        // write lock briefly.
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        migrations::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    /// Open a fresh in-memory database, migrated to the latest version.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migrations::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    // =========================================================================
    // Inserts (row + sequence, one transaction)
    // =========================================================================

    /// Insert a single active task and splice its id into the sequence, at the
    /// front when `at_top` is set, at the back otherwise.
    pub fn insert_task(
        &mut self,
        summary: &str,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        at_top: bool,
    ) -> Result<TaskId> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO task (summary, active, created_at, updated_at)
             VALUES (?1, true, ?2, ?3)",
            params![summary, created_at, updated_at],
        )?;
        let id = tx.last_insert_rowid();

        let mut sequence = sequence_in_tx(&tx)?;
        if at_top {
            sequence.insert(0, id);
        } else {
            sequence.push(id);
        }
        write_sequence_in_tx(&tx, &sequence)?;

        tx.commit()?;
        Ok(id)
    }

    /// Insert several active tasks in one transaction and splice their ids
    /// into the sequence as a block, preserving input order so the first
    /// summary ends up outermost.
    pub fn insert_batch(
        &mut self,
        summaries: &[String],
        now: DateTime<Utc>,
        at_top: bool,
    ) -> Result<Vec<TaskId>> {
        let tx = self.conn.transaction()?;

        let mut ids = Vec::with_capacity(summaries.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO task (summary, active, created_at, updated_at)
                 VALUES (?1, true, ?2, ?3)",
            )?;
            for summary in summaries {
                stmt.execute(params![summary, now, now])?;
                ids.push(tx.last_insert_rowid());
            }
        }

        let old = sequence_in_tx(&tx)?;
        let mut sequence = Vec::with_capacity(old.len() + ids.len());
        if at_top {
            sequence.extend_from_slice(&ids);
            sequence.extend_from_slice(&old);
        } else {
            sequence.extend_from_slice(&old);
            sequence.extend_from_slice(&ids);
        }
        write_sequence_in_tx(&tx, &sequence)?;

        tx.commit()?;
        Ok(ids)
    }

    // =========================================================================
    // Row-only mutations (sequence untouched)
    // =========================================================================

    pub fn update_summary(
        &self,
        id: TaskId,
        summary: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE task SET summary = ?1, updated_at = ?2 WHERE id = ?3",
            params![summary, updated_at, id],
        )?;
        Ok(())
    }

    /// Replace the context blob; `None` clears it to NULL.
    pub fn update_context(
        &self,
        id: TaskId,
        context: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE task SET context = ?1, updated_at = ?2 WHERE id = ?3",
            params![context, updated_at, id],
        )?;
        Ok(())
    }

    pub fn set_active(&self, id: TaskId, active: bool, updated_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE task SET active = ?1, updated_at = ?2 WHERE id = ?3",
            params![active, updated_at, id],
        )?;
        Ok(())
    }

    /// Delete the row. The caller rewrites the sequence if the task was
    /// active.
    pub fn delete_task(&self, id: TaskId) -> Result<()> {
        self.conn
            .execute("DELETE FROM task WHERE id = ?1", params![id])?;
        Ok(())
    }

    // =========================================================================
    // Sequence (full-snapshot writes, last writer wins)
    // =========================================================================

    /// Replace the sequence with `ids`, unconditionally.
    pub fn write_sequence(&self, ids: &[TaskId]) -> Result<()> {
        let json = serde_json::to_string(ids)?;
        self.conn.execute(
            "UPDATE task_sequence SET sequence = ?1 WHERE id = 1",
            params![json],
        )?;
        Ok(())
    }

    pub fn read_sequence(&self) -> Result<Vec<TaskId>> {
        let json: String =
            self.conn
                .query_row("SELECT sequence FROM task_sequence WHERE id = 1", [], |row| {
                    row.get(0)
                })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Number of active tasks, straight off the sequence length.
    pub fn num_active(&self) -> Result<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT json_array_length(sequence) FROM task_sequence WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(n.max(0) as usize)
    }

    // =========================================================================
    // Fetches
    // =========================================================================

    /// Active tasks in priority order, up to `limit`.
    ///
    /// Rows flipped inactive but still sequenced (possible between a status
    /// change and the follow-up snapshot) are skipped.
    pub fn fetch_active(&self, limit: usize) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.summary, t.context, t.created_at, t.updated_at
             FROM task_sequence s
             JOIN json_each(s.sequence) j
             JOIN task t ON t.id = CAST(j.value AS INTEGER)
             WHERE s.id = 1 AND t.active IS true
             ORDER BY j.key
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| task_from_row(row, true))?;
        collect_tasks(rows)
    }

    /// The active task at zero-based priority `index`, if any.
    pub fn fetch_active_at(&self, index: usize) -> Result<Option<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.summary, t.context, t.created_at, t.updated_at
             FROM task_sequence s
             JOIN json_each(s.sequence) j
             JOIN task t ON t.id = CAST(j.value AS INTEGER)
             WHERE s.id = 1 AND t.active IS true
             ORDER BY j.key
             LIMIT 1 OFFSET ?1",
        )?;
        let mut rows = stmt.query_map(params![index as i64], |row| task_from_row(row, true))?;
        match rows.next() {
            Some(task) => Ok(Some(task?)),
            None => Ok(None),
        }
    }

    /// Archived tasks, most recently archived first, up to `limit`.
    pub fn fetch_archived(&self, limit: usize) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, summary, context, created_at, updated_at
             FROM task
             WHERE active IS false
             ORDER BY updated_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| task_from_row(row, false))?;
        collect_tasks(rows)
    }
}

fn task_from_row(row: &Row<'_>, active: bool) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        summary: row.get(1)?,
        context: row.get(2)?,
        active,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn collect_tasks<I>(rows: I) -> Result<Vec<Task>>
where
    I: Iterator<Item = rusqlite::Result<Task>>,
{
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row?);
    }
    Ok(tasks)
}

fn sequence_in_tx(tx: &rusqlite::Transaction<'_>) -> Result<Vec<TaskId>> {
    let json: String = tx.query_row(
        "SELECT sequence FROM task_sequence WHERE id = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(serde_json::from_str(&json)?)
}

fn write_sequence_in_tx(tx: &rusqlite::Transaction<'_>, ids: &[TaskId]) -> Result<()> {
    let json = serde_json::to_string(ids)?;
    tx.execute(
        "UPDATE task_sequence SET sequence = ?1 WHERE id = 1",
        params![json],
    )?;
    Ok(())
}
