//! SQLite-backed storage for students, scores and the system log.
//!
//! One connection behind a mutex; every method takes the lock, runs its
//! statements and returns. Purge and reset group their multi-row deletes
//! into a single transaction so a crash cannot leave half the cascade
//! applied.

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use shared::{LogEntry, TopScore};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Schema for the three tables. The scores table declares its reference to
/// students, but foreign-key enforcement stays off: submissions with a
/// dangling student_id are accepted, matching the service contract.
const DDL: &str = "
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS scores (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER REFERENCES students(id),
    score INTEGER,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message TEXT,
    type TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
";

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(DDL).context("failed to create schema")?;
        Ok(())
    }

    /// Inserts a student row and returns its generated id. No uniqueness or
    /// format checks; empty and duplicate names are accepted.
    pub fn register_student(&self, name: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT INTO students (name) VALUES (?1)", params![name])
            .context("failed to insert student")?;
        Ok(conn.last_insert_rowid())
    }

    /// Inserts a score row. The student_id is taken as-is, existing or not.
    pub fn insert_score(&self, student_id: i64, score: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO scores (student_id, score) VALUES (?1, ?2)",
            params![student_id, score],
        )
        .context("failed to insert score")?;
        Ok(())
    }

    /// Top scores joined to student names, highest first. Ties keep
    /// insertion order.
    pub fn top_scores(&self, limit: u32) -> Result<Vec<TopScore>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT students.name, scores.score
                 FROM scores JOIN students ON scores.student_id = students.id
                 ORDER BY scores.score DESC, scores.id ASC
                 LIMIT ?1",
            )
            .context("failed to prepare top scores query")?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(TopScore {
                name: row.get(0)?,
                score: row.get(1)?,
            })
        })?;

        let mut scores = Vec::new();
        for row in rows {
            scores.push(row?);
        }
        Ok(scores)
    }

    /// Sum of every submitted score, 0 when the table is empty.
    pub fn total_data(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let total = conn
            .query_row("SELECT COALESCE(SUM(score), 0) FROM scores", [], |row| {
                row.get(0)
            })
            .context("failed to sum scores")?;
        Ok(total)
    }

    /// Most recent log entries, newest first.
    pub fn recent_logs(&self, limit: u32) -> Result<Vec<LogEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT message, type FROM logs ORDER BY id DESC LIMIT ?1")
            .context("failed to prepare logs query")?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(LogEntry {
                message: row.get(0)?,
                kind: row.get(1)?,
            })
        })?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }

    /// Appends a log entry, prefixing the message with the local wall-clock
    /// time as `[HH:MM:SS]`.
    pub fn append_log(&self, kind: &str, message: &str) -> Result<()> {
        let stamped = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO logs (message, type) VALUES (?1, ?2)",
            params![stamped, kind],
        )
        .context("failed to insert log entry")?;
        Ok(())
    }

    /// Deletes the first (lowest-id) student whose name matches exactly,
    /// together with all their scores, in one transaction. Returns false
    /// when no student matched.
    pub fn purge_student(&self, name: &str) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let target: Option<i64> = conn
            .query_row(
                "SELECT id FROM students WHERE name = ?1 ORDER BY id LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .context("failed to look up purge target")?;

        let Some(id) = target else {
            return Ok(false);
        };

        let tx = conn.transaction().context("failed to begin purge")?;
        tx.execute("DELETE FROM scores WHERE student_id = ?1", params![id])?;
        tx.execute("DELETE FROM students WHERE id = ?1", params![id])?;
        tx.commit().context("failed to commit purge")?;
        Ok(true)
    }

    /// Wipes all three tables in one transaction. The caller appends the
    /// confirmation log after this commits, so exactly one entry survives.
    pub fn reset_all(&self) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().context("failed to begin reset")?;
        tx.execute("DELETE FROM scores", [])?;
        tx.execute("DELETE FROM students", [])?;
        tx.execute("DELETE FROM logs", [])?;
        tx.commit().context("failed to commit reset")?;
        Ok(())
    }
}
