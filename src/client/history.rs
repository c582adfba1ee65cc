//! The terminal client's local record of solved problems.
//!
//! Same rules as the browser's `qaHistory`: newest first, capped, and
//! listed as short excerpts.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::consts::{EXCERPT_CHARS, HISTORY_LIMIT};

/// One solved problem.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: String,
    /// The photographed problem as a data URL.
    pub image: String,
    /// The answer HTML.
    pub result: String,
}

impl HistoryEntry {
    pub fn excerpt(&self) -> String {
        excerpt(&self.result)
    }
}

/// First characters of an answer, always followed by `...`.
pub fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    out.push_str("...");
    out
}

/// SQLite-backed bounded history.
pub struct HistoryStore {
    conn: Mutex<Connection>,
    limit: usize,
}

impl HistoryStore {
    pub fn open(path: &str) -> Result<Self> {
        Self::with_limit(path, HISTORY_LIMIT)
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn with_limit(path: &str, limit: usize) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open history database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL DEFAULT (datetime('now')),
                image TEXT NOT NULL,
                result TEXT NOT NULL
            )",
        )
        .context("failed to create history table")?;
        Ok(Self {
            conn: Mutex::new(conn),
            limit,
        })
    }

    /// Insert at the front and drop whatever falls off the back.
    pub fn save(&self, image: &str, result: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO history (image, result) VALUES (?1, ?2)",
            [image, result],
        )?;
        conn.execute(
            "DELETE FROM history WHERE id NOT IN (
                SELECT id FROM history ORDER BY id DESC LIMIT ?1
            )",
            [self.limit as i64],
        )?;
        Ok(())
    }

    /// Newest first.
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT timestamp, image, result FROM history ORDER BY id DESC")?;
        let entries = stmt
            .query_map([], |row| {
                Ok(HistoryEntry {
                    timestamp: row.get(0)?,
                    image: row.get(1)?,
                    result: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM history", [])?;
        Ok(())
    }
}
