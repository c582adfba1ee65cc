//! Persistent settings and server configuration.
//!
//! [`Settings`] is a key-value store in SQLite that shares a database with
//! [`AuthStorage`](crate::auth::AuthStorage). [`ServerConfig`] is built per
//! run from CLI flags and the environment.

mod server;

pub use server::ServerConfig;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::Mutex;

use crate::solver::PipelineMode;

const MODEL_KEY: &str = "model";
const PIPELINE_KEY: &str = "pipeline";

/// Persistent key-value settings.
pub struct Settings {
    conn: Mutex<Connection>,
}

impl Settings {
    /// Open or create the settings table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open settings database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create settings table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Upsert.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }

    /// The saved default model, if any.
    pub fn model(&self) -> Result<Option<String>> {
        self.get(MODEL_KEY)
    }

    pub fn set_model(&self, model: &str) -> Result<()> {
        self.set(MODEL_KEY, model)
    }

    pub fn reset_model(&self) -> Result<()> {
        self.remove(MODEL_KEY)
    }

    /// The saved pipeline mode. Unknown values are ignored.
    pub fn pipeline(&self) -> Result<Option<PipelineMode>> {
        Ok(self.get(PIPELINE_KEY)?.and_then(|v| v.parse().ok()))
    }

    pub fn set_pipeline(&self, mode: PipelineMode) -> Result<()> {
        self.set(PIPELINE_KEY, mode.as_str())
    }
}
