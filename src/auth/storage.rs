use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Where the active API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Stored,
    Env,
    Missing,
}

impl KeySource {
    pub fn label(self) -> &'static str {
        match self {
            KeySource::Stored => "API key ✓",
            KeySource::Env => "API key (env) ✓",
            KeySource::Missing => "not configured",
        }
    }
}

/// Manages API key storage in SQLite.
///
/// Shares a database with [`Settings`](crate::config::Settings) and the
/// terminal client's history. Pass the same path to all three.
pub struct AuthStorage {
    conn: Mutex<Connection>,
}

impl AuthStorage {
    /// Open or create a credentials table in the given database path.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open credentials database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS credentials (
                provider TEXT PRIMARY KEY,
                api_key  TEXT NOT NULL
            )",
        )
        .context("failed to create credentials table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the stored key for a provider.
    pub fn get(&self, provider: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT api_key FROM credentials WHERE provider = ?1")?;
        let mut rows = stmt.query([provider])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Store the key for a provider (upsert).
    pub fn set(&self, provider: &str, api_key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO credentials (provider, api_key) VALUES (?1, ?2)
             ON CONFLICT(provider) DO UPDATE SET api_key = excluded.api_key",
            [provider, api_key],
        )?;
        Ok(())
    }

    /// Remove the key for a provider.
    pub fn remove(&self, provider: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM credentials WHERE provider = ?1", [provider])?;
        Ok(())
    }

    /// Resolve the API key for a provider.
    /// Priority: stored key → environment variable.
    pub fn get_api_key(&self, provider: &str, env_var: &str) -> Result<Option<String>> {
        Ok(self.resolve(provider, env_var)?.map(|(key, _)| key))
    }

    /// Which source [`get_api_key`](Self::get_api_key) would use.
    pub fn key_source(&self, provider: &str, env_var: &str) -> Result<KeySource> {
        Ok(self
            .resolve(provider, env_var)?
            .map(|(_, source)| source)
            .unwrap_or(KeySource::Missing))
    }

    fn resolve(&self, provider: &str, env_var: &str) -> Result<Option<(String, KeySource)>> {
        if let Some(key) = self.get(provider)?
            && !key.is_empty()
        {
            return Ok(Some((key, KeySource::Stored)));
        }

        if let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Ok(Some((key, KeySource::Env)));
        }

        Ok(None)
    }
}
