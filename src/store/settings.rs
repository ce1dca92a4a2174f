//! SQLite-backed key/value settings. Only the tutorial flag survives a session.

use std::path::Path;

use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::core::config;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Works without a database too: reads fall back to defaults, writes are dropped.
pub struct SettingsStore {
    conn: Option<Connection>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self { conn: None }
    }

    pub fn open(&mut self, db_path: &Path) -> Result<(), SettingsError> {
        let conn = Connection::open(db_path)?;
        Self::create_tables(&conn)?;
        self.conn = Some(conn);
        Ok(())
    }

    pub fn open_in_memory(&mut self) -> Result<(), SettingsError> {
        let conn = Connection::open_in_memory()?;
        Self::create_tables(&conn)?;
        self.conn = Some(conn);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let conn = self.conn.as_ref()?;
        match conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        {
            Ok(value) => value,
            Err(e) => {
                warn!("failed to read setting '{key}': {e}");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let Some(conn) = &self.conn else {
            return Ok(());
        };
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).as_deref() == Some("true")
    }

    pub fn tutorial_seen(&self) -> bool {
        self.flag(config::TUTORIAL_SEEN_KEY)
    }

    pub fn mark_tutorial_seen(&self) -> Result<(), SettingsError> {
        self.set(config::TUTORIAL_SEEN_KEY, "true")
    }

    fn create_tables(conn: &Connection) -> Result<(), SettingsError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}
