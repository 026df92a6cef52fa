use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::datasets::{Dataset, DatasetInfo};
use crate::error::StorageError;

const PREFERENCES_KEY: &str = "preferences";
const CATALOG_KEY: &str = "dataset_catalog";

/// UI choices that survive a restart.
///
/// `count_info` stays `None` until the user toggles it, so the configured
/// default applies only while nothing is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub count_info: Option<bool>,
    pub browsing: Option<Dataset>,
}

impl Preferences {
    pub fn count_info_or(&self, configured: bool) -> bool {
        self.count_info.unwrap_or(configured)
    }
}

pub fn open_db(path: &Path) -> Result<Connection, StorageError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| StorageError::DataDir {
            path: dir.display().to_string(),
            source,
        })?;
    }

    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS app_state (
         state_key TEXT PRIMARY KEY,
         state_json TEXT NOT NULL,
         updated_at INTEGER NOT NULL DEFAULT (strftime('%s','now'))
       );",
    )?;
    Ok(())
}

pub fn upsert_state(conn: &Connection, key: &str, state_json: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO app_state (state_key, state_json, updated_at)
       VALUES (?1, ?2, strftime('%s','now'))
       ON CONFLICT(state_key)
       DO UPDATE SET
         state_json = excluded.state_json,
         updated_at = excluded.updated_at;",
        params![key, state_json],
    )?;
    Ok(())
}

pub fn load_state(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    let state = conn
        .query_row(
            "SELECT state_json FROM app_state WHERE state_key = ?1 LIMIT 1;",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(state)
}

fn save_json<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> Result<(), StorageError> {
    upsert_state(conn, key, &serde_json::to_string(value)?)
}

fn load_json<T: for<'de> Deserialize<'de>>(conn: &Connection, key: &str) -> Result<Option<T>, StorageError> {
    load_state(conn, key)?
        .map(|raw| serde_json::from_str(&raw).map_err(StorageError::from))
        .transpose()
}

pub fn save_preferences(conn: &Connection, preferences: &Preferences) -> Result<(), StorageError> {
    save_json(conn, PREFERENCES_KEY, preferences)
}

pub fn load_preferences(conn: &Connection) -> Result<Preferences, StorageError> {
    Ok(load_json(conn, PREFERENCES_KEY)?.unwrap_or_default())
}

/// Keep the last catalog so the column selector still filters offline.
pub fn save_catalog(conn: &Connection, catalog: &[DatasetInfo]) -> Result<(), StorageError> {
    save_json(conn, CATALOG_KEY, catalog)
}

pub fn load_catalog(conn: &Connection) -> Result<Vec<DatasetInfo>, StorageError> {
    Ok(load_json(conn, CATALOG_KEY)?.unwrap_or_default())
}
