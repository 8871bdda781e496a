//! Persisted configuration store port and SQLite key/value implementation.
//!
//! # Responsibility
//! - Persist opaque configuration snapshots under fixed logical keys.
//! - Wrap snapshots in a versioned JSON envelope and migrate unversioned
//!   legacy snapshots on load.
//!
//! # Invariants
//! - Every write produces an envelope tagged with `SNAPSHOT_VERSION`.
//! - Snapshots tagged newer than `SNAPSHOT_VERSION` are rejected, never
//!   partially decoded.

use crate::db::DbError;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Logical key of the persisted tax configuration.
pub const TAX_CONFIG_KEY: &str = "tax_config";
/// Envelope version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

pub type ConfigStoreResult<T> = Result<T, ConfigStoreError>;

/// Configuration persistence errors.
#[derive(Debug)]
pub enum ConfigStoreError {
    Db(DbError),
    Serialization(serde_json::Error),
    UnsupportedSnapshotVersion { found: u32, latest_supported: u32 },
}

impl Display for ConfigStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid configuration snapshot: {err}"),
            Self::UnsupportedSnapshotVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "configuration snapshot version {found} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for ConfigStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::UnsupportedSnapshotVersion { .. } => None,
        }
    }
}

impl From<DbError> for ConfigStoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ConfigStoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for ConfigStoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Raw load/save port for serialized configuration values.
pub trait ConfigStore {
    fn load(&self, key: &str) -> ConfigStoreResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> ConfigStoreResult<()>;
}

/// SQLite-backed key/value configuration store (`app_config` table).
pub struct SqliteConfigStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteConfigStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ConfigStore for SqliteConfigStore<'_> {
    fn load(&self, key: &str) -> ConfigStoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_config WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, value: &str) -> ConfigStoreResult<()> {
        self.conn.execute(
            "INSERT INTO app_config (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotEnvelope<'a, T> {
    version: u32,
    config: &'a T,
}

/// Serializes `config` into a versioned envelope and stores it under `key`.
pub fn save_snapshot<T: Serialize>(
    store: &impl ConfigStore,
    key: &str,
    config: &T,
) -> ConfigStoreResult<()> {
    let raw = serde_json::to_string(&SnapshotEnvelope {
        version: SNAPSHOT_VERSION,
        config,
    })?;
    store.save(key, &raw)
}

/// Loads the snapshot stored under `key`.
///
/// Returns `None` when nothing was stored yet. Legacy snapshots written
/// without an envelope are decoded as version `0` and rewritten in the
/// current envelope format.
pub fn load_snapshot<T: Serialize + DeserializeOwned>(
    store: &impl ConfigStore,
    key: &str,
) -> ConfigStoreResult<Option<T>> {
    let Some(raw) = store.load(key)? else {
        return Ok(None);
    };

    let (version, config) = decode_snapshot::<T>(serde_json::from_str(&raw)?)?;
    if version < SNAPSHOT_VERSION {
        save_snapshot(store, key, &config)?;
        info!(
            "event=config_migrate module=config status=ok key={} from_version={} to_version={}",
            key, version, SNAPSHOT_VERSION
        );
    }
    Ok(Some(config))
}

fn decode_snapshot<T: DeserializeOwned>(mut value: Value) -> ConfigStoreResult<(u32, T)> {
    let version = value.get("version").and_then(Value::as_u64);
    let has_config = value.get("config").is_some();

    match version {
        Some(version) if has_config => {
            let version = u32::try_from(version).unwrap_or(u32::MAX);
            if version > SNAPSHOT_VERSION {
                return Err(ConfigStoreError::UnsupportedSnapshotVersion {
                    found: version,
                    latest_supported: SNAPSHOT_VERSION,
                });
            }
            let config = serde_json::from_value(value["config"].take())?;
            Ok((version, config))
        }
        _ => Ok((0, serde_json::from_value(value)?)),
    }
}
