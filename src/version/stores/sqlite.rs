use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::version::error::CacheError;
use crate::version::store::{CacheEntry, KeyValueStore, current_timestamp_ms};

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: lookups of expired rows during purge
    &["CREATE INDEX IF NOT EXISTS idx_expires_at ON responses(expires_at)"],
];

/// SQLite-backed store, keeps cached responses across process invocations
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self, CacheError> {
        info!("Initializing response cache database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::with_connection(conn)
    }

    /// Open a store that lives only as long as this value
    pub fn in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        debug!("Database connection established");

        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        info!("Response cache initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), CacheError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    conn.execute(sql, [])?;
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
            debug!("Updated schema version to v{}", target_version);
        }

        Ok(())
    }

    /// Fetch the raw entry stored under `key`, expired or not
    pub fn entry(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let conn = self.lock_conn()?;
        let entry = conn
            .query_row(
                "SELECT key, value, expires_at FROM responses WHERE key = ?1",
                [key],
                |row| {
                    Ok(CacheEntry {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        expires_at: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(entry)
    }

    /// Delete every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = current_timestamp_ms();
        let conn = self.lock_conn()?;
        let removed = conn.execute("DELETE FROM responses WHERE expires_at <= ?1", [now])?;

        debug!("Purged {} expired responses", removed);
        Ok(removed)
    }

    /// Delete every entry, returning how many were removed
    pub fn clear(&self) -> Result<usize, CacheError> {
        let conn = self.lock_conn()?;
        let removed = conn.execute("DELETE FROM responses", [])?;

        debug!("Cleared {} responses", removed);
        Ok(removed)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = current_timestamp_ms();
        let conn = self.lock_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM responses WHERE key = ?1 AND expires_at > ?2",
                (key, now),
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry::new(key, value, ttl);
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            INSERT INTO responses (key, value, expires_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
            "#,
            (&entry.key, &entry.value, entry.expires_at),
        )?;

        debug!("Stored {} bytes under {}", entry.value.len(), entry.key);
        Ok(())
    }
}
