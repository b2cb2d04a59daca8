use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, StencilError};
use crate::domain::{CacheRecord, RecordSummary};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        migrations.to_latest(&mut conn)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            StencilError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn to_epoch(dt: &DateTime<Utc>) -> f64 {
        dt.timestamp_micros() as f64 / 1_000_000.0
    }

    fn from_epoch(secs: f64) -> Option<DateTime<Utc>> {
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1_000_000_000.0) as u32;
        DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
    }
}

impl Store for SqliteStore {
    fn get_record(&self, key: &str) -> Result<Option<CacheRecord>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT key, content, fetch_time FROM fetched_content WHERE key = ?1",
                params![key],
                |row| {
                    Ok(CacheRecord {
                        key: row.get(0)?,
                        payload: row.get::<_, Option<Vec<u8>>>(1)?.unwrap_or_default(),
                        fetched_at: row
                            .get::<_, Option<f64>>(2)?
                            .and_then(Self::from_epoch)
                            .unwrap_or_else(Utc::now),
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    fn get_content(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn()?;

        let result = conn
            .query_row(
                "SELECT content FROM fetched_content WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<Vec<u8>>>(0),
            )
            .optional()?;

        Ok(result.map(Option::unwrap_or_default))
    }

    fn contains(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM fetched_content WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn put_content(&self, key: &str, content: &[u8]) -> Result<()> {
        let conn = self.conn()?;

        // Keeps the rowid, and with it the listing position.
        conn.execute(
            "INSERT INTO fetched_content (key, content, fetch_time) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET content = ?2, fetch_time = ?3",
            params![key, content, Self::to_epoch(&Utc::now())],
        )?;

        Ok(())
    }

    fn insert_content(&self, key: &str, content: &[u8]) -> Result<bool> {
        let conn = self.conn()?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO fetched_content (key, content, fetch_time) VALUES (?1, ?2, ?3)",
            params![key, content, Self::to_epoch(&Utc::now())],
        )?;

        Ok(inserted > 0)
    }

    fn list_records(&self) -> Result<Vec<RecordSummary>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT key, COALESCE(length(content), 0), fetch_time
             FROM fetched_content ORDER BY rowid",
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(RecordSummary {
                    key: row.get(0)?,
                    size: row.get::<_, i64>(1)? as usize,
                    fetched_at: row
                        .get::<_, Option<f64>>(2)?
                        .and_then(Self::from_epoch),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;

        let deleted = conn.execute("DELETE FROM fetched_content WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }
}
