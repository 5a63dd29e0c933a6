//! SQLite store implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::store::schema::{initialize_schema, VALUE_TABLES};
use crate::store::traits::{Batch, Command, Store, StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite store backend
///
/// The connection sits behind a mutex so the store can be shared by the
/// crawler and every worker. Each trait call holds the lock for its whole
/// duration, which gives the per-command atomicity the catalog relies on.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // Workers write concurrently with the crawler; WAL keeps readers unblocked
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory store
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

/// Applies one command inside an open transaction
fn apply(tx: &Transaction<'_>, command: Command) -> StoreResult<()> {
    match command {
        Command::HSet { key, fields } => {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO kv_hashes (key, field, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key, field) DO UPDATE SET value = excluded.value",
            )?;
            for (field, value) in fields {
                stmt.execute(params![key, field, value])?;
            }
        }

        Command::HSetNx { key, field, value } => {
            tx.execute(
                "INSERT OR IGNORE INTO kv_hashes (key, field, value) VALUES (?1, ?2, ?3)",
                params![key, field, value],
            )?;
        }

        Command::SAdd { key, members } => {
            let mut stmt =
                tx.prepare_cached("INSERT OR IGNORE INTO kv_sets (key, member) VALUES (?1, ?2)")?;
            for member in members {
                stmt.execute(params![key, member])?;
            }
        }

        Command::ZAdd { key, member, score } => {
            tx.execute(
                "INSERT INTO kv_zsets (key, member, score) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key, member) DO UPDATE SET score = excluded.score",
                params![key, member, score],
            )?;
        }

        Command::Del { key } => {
            for table in VALUE_TABLES {
                tx.execute(&format!("DELETE FROM {} WHERE key = ?1", table), params![key])?;
            }
        }

        Command::RPush { key, values } => {
            let mut stmt =
                tx.prepare_cached("INSERT INTO kv_lists (key, value) VALUES (?1, ?2)")?;
            for value in values {
                stmt.execute(params![key, value])?;
            }
        }
    }

    Ok(())
}

impl Store for SqliteStore {
    // ===== Hashes =====

    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_hashes WHERE key = ?1 AND field = ?2",
                params![key, field],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn hgetall(&self, key: &str) -> StoreResult<BTreeMap<String, String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT field, value FROM kv_hashes WHERE key = ?1")?;

        let fields = stmt
            .query_map(params![key], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(fields)
    }

    // ===== Sets =====

    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM kv_sets WHERE key = ?1 AND member = ?2",
                params![key, member],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare_cached("SELECT member FROM kv_sets WHERE key = ?1 ORDER BY member")?;

        let members = stmt
            .query_map(params![key], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(members)
    }

    fn scard(&self, key: &str) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM kv_sets WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Sorted sets =====

    fn zrange(&self, key: &str) -> StoreResult<Vec<(String, i64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT member, score FROM kv_zsets WHERE key = ?1 ORDER BY score, member",
        )?;

        let members = stmt
            .query_map(params![key], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, i64)>, _>>()?;

        Ok(members)
    }

    // ===== Lists =====

    fn lrange(&self, key: &str) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT value FROM kv_lists WHERE key = ?1 ORDER BY id")?;

        let values = stmt
            .query_map(params![key], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(values)
    }

    fn llen(&self, key: &str) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM kv_lists WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Keyspace =====

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let conn = self.lock()?;

        // substr() rather than LIKE: show ids contain '_', a LIKE wildcard
        let sql = VALUE_TABLES
            .iter()
            .map(|table| {
                format!(
                    "SELECT key FROM {} WHERE substr(key, 1, length(?1)) = ?1",
                    table
                )
            })
            .collect::<Vec<_>>()
            .join(" UNION ");

        let mut stmt = conn.prepare(&format!("{} ORDER BY key", sql))?;
        let keys = stmt
            .query_map(params![prefix], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(keys)
    }

    fn flush(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        for table in VALUE_TABLES {
            conn.execute(&format!("DELETE FROM {}", table), [])?;
        }
        Ok(())
    }

    // ===== Writes =====

    fn execute(&self, batch: Batch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock()?;

        // One commit per batch keeps ingest throughput up
        let tx = conn.transaction()?;
        for command in batch {
            apply(&tx, command)?;
        }
        tx.commit()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::new_in_memory().unwrap()
    }

    #[test]
    fn test_hset_overwrites_and_hsetnx_keeps_first() {
        let store = store();
        let mut batch = Batch::new();
        batch
            .hsetnx("show:tb:a", "name", "First")
            .hsetnx("show:tb:a", "name", "Second")
            .hset("episode:season:tb:a:1:1", [("magnet", "m1")])
            .hset("episode:season:tb:a:1:1", [("magnet", "m2")]);
        store.execute(batch).unwrap();

        assert_eq!(
            store.hget("show:tb:a", "name").unwrap(),
            Some("First".to_string())
        );
        assert_eq!(
            store.hget("episode:season:tb:a:1:1", "magnet").unwrap(),
            Some("m2".to_string())
        );
    }

    #[test]
    fn test_hgetall_missing_key_is_empty() {
        let store = store();
        assert!(store.hgetall("show:tb:missing").unwrap().is_empty());
    }

    #[test]
    fn test_sets_are_unions() {
        let store = store();
        store.sadd("catalog:series", "tb:b").unwrap();
        store.sadd("catalog:series", "tb:a").unwrap();
        store.sadd("catalog:series", "tb:a").unwrap();

        assert_eq!(store.scard("catalog:series").unwrap(), 2);
        assert_eq!(
            store.smembers("catalog:series").unwrap(),
            vec!["tb:a".to_string(), "tb:b".to_string()]
        );
        assert!(store.sismember("catalog:series", "tb:a").unwrap());
        assert!(!store.sismember("catalog:series", "tb:c").unwrap());
    }

    #[test]
    fn test_zadd_rescores_existing_member() {
        let store = store();
        let mut batch = Batch::new();
        batch
            .zadd("season:tb:a:1", "1:1080p", 100)
            .zadd("season:tb:a:1", "2:1080p", 50)
            .zadd("season:tb:a:1", "1:1080p", 200);
        store.execute(batch).unwrap();

        assert_eq!(
            store.zrange("season:tb:a:1").unwrap(),
            vec![("2:1080p".to_string(), 50), ("1:1080p".to_string(), 200)]
        );
    }

    #[test]
    fn test_lists_keep_insertion_order() {
        let store = store();
        store.rpush("error_queue", "b").unwrap();
        store.rpush("error_queue", "a").unwrap();

        assert_eq!(store.lrange("error_queue").unwrap(), vec!["b", "a"]);
        assert_eq!(store.llen("error_queue").unwrap(), 2);
    }

    #[test]
    fn test_del_removes_every_value_type() {
        let store = store();
        let mut batch = Batch::new();
        batch
            .hset("k", [("f", "v")])
            .sadd("k", ["m"])
            .zadd("k", "m", 1)
            .rpush("k", ["v"]);
        store.execute(batch).unwrap();

        store.del("k").unwrap();

        assert!(store.keys_with_prefix("k").unwrap().is_empty());
    }

    #[test]
    fn test_keys_with_prefix_treats_underscore_literally() {
        let store = store();
        store.sadd("season:tb:a_b:1", "x").unwrap();
        store.sadd("season:tb:axb:1", "x").unwrap();

        let keys = store.keys_with_prefix("season:tb:a_b:").unwrap();
        assert_eq!(keys, vec!["season:tb:a_b:1".to_string()]);
    }

    #[test]
    fn test_flush_empties_store() {
        let store = store();
        store.sadd("catalog:series", "tb:a").unwrap();
        store.hset("thread:1", "last_visited", "10").unwrap();

        store.flush().unwrap();

        assert_eq!(store.scard("catalog:series").unwrap(), 0);
        assert_eq!(store.hget("thread:1", "last_visited").unwrap(), None);
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.sadd("catalog:series", "tb:a").unwrap();
        }

        let reopened = SqliteStore::new(&path).unwrap();
        assert!(reopened.sismember("catalog:series", "tb:a").unwrap());
    }
}
