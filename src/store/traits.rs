//! Store trait, batched commands and error types
//!
//! The catalog is laid out as a key-value store with hash, set, sorted-set
//! and list values. Reads go through individual trait methods; every write
//! goes through [`Store::execute`] as a [`Batch`] of commands so that one
//! ingest maps onto one pipelined round trip.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store connection lock poisoned")]
    Poisoned,
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A single write command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set hash fields, overwriting existing values
    HSet {
        key: String,
        fields: Vec<(String, String)>,
    },

    /// Set a hash field only if it does not exist yet
    HSetNx {
        key: String,
        field: String,
        value: String,
    },

    /// Add members to a set
    SAdd { key: String, members: Vec<String> },

    /// Add or rescore a sorted-set member
    ZAdd {
        key: String,
        member: String,
        score: i64,
    },

    /// Delete a key of any type
    Del { key: String },

    /// Append values to the tail of a list
    RPush { key: String, values: Vec<String> },
}

/// An ordered, non-interactive group of write commands
///
/// Commands are applied in insertion order. Nothing is read back while the
/// batch runs, and callers must not rely on the batch being atomic across
/// keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    commands: Vec<Command>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hset<K, F, V>(&mut self, key: K, fields: impl IntoIterator<Item = (F, V)>) -> &mut Self
    where
        K: Into<String>,
        F: Into<String>,
        V: Into<String>,
    {
        self.commands.push(Command::HSet {
            key: key.into(),
            fields: fields
                .into_iter()
                .map(|(f, v)| (f.into(), v.into()))
                .collect(),
        });
        self
    }

    pub fn hsetnx(
        &mut self,
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.commands.push(Command::HSetNx {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Queues a set union; an empty member list is skipped
    pub fn sadd<M: Into<String>>(
        &mut self,
        key: impl Into<String>,
        members: impl IntoIterator<Item = M>,
    ) -> &mut Self {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if !members.is_empty() {
            self.commands.push(Command::SAdd {
                key: key.into(),
                members,
            });
        }
        self
    }

    pub fn zadd(&mut self, key: impl Into<String>, member: impl Into<String>, score: i64) -> &mut Self {
        self.commands.push(Command::ZAdd {
            key: key.into(),
            member: member.into(),
            score,
        });
        self
    }

    pub fn del(&mut self, key: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Del { key: key.into() });
        self
    }

    /// Queues a list append; an empty value list is skipped
    pub fn rpush<V: Into<String>>(
        &mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.commands.push(Command::RPush {
                key: key.into(),
                values,
            });
        }
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl IntoIterator for Batch {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

/// Trait for key-value store backends
///
/// Implementations must be safe to share between worker tasks. Each call is
/// expected to be atomic on its own; no multi-call transactions exist.
pub trait Store: Send + Sync {
    // ===== Hashes =====

    /// Gets a single hash field
    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Gets every field of a hash; empty if the key does not exist
    fn hgetall(&self, key: &str) -> StoreResult<BTreeMap<String, String>>;

    // ===== Sets =====

    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool>;

    /// Gets all members of a set, sorted
    fn smembers(&self, key: &str) -> StoreResult<Vec<String>>;

    fn scard(&self, key: &str) -> StoreResult<u64>;

    // ===== Sorted sets =====

    /// Gets all members of a sorted set with their scores, lowest score first
    fn zrange(&self, key: &str) -> StoreResult<Vec<(String, i64)>>;

    // ===== Lists =====

    /// Gets every item of a list in insertion order
    fn lrange(&self, key: &str) -> StoreResult<Vec<String>>;

    fn llen(&self, key: &str) -> StoreResult<u64>;

    // ===== Keyspace =====

    /// Lists the distinct keys starting with `prefix`, sorted
    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Removes every key
    fn flush(&self) -> StoreResult<()>;

    // ===== Writes =====

    /// Applies a batch of write commands in order
    fn execute(&self, batch: Batch) -> StoreResult<()>;

    /// Sets hash fields
    fn hset(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.hset(key, [(field, value)]);
        self.execute(batch)
    }

    fn sadd(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.sadd(key, [member]);
        self.execute(batch)
    }

    fn rpush(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.rpush(key, [value]);
        self.execute(batch)
    }

    fn del(&self, key: &str) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.del(key);
        self.execute(batch)
    }
}
