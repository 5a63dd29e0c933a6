//! Database schema definitions
//!
//! Each value type of the key-value model lives in its own table. Key names
//! are stored verbatim, so `show:tb:kitchen_war_2023` in SQLite is the same
//! key a Redis-backed reader would look up.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Hash values: one row per field
CREATE TABLE IF NOT EXISTS kv_hashes (
    key TEXT NOT NULL,
    field TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (key, field)
);

-- Set values: one row per member
CREATE TABLE IF NOT EXISTS kv_sets (
    key TEXT NOT NULL,
    member TEXT NOT NULL,
    PRIMARY KEY (key, member)
);

-- Sorted set values: one row per member with its score
CREATE TABLE IF NOT EXISTS kv_zsets (
    key TEXT NOT NULL,
    member TEXT NOT NULL,
    score INTEGER NOT NULL,
    PRIMARY KEY (key, member)
);

CREATE INDEX IF NOT EXISTS idx_kv_zsets_score ON kv_zsets(key, score);

-- List values: insertion order is the row id
CREATE TABLE IF NOT EXISTS kv_lists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_kv_lists_key ON kv_lists(key, id);
"#;

/// Tables holding keyed values, in the order they are scanned
pub const VALUE_TABLES: &[&str] = &["kv_hashes", "kv_sets", "kv_zsets", "kv_lists"];

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
